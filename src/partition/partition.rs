use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    graph::Graph,
    partition::{LabelSet, MemberSets},
    quality::{NodeMove, QualityFunction, QualityKind},
};

/// Which edge weights the quality function sees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeWeights {
    /// Use the weights stored in the graph.
    #[default]
    Graph,
    /// Treat every edge as weight 1.
    Unit,
}

/// Per-community scalars recomputed from scratch.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct Aggregates {
    pub(super) weight_out: Vec<f64>,
    pub(super) weight_in: Vec<f64>,
    pub(super) internal: Vec<f64>,
    pub(super) csize: Vec<usize>,
}

impl Aggregates {
    /// Sum strengths, internal weight and node sizes per community.
    pub(super) fn compute(graph: &Graph, assignments: &[usize]) -> Self {
        let n = graph.node_count();
        let mut aggregates = Self {
            weight_out: vec![0.0; n],
            weight_in: vec![0.0; n],
            internal: vec![0.0; n],
            csize: vec![0; n],
        };

        for (u, &c) in assignments.iter().enumerate() {
            aggregates.weight_out[c] += graph.out_strength(u);
            aggregates.weight_in[c] += graph.in_strength(u);
            aggregates.csize[c] += graph.node_size(u);

            // Each edge once: undirected edges from their lower endpoint.
            for (v, w) in graph.neighbors(u) {
                if (graph.is_directed() || u <= v) && assignments[v] == c {
                    aggregates.internal[c] += w;
                }
            }
        }

        aggregates
    }
}

/// An assignment of every node of a graph to a community, with cached
/// per-community aggregates that the quality function reads.
///
/// Community labels live in `0..node_count()` and need not be contiguous
/// until `renumber_communities` is called.
#[derive(Clone, Debug)]
pub struct Partition {
    pub(super) graph: Arc<Graph>,
    pub(super) quality: Arc<dyn QualityFunction>,
    pub(super) members: MemberSets,     // Nodes in each community
    pub(super) weight_out: Vec<f64>,    // Sum of out-strengths of members
    pub(super) weight_in: Vec<f64>,     // Sum of in-strengths of members
    pub(super) internal: Vec<f64>,      // Weight of edges inside, each edge once
    pub(super) csize: Vec<usize>,       // Sum of node sizes of members
    pub(super) occupied: LabelSet,      // Labels with at least one member
    pub(super) empty: LabelSet,         // Labels with no members
}

/// Reject graphs whose weights, strengths or total weight are not finite.
fn check_finite_weights(graph: &Graph) -> Result<()> {
    if let Some(value) = graph.first_non_finite_weight() {
        return Err(Error::Numerical { context: "edge weight", value });
    }
    Error::check_finite("total weight", graph.total_weight())?;
    for node in 0..graph.node_count() {
        Error::check_finite("strength", graph.out_strength(node))?;
        Error::check_finite("strength", graph.in_strength(node))?;
    }
    Ok(())
}

impl Partition {
    /// Singleton partition of `graph` under a freshly built quality function.
    pub fn new(graph: impl Into<Arc<Graph>>, kind: QualityKind, resolution: f64, weights: EdgeWeights) -> Result<Self> {
        let graph: Arc<Graph> = graph.into();
        let graph = match weights {
            EdgeWeights::Graph => graph,
            EdgeWeights::Unit => Arc::new(graph.with_unit_weights()),
        };
        check_finite_weights(&graph)?;

        let quality = kind.build(resolution, &graph)?;
        Self::with_quality(graph, quality)
    }

    /// Partition of `graph` with an initial `membership`.
    pub fn with_membership(graph: impl Into<Arc<Graph>>, kind: QualityKind, resolution: f64, weights: EdgeWeights,
        membership: &[usize],
    ) -> Result<Self> {
        let mut partition = Self::new(graph, kind, resolution, weights)?;
        partition.set_membership(membership)?;
        Ok(partition)
    }

    /// Singleton partition of `graph` evaluated by a quality function already
    /// validated by `QualityKind::build` for this graph or a finer level of it.
    pub(crate) fn with_quality(graph: impl Into<Arc<Graph>>, quality: Arc<dyn QualityFunction>) -> Result<Self> {
        let graph: Arc<Graph> = graph.into();
        check_finite_weights(&graph)?;

        let n = graph.node_count();
        let mut occupied = LabelSet::empty(n);
        occupied.rebuild_from(0..n);
        let Aggregates { weight_out, weight_in, internal, csize } =
            Aggregates::compute(&graph, &(0..n).collect::<Vec<_>>());

        Ok(Self {
            members: MemberSets::singletons(n),
            weight_out,
            weight_in,
            internal,
            csize,
            occupied,
            empty: LabelSet::empty(n),
            graph,
            quality,
        })
    }

    /// Get a reference to the underlying graph.
    #[inline] pub fn graph(&self) -> &Graph { &self.graph }

    /// Shared handle to the underlying graph.
    #[inline] pub fn shared_graph(&self) -> Arc<Graph> { Arc::clone(&self.graph) }

    /// Get the quality function evaluating this partition.
    #[inline] pub fn quality_function(&self) -> &Arc<dyn QualityFunction> { &self.quality }

    /// Get the number of nodes in the underlying graph.
    #[inline] pub fn node_count(&self) -> usize { self.graph.node_count() }

    /// Get the number of non-empty communities.
    #[inline] pub fn community_count(&self) -> usize { self.occupied.len() }

    /// Labels of the non-empty communities, in no particular order.
    #[inline] pub fn communities(&self) -> &[usize] { self.occupied.as_slice() }

    /// Community label of every node.
    #[inline] pub fn membership(&self) -> &[usize] { self.members.assignments() }

    /// Get the community of a given node.
    pub fn community(&self, node: usize) -> Result<usize> {
        Error::check_range("vertex", node, self.node_count())?;
        Ok(self.comm_of(node))
    }

    /// Nodes currently in `community`.
    pub fn members(&self, community: usize) -> Result<&[usize]> {
        Error::check_range("community", community, self.node_count())?;
        Ok(self.comm_members(community))
    }

    /// Number of original vertices in `community` (sum of node sizes).
    pub fn csize(&self, community: usize) -> Result<usize> {
        Error::check_range("community", community, self.node_count())?;
        Ok(self.comm_size(community))
    }

    /// Number of nodes in `community`.
    pub fn cnodes(&self, community: usize) -> Result<usize> {
        Error::check_range("community", community, self.node_count())?;
        Ok(self.comm_nodes(community))
    }

    /// Internal weight of `community`, each edge and self-loop once.
    pub fn total_weight_in_comm(&self, community: usize) -> Result<f64> {
        Error::check_range("community", community, self.node_count())?;
        Ok(self.comm_internal(community))
    }

    /// Sum of out-strengths of the members of `community`.
    pub fn total_weight_from_comm(&self, community: usize) -> Result<f64> {
        Error::check_range("community", community, self.node_count())?;
        Ok(self.comm_out(community))
    }

    /// Sum of in-strengths of the members of `community`.
    pub fn total_weight_to_comm(&self, community: usize) -> Result<f64> {
        Error::check_range("community", community, self.node_count())?;
        Ok(self.comm_in(community))
    }

    /// Weight of edges from `node` to other members of `community`.
    pub fn weight_to_comm(&self, node: usize, community: usize) -> Result<f64> {
        Error::check_range("vertex", node, self.node_count())?;
        Error::check_range("community", community, self.node_count())?;
        Ok(self.link_to(node, community))
    }

    /// Weight of edges into `node` from other members of `community`.
    pub fn weight_from_comm(&self, node: usize, community: usize) -> Result<f64> {
        Error::check_range("vertex", node, self.node_count())?;
        Error::check_range("community", community, self.node_count())?;
        Ok(self.link_from(node, community))
    }

    // Unchecked forms for the optimiser's hot loops; indices come from the partition itself.

    #[inline] pub(crate) fn comm_of(&self, node: usize) -> usize { self.members.find(node) }

    #[inline] pub(crate) fn comm_members(&self, community: usize) -> &[usize] { self.members.get(community) }

    #[inline] pub(crate) fn comm_size(&self, community: usize) -> usize { self.csize[community] }

    #[inline] pub(crate) fn comm_nodes(&self, community: usize) -> usize { self.members.get(community).len() }

    #[inline] pub(crate) fn comm_internal(&self, community: usize) -> f64 { self.internal[community] }

    #[inline] pub(crate) fn comm_out(&self, community: usize) -> f64 { self.weight_out[community] }

    #[inline] pub(crate) fn comm_in(&self, community: usize) -> f64 { self.weight_in[community] }

    fn link_to(&self, node: usize, community: usize) -> f64 {
        self.graph.neighbors(node)
            .filter(|&(v, _)| v != node && self.comm_of(v) == community)
            .map(|(_, w)| w)
            .sum()
    }

    fn link_from(&self, node: usize, community: usize) -> f64 {
        self.graph.in_neighbors(node)
            .filter(|&(v, _)| v != node && self.comm_of(v) == community)
            .map(|(_, w)| w)
            .sum()
    }

    /// Weight linking `node` to the rest of `community`; both directions for directed graphs.
    pub(crate) fn linked_weight(&self, node: usize, community: usize) -> f64 {
        let to = self.link_to(node, community);
        if self.graph.is_directed() { to + self.link_from(node, community) } else { to }
    }

    /// Some label with no members, or `None` when every label is taken.
    #[inline] pub fn empty_community(&self) -> Option<usize> { self.empty.last() }

    /// Current value of the quality function.
    pub fn quality(&self) -> f64 { self.quality.quality(self) }

    /// Change in quality if `node` moved to `community`.
    pub fn diff_move(&self, node: usize, community: usize) -> Result<f64> {
        Error::check_range("vertex", node, self.node_count())?;
        Error::check_range("community", community, self.node_count())?;
        Error::check_finite("diff_move", self.quality.diff_move(self, node, community))
    }

    /// Change in quality for a move with precomputed linked weights.
    #[inline]
    pub(crate) fn diff_move_weights(&self, mv: &NodeMove) -> Result<f64> {
        Error::check_finite("diff_move", self.quality.diff_move_weights(self, mv))
    }

    /// Change in quality if communities `a` and `b` were merged.
    pub fn diff_merge(&self, a: usize, b: usize) -> Result<f64> {
        Error::check_range("community", a, self.node_count())?;
        Error::check_range("community", b, self.node_count())?;
        let cross = self.cross_weight(a, b);
        Error::check_finite("diff_merge", self.quality.diff_merge(self, a, b, cross))
    }

    /// Sizes (in original vertices) of the communities, in order of first
    /// appearance when scanning nodes; after renumbering, index `c` is community `c`.
    pub fn sizes(&self) -> Vec<usize> {
        let mut seen = vec![false; self.node_count()];
        self.membership().iter()
            .filter_map(|&c| (!std::mem::replace(&mut seen[c], true)).then(|| self.csize[c]))
            .collect()
    }

    /// Replace the membership and rebuild every cached aggregate.
    pub fn set_membership(&mut self, membership: &[usize]) -> Result<()> {
        let n = self.node_count();
        if membership.len() != n {
            return Err(Error::invalid("membership", format!("expected {n} labels, got {}", membership.len())));
        }
        for &c in membership {
            Error::check_range("community", c, n)?;
        }

        self.members.rebuild(membership);
        let Aggregates { weight_out, weight_in, internal, csize } = Aggregates::compute(&self.graph, membership);
        self.weight_out = weight_out;
        self.weight_in = weight_in;
        self.internal = internal;
        self.csize = csize;
        self.rebuild_label_sets();
        Ok(())
    }

    /// Recompute occupied/empty label sets from member counts.
    pub(super) fn rebuild_label_sets(&mut self) {
        let n = self.node_count();
        self.occupied.rebuild_from((0..n).filter(|&c| !self.members.get(c).is_empty()));
        self.empty.rebuild_from((0..n).rev().filter(|&c| self.members.get(c).is_empty()));
    }

    /// Relabel communities to `0..k` in order of first appearance scanning nodes.
    pub fn renumber_communities(&mut self) {
        let n = self.node_count();
        let mut perm = vec![usize::MAX; n];
        let mut next = 0;
        for v in 0..n {
            let c = self.comm_of(v);
            if perm[c] == usize::MAX { perm[c] = next; next += 1 }
        }
        // Empty labels fill the remaining slots in increasing order.
        for slot in perm.iter_mut().filter(|slot| **slot == usize::MAX) {
            *slot = next;
            next += 1;
        }

        self.members.relabel(&perm);
        let permute_f64 = |values: &mut Vec<f64>| {
            let mut out = vec![0.0; values.len()];
            for (c, &x) in values.iter().enumerate() { out[perm[c]] = x }
            *values = out;
        };
        permute_f64(&mut self.weight_out);
        permute_f64(&mut self.weight_in);
        permute_f64(&mut self.internal);
        let mut csize = vec![0; n];
        for (c, &size) in self.csize.iter().enumerate() { csize[perm[c]] = size }
        self.csize = csize;

        self.rebuild_label_sets();
    }

    /// Recompute every cached aggregate from scratch and compare with the cache.
    pub fn check_aggregates(&self) -> bool {
        let fresh = Aggregates::compute(&self.graph, self.membership());
        let close = |a: &[f64], b: &[f64]| {
            a.iter().zip(b).all(|(x, y)| (x - y).abs() <= 1e-9 * (1.0 + x.abs().max(y.abs())))
        };
        let labels_consistent = (0..self.node_count()).all(|c| {
            let occupied = !self.members.get(c).is_empty();
            self.occupied.contains(c) == occupied && self.empty.contains(c) != occupied
        });

        fresh.csize == self.csize
            && close(&fresh.weight_out, &self.weight_out)
            && close(&fresh.weight_in, &self.weight_in)
            && close(&fresh.internal, &self.internal)
            && labels_consistent
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} partition of {} nodes into {} communities (quality {:.6})",
            self.quality.kind(), self.node_count(), self.community_count(), self.quality())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Graph {
        Graph::from_edges(4, false, &[(0, 1, 1.0), (1, 2, 2.0), (2, 3, 1.0), (3, 0, 2.0)]).unwrap()
    }

    #[test]
    fn new_starts_from_singletons() {
        let partition = Partition::new(square(), QualityKind::Cpm, 0.1, EdgeWeights::Graph).unwrap();
        assert_eq!(partition.community_count(), 4);
        assert_eq!(partition.membership(), &[0, 1, 2, 3]);
        assert_eq!(partition.sizes(), vec![1, 1, 1, 1]);
        assert_eq!(partition.empty_community(), None);
        assert_eq!(partition.total_weight_from_comm(1), Ok(3.0));
        assert_eq!(partition.total_weight_in_all_comms(), 0.0);
        assert!(partition.check_aggregates());
    }

    #[test]
    fn set_membership_rebuilds_aggregates() {
        let mut partition = Partition::new(square(), QualityKind::Cpm, 0.1, EdgeWeights::Graph).unwrap();
        partition.set_membership(&[3, 3, 1, 1]).unwrap();

        assert_eq!(partition.community_count(), 2);
        assert_eq!(partition.total_weight_in_comm(3), Ok(1.0));
        assert_eq!(partition.total_weight_in_comm(1), Ok(1.0));
        assert_eq!(partition.cnodes(3), Ok(2));
        assert_eq!(partition.csize(1), Ok(2));
        assert_eq!(partition.total_possible_edges_in_all_comms(), 2.0);
        assert_eq!(partition.weight_to_comm(0, 1), Ok(2.0));
        assert_eq!(partition.weight_from_comm(0, 3), Ok(1.0));
        assert!(partition.empty_community().is_some_and(|c| partition.cnodes(c) == Ok(0)));
        assert!(partition.check_aggregates());
    }

    #[test]
    fn set_membership_validates_input() {
        let mut partition = Partition::new(square(), QualityKind::Cpm, 0.1, EdgeWeights::Graph).unwrap();
        assert!(matches!(partition.set_membership(&[0, 0]), Err(Error::InvalidParameter { name: "membership", .. })));
        assert_eq!(
            partition.set_membership(&[0, 0, 0, 4]),
            Err(Error::OutOfRange { what: "community", index: 4, bound: 4 })
        );
        assert_eq!(partition.membership(), &[0, 1, 2, 3]);
    }

    #[test]
    fn renumber_orders_by_first_appearance() {
        let mut partition = Partition::with_membership(square(), QualityKind::Cpm, 0.1, EdgeWeights::Graph, &[3, 1, 1, 3]).unwrap();
        let sizes = partition.sizes();
        let internal_of_three = partition.total_weight_in_comm(3);

        partition.renumber_communities();
        assert_eq!(partition.membership(), &[0, 1, 1, 0]);
        assert_eq!(partition.sizes(), sizes);
        assert_eq!(partition.total_weight_in_comm(0), internal_of_three);
        assert_eq!(partition.communities().len(), 2);
        assert!(partition.check_aggregates());
    }

    #[test]
    fn unit_weights_ignore_stored_weights() {
        let partition = Partition::with_membership(square(), QualityKind::Cpm, 0.0, EdgeWeights::Unit, &[0, 0, 0, 0]).unwrap();
        assert_eq!(partition.quality(), 4.0);
        assert_eq!(partition.graph().total_weight(), 4.0);
    }

    #[test]
    fn non_finite_weights_are_rejected() {
        let graph = Graph::from_edges(2, false, &[(0, 1, f64::INFINITY)]).unwrap();
        assert!(matches!(
            Partition::new(graph, QualityKind::Cpm, 1.0, EdgeWeights::Graph),
            Err(Error::Numerical { context: "edge weight", .. })
        ));
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        // Every weight is finite but their sum is not.
        let graph = Graph::from_edges(3, false, &[(0, 1, 1e308), (1, 2, 1e308)]).unwrap();
        assert!(graph.total_weight().is_infinite());
        for kind in [QualityKind::Cpm, QualityKind::Modularity] {
            assert!(matches!(
                Partition::new(graph.clone(), kind, 1.0, EdgeWeights::Graph),
                Err(Error::Numerical { context: "total weight", .. })
            ));
        }

        // A self-loop counts twice toward strength, so only the strength overflows.
        let graph = Graph::from_edges(2, false, &[(0, 0, 1e308)]).unwrap();
        assert!(graph.total_weight().is_finite());
        assert!(matches!(
            Partition::new(graph, QualityKind::Modularity, 1.0, EdgeWeights::Graph),
            Err(Error::Numerical { context: "strength", .. })
        ));
    }

    #[test]
    fn out_of_range_queries_are_errors() {
        let partition = Partition::new(square(), QualityKind::Cpm, 0.1, EdgeWeights::Graph).unwrap();
        assert!(matches!(partition.diff_move(4, 0), Err(Error::OutOfRange { what: "vertex", .. })));
        assert!(matches!(partition.diff_move(0, 9), Err(Error::OutOfRange { what: "community", .. })));
        assert!(matches!(partition.diff_merge(0, 4), Err(Error::OutOfRange { .. })));

        let out_of = |what| Error::OutOfRange { what, index: 9, bound: 4 };
        assert_eq!(partition.community(9).unwrap_err(), out_of("vertex"));
        assert_eq!(partition.members(9).unwrap_err(), out_of("community"));
        assert_eq!(partition.csize(9).unwrap_err(), out_of("community"));
        assert_eq!(partition.cnodes(9).unwrap_err(), out_of("community"));
        assert_eq!(partition.total_weight_in_comm(9).unwrap_err(), out_of("community"));
        assert_eq!(partition.total_weight_from_comm(9).unwrap_err(), out_of("community"));
        assert_eq!(partition.total_weight_to_comm(9).unwrap_err(), out_of("community"));
        assert_eq!(partition.weight_to_comm(0, 9).unwrap_err(), out_of("community"));
        assert_eq!(partition.weight_from_comm(0, 9).unwrap_err(), out_of("community"));
        assert_eq!(partition.weight_to_comm(9, 0).unwrap_err(), out_of("vertex"));
        assert_eq!(partition.weight_from_comm(9, 0).unwrap_err(), out_of("vertex"));

        assert_eq!(partition.members(2).map(<[usize]>::to_vec), Ok(vec![2]));
        assert_eq!(partition.weight_to_comm(0, 1), Ok(1.0));
    }

    #[test]
    fn display_summarises_partition() {
        let partition = Partition::with_membership(square(), QualityKind::Cpm, 0.0, EdgeWeights::Graph, &[0, 0, 2, 2]).unwrap();
        assert_eq!(partition.to_string(), "cpm partition of 4 nodes into 2 communities (quality 2.000000)");
    }

    #[test]
    fn empty_graph_has_empty_partition() {
        let partition = Partition::new(Graph::from_edges(0, false, &[]).unwrap(), QualityKind::Modularity, 1.0, EdgeWeights::Graph).unwrap();
        assert_eq!(partition.community_count(), 0);
        assert!(partition.sizes().is_empty());
        assert_eq!(partition.quality(), 0.0);
    }
}
