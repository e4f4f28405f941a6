use crate::{error::{Error, Result}, graph::Graph};

/// A coarsened graph together with the fine-to-coarse vertex mapping.
#[derive(Clone, Debug)]
pub struct Aggregation {
    /// One super-vertex per community.
    pub graph: Graph,
    /// `mapping[v]` is the super-vertex containing fine vertex `v`.
    pub mapping: Vec<usize>,
}

/// Collapse every community of `membership` into a single super-vertex.
///
/// Super-vertices are numbered by first appearance of their community when
/// scanning vertices in order. Edges between communities are summed, edges
/// inside a community become a self-loop carrying the community's internal
/// weight, and node sizes add up, so total edge weight and total node size
/// are conserved.
pub fn aggregate(graph: &Graph, membership: &[usize]) -> Result<Aggregation> {
    let n = graph.node_count();
    if membership.len() != n {
        return Err(Error::invalid("membership",
            format!("expected {n} labels, got {}", membership.len())));
    }

    // Compact labels in order of first appearance.
    let mut relabel = vec![usize::MAX; n];
    let mut mapping = Vec::with_capacity(n);
    let mut next = 0;
    for &c in membership {
        Error::check_range("community", c, n)?;
        if relabel[c] == usize::MAX { relabel[c] = next; next += 1 }
        mapping.push(relabel[c]);
    }

    let mut node_sizes = vec![0; next];
    for (v, &c) in mapping.iter().enumerate() {
        node_sizes[c] += graph.node_size(v);
    }

    let edges = graph.edge_list().into_iter()
        .map(|(u, v, w)| (mapping[u], mapping[v], w))
        .collect::<Vec<_>>();

    let coarse = Graph::with_node_sizes(next, graph.is_directed(), &edges, node_sizes)?;
    tracing::trace!(fine = n, coarse = next, "aggregated graph");

    Ok(Aggregation { graph: coarse, mapping })
}
