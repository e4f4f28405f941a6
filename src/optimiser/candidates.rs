use rand::{seq::IndexedRandom, Rng};
use smallvec::SmallVec;

use crate::{
    error::{Error, Result},
    optimiser::ConsiderComms,
    partition::Partition,
};

pub(super) type Candidates = SmallVec<[usize; 16]>;

/// Dense accumulator for the weight linking one node to each community around it.
#[derive(Debug)]
pub(super) struct NeighbourWeights {
    weights: Vec<f64>,
    touched: Vec<usize>,
    marked: Vec<bool>,
}

impl NeighbourWeights {
    pub(super) fn new(num_comms: usize) -> Self {
        Self { weights: vec![0.0; num_comms], touched: Vec::new(), marked: vec![false; num_comms] }
    }

    /// Accumulate the weight from `node` (and to it, if directed) per community.
    /// The node's own community is always touched; the node itself never counts.
    pub(super) fn collect(&mut self, partition: &Partition, node: usize) {
        self.clear();
        self.touch(partition.comm_of(node));

        let graph = partition.graph();
        let incoming = graph.is_directed().then(|| graph.in_neighbors(node)).into_iter().flatten();
        for (v, w) in graph.neighbors(node).chain(incoming) {
            if v == node { continue }
            let c = partition.comm_of(v);
            self.touch(c);
            self.weights[c] += w;
        }
    }

    #[inline]
    fn touch(&mut self, community: usize) {
        if !self.marked[community] {
            self.marked[community] = true;
            self.touched.push(community);
        }
    }

    fn clear(&mut self) {
        for &c in &self.touched {
            self.weights[c] = 0.0;
            self.marked[c] = false;
        }
        self.touched.clear();
    }

    /// Linked weight to `community`; 0 if untouched.
    #[inline] pub(super) fn weight(&self, community: usize) -> f64 { self.weights[community] }

    /// Communities seen by the last `collect`, own community first.
    #[inline] pub(super) fn touched(&self) -> &[usize] { &self.touched }
}

/// Restricts candidates to the community a node has in another membership.
#[derive(Debug)]
pub(super) struct Constraint<'a> {
    membership: &'a [usize],
    groups: Vec<Vec<usize>>,
}

impl<'a> Constraint<'a> {
    pub(super) fn new(membership: &'a [usize], node_count: usize) -> Result<Self> {
        if membership.len() != node_count {
            return Err(Error::invalid("constraint",
                format!("expected {node_count} labels, got {}", membership.len())));
        }
        let mut groups = vec![Vec::new(); node_count];
        for (v, &c) in membership.iter().enumerate() {
            Error::check_range("community", c, node_count)?;
            groups[c].push(v);
        }
        Ok(Self { membership, groups })
    }

    /// Nodes sharing `node`'s constraint community.
    #[inline]
    pub(super) fn group_of(&self, node: usize) -> &[usize] { &self.groups[self.membership[node]] }

    /// Whether `community` of `partition` lies inside `node`'s constraint community.
    /// Empty communities are always allowed.
    pub(super) fn allows(&self, partition: &Partition, node: usize, community: usize) -> bool {
        partition.comm_members(community).first()
            .is_none_or(|&rep| self.membership[rep] == self.membership[node])
    }
}

/// Communities `node` should be tried against, excluding its own.
pub(super) fn node_candidates<R: Rng + ?Sized>(
    partition: &Partition,
    node: usize,
    neighbours: &NeighbourWeights,
    consider: ConsiderComms,
    constraint: Option<&Constraint>,
    rng: &mut R,
) -> Candidates {
    let own = partition.comm_of(node);
    let allowed = |c: usize| c != own && constraint.is_none_or(|k| k.allows(partition, node, c));

    match (consider, constraint) {
        (ConsiderComms::AllComms, None) => {
            partition.communities().iter().copied().filter(|&c| allowed(c)).collect()
        }
        (ConsiderComms::AllComms, Some(constraint)) => {
            let mut found = constraint.group_of(node).iter()
                .map(|&u| partition.comm_of(u))
                .filter(|&c| allowed(c))
                .collect::<Candidates>();
            found.sort_unstable();
            found.dedup();
            found
        }
        (ConsiderComms::AllNeighComms, _) => {
            neighbours.touched().iter().copied().filter(|&c| allowed(c)).collect()
        }
        (ConsiderComms::RandComms, None) => {
            partition.communities().choose(rng).copied().filter(|&c| allowed(c)).into_iter().collect()
        }
        (ConsiderComms::RandComms, Some(constraint)) => {
            constraint.group_of(node).choose(rng)
                .map(|&u| partition.comm_of(u))
                .filter(|&c| allowed(c))
                .into_iter().collect()
        }
        (ConsiderComms::RandNeighComms, _) => {
            let options = neighbours.touched().iter().copied().filter(|&c| allowed(c)).collect::<Candidates>();
            options.choose(rng).copied().into_iter().collect()
        }
    }
}

/// Communities `community` could merge into, sorted, excluding itself.
/// `neighbours` lists the adjacent communities in ascending order.
pub(super) fn merge_candidates<R: Rng + ?Sized>(
    partition: &Partition,
    community: usize,
    neighbours: &[usize],
    consider: ConsiderComms,
    constraint: Option<&Constraint>,
    rng: &mut R,
) -> Candidates {
    let Some(&rep) = partition.comm_members(community).first() else { return Candidates::new() };
    let allowed = |c: usize| c != community && constraint.is_none_or(|k| k.allows(partition, rep, c));

    let options = match consider {
        ConsiderComms::AllComms | ConsiderComms::RandComms => {
            let mut all = partition.communities().iter().copied().filter(|&c| allowed(c)).collect::<Candidates>();
            all.sort_unstable();
            all
        }
        ConsiderComms::AllNeighComms | ConsiderComms::RandNeighComms => {
            neighbours.iter().copied().filter(|&c| allowed(c)).collect()
        }
    };

    match consider {
        ConsiderComms::AllComms | ConsiderComms::AllNeighComms => options,
        ConsiderComms::RandComms | ConsiderComms::RandNeighComms => {
            options.choose(rng).copied().into_iter().collect()
        }
    }
}
