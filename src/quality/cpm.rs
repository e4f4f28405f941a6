use crate::{partition::Partition, quality::{NodeMove, QualityFunction, QualityKind}};

/// Constant Potts Model: `Q = Σ_c [I_c - γ·P(N_c)]`.
///
/// `I_c` is the internal weight of community `c`, `N_c` its size in original
/// vertices and `P(n)` the number of vertex pairs (`n(n-1)/2`, or `n(n-1)`
/// for directed graphs).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cpm {
    resolution: f64,
}

impl Cpm {
    pub(crate) fn new(resolution: f64) -> Self { Self { resolution } }
}

/// Pair-count multiplier: one pair per unordered couple, two for ordered ones.
#[inline]
fn pair_factor(partition: &Partition) -> f64 {
    if partition.graph().is_directed() { 2.0 } else { 1.0 }
}

fn potts_quality(partition: &Partition, gamma: f64) -> f64 {
    partition.total_weight_in_all_comms() - gamma * partition.total_possible_edges_in_all_comms()
}

fn potts_diff_move(partition: &Partition, mv: &NodeMove, gamma: f64) -> f64 {
    if mv.source == mv.target { return 0.0 }

    let ns = partition.graph().node_size(mv.node) as f64;
    let source_size = partition.comm_size(mv.source) as f64;
    let target_size = partition.comm_size(mv.target) as f64;

    (mv.target_weight - mv.source_weight)
        - gamma * pair_factor(partition) * ns * (target_size - source_size + ns)
}

fn potts_diff_merge(partition: &Partition, a: usize, b: usize, cross: f64, gamma: f64) -> f64 {
    if a == b { return 0.0 }
    let (na, nb) = (partition.comm_size(a) as f64, partition.comm_size(b) as f64);
    cross - gamma * pair_factor(partition) * na * nb
}

impl QualityFunction for Cpm {
    fn kind(&self) -> QualityKind { QualityKind::Cpm }

    fn resolution(&self) -> f64 { self.resolution }

    fn quality(&self, partition: &Partition) -> f64 {
        potts_quality(partition, self.resolution)
    }

    fn diff_move_weights(&self, partition: &Partition, mv: &NodeMove) -> f64 {
        potts_diff_move(partition, mv, self.resolution)
    }

    fn diff_merge(&self, partition: &Partition, a: usize, b: usize, cross: f64) -> f64 {
        potts_diff_merge(partition, a, b, cross, self.resolution)
    }
}

/// Reichardt-Bornholdt with an Erdős-Rényi null model.
///
/// Equivalent to CPM with the resolution scaled by the graph density, so the
/// penalty compares each community against a random graph of equal density.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rber {
    resolution: f64,
    density: f64,
}

impl Rber {
    pub(crate) fn new(resolution: f64, density: f64) -> Self { Self { resolution, density } }

    /// Density the penalty is scaled by.
    #[inline] pub fn density(&self) -> f64 { self.density }

    #[inline] fn gamma(&self) -> f64 { self.resolution * self.density }
}

impl QualityFunction for Rber {
    fn kind(&self) -> QualityKind { QualityKind::Rber }

    fn resolution(&self) -> f64 { self.resolution }

    fn quality(&self, partition: &Partition) -> f64 {
        potts_quality(partition, self.gamma())
    }

    fn diff_move_weights(&self, partition: &Partition, mv: &NodeMove) -> f64 {
        potts_diff_move(partition, mv, self.gamma())
    }

    fn diff_merge(&self, partition: &Partition, a: usize, b: usize, cross: f64) -> f64 {
        potts_diff_merge(partition, a, b, cross, self.gamma())
    }
}
