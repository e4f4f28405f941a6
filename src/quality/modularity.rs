use crate::{partition::Partition, quality::{NodeMove, QualityFunction, QualityKind}};

/// Modularity: `Q = (1/m)·Σ_c [I_c - γ·K_c²/(4m)]`.
///
/// For directed graphs the null model is `K_c^out·K_c^in / m`. Zero when the
/// graph carries no weight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modularity {
    resolution: f64,
}

impl Modularity {
    pub(crate) fn new(resolution: f64) -> Self { Self { resolution } }
}

/// Reichardt-Bornholdt with a configuration null model: modularity scaled by `m`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RbConfiguration {
    resolution: f64,
}

impl RbConfiguration {
    pub(crate) fn new(resolution: f64) -> Self { Self { resolution } }
}

/// Unnormalised modularity sum, `m·Q`.
fn configuration_quality(partition: &Partition, gamma: f64) -> f64 {
    let graph = partition.graph();
    let m = graph.total_weight();
    if m == 0.0 { return 0.0 }

    let directed = graph.is_directed();
    partition.communities().iter().map(|&c| {
        let (k_out, k_in) = (partition.comm_out(c), partition.comm_in(c));
        let expected = if directed { k_out * k_in / m } else { k_out * k_out / (4.0 * m) };
        partition.comm_internal(c) - gamma * expected
    }).sum()
}

fn configuration_diff_move(partition: &Partition, mv: &NodeMove, gamma: f64) -> f64 {
    if mv.source == mv.target { return 0.0 }

    let graph = partition.graph();
    let m = graph.total_weight();
    if m == 0.0 { return 0.0 }

    let (s, t) = (mv.source, mv.target);
    let k_out = graph.out_strength(mv.node);
    let gain = mv.target_weight - mv.source_weight;

    if graph.is_directed() {
        let k_in = graph.in_strength(mv.node);
        let delta_in = partition.comm_in(t) - partition.comm_in(s) + k_in;
        let delta_out = partition.comm_out(t) - partition.comm_out(s) + k_out;
        gain - gamma * (k_out * delta_in + k_in * delta_out) / m
    } else {
        let delta = partition.comm_out(t) - partition.comm_out(s) + k_out;
        gain - gamma * k_out * delta / (2.0 * m)
    }
}

fn configuration_diff_merge(partition: &Partition, a: usize, b: usize, cross: f64, gamma: f64) -> f64 {
    if a == b { return 0.0 }

    let graph = partition.graph();
    let m = graph.total_weight();
    if m == 0.0 { return 0.0 }

    let (a_out, b_out) = (partition.comm_out(a), partition.comm_out(b));
    if graph.is_directed() {
        let (a_in, b_in) = (partition.comm_in(a), partition.comm_in(b));
        cross - gamma * (a_out * b_in + b_out * a_in) / m
    } else {
        cross - gamma * a_out * b_out / (2.0 * m)
    }
}

/// `1/m`, or 0 for a weightless graph.
#[inline]
fn normaliser(partition: &Partition) -> f64 {
    let m = partition.graph().total_weight();
    if m == 0.0 { 0.0 } else { 1.0 / m }
}

impl QualityFunction for Modularity {
    fn kind(&self) -> QualityKind { QualityKind::Modularity }

    fn resolution(&self) -> f64 { self.resolution }

    fn quality(&self, partition: &Partition) -> f64 {
        normaliser(partition) * configuration_quality(partition, self.resolution)
    }

    fn diff_move_weights(&self, partition: &Partition, mv: &NodeMove) -> f64 {
        normaliser(partition) * configuration_diff_move(partition, mv, self.resolution)
    }

    fn diff_merge(&self, partition: &Partition, a: usize, b: usize, cross: f64) -> f64 {
        normaliser(partition) * configuration_diff_merge(partition, a, b, cross, self.resolution)
    }
}

impl QualityFunction for RbConfiguration {
    fn kind(&self) -> QualityKind { QualityKind::RbConfiguration }

    fn resolution(&self) -> f64 { self.resolution }

    fn quality(&self, partition: &Partition) -> f64 {
        configuration_quality(partition, self.resolution)
    }

    fn diff_move_weights(&self, partition: &Partition, mv: &NodeMove) -> f64 {
        configuration_diff_move(partition, mv, self.resolution)
    }

    fn diff_merge(&self, partition: &Partition, a: usize, b: usize, cross: f64) -> f64 {
        configuration_diff_merge(partition, a, b, cross, self.resolution)
    }
}
