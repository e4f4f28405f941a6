mod cpm;
mod modularity;

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{error::{Error, Result}, graph::Graph, partition::Partition};

pub use cpm::{Cpm, Rber};
pub use modularity::{Modularity, RbConfiguration};

/// A tentative move of one node, with the weight linking it to both communities.
///
/// `source_weight` and `target_weight` exclude the node itself (its self-loop
/// is never counted) and, for directed graphs, sum arcs in both directions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeMove {
    pub node: usize,
    pub source: usize,
    pub target: usize,
    pub source_weight: f64,
    pub target_weight: f64,
}

impl NodeMove {
    /// Describe moving `node` to `target`, reading linked weights from the partition.
    pub(crate) fn new(partition: &Partition, node: usize, target: usize) -> Self {
        let source = partition.comm_of(node);
        Self {
            node,
            source,
            target,
            source_weight: partition.linked_weight(node, source),
            target_weight: partition.linked_weight(node, target),
        }
    }
}

/// A quality function evaluated against a partition's cached aggregates.
///
/// Implementations hold only their parameters; everything graph-dependent is
/// read through the partition, so one instance can be shared by the
/// partitions of every aggregation level.
pub trait QualityFunction: fmt::Debug + Send + Sync {
    /// Which family this function belongs to.
    fn kind(&self) -> QualityKind;

    /// The resolution parameter as supplied by the caller.
    fn resolution(&self) -> f64;

    /// Total quality of `partition`.
    fn quality(&self, partition: &Partition) -> f64;

    /// Change in quality if `node` moved to community `target`.
    fn diff_move(&self, partition: &Partition, node: usize, target: usize) -> f64 {
        self.diff_move_weights(partition, &NodeMove::new(partition, node, target))
    }

    /// Change in quality for a move whose linked weights are already known.
    /// Must return 0 when `source == target`.
    fn diff_move_weights(&self, partition: &Partition, mv: &NodeMove) -> f64;

    /// Change in quality if communities `a` and `b` were merged, given the
    /// total weight `cross` of edges (arcs in both directions) between them.
    fn diff_merge(&self, partition: &Partition, a: usize, b: usize, cross: f64) -> f64;
}

/// Selects a quality function family at partition construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualityKind {
    /// Constant Potts Model.
    Cpm,
    /// Newman-Girvan modularity, normalised by total weight.
    #[default]
    Modularity,
    /// Reichardt-Bornholdt with a configuration null model (unnormalised modularity).
    RbConfiguration,
    /// Reichardt-Bornholdt with an Erdős-Rényi null model.
    Rber,
}

impl QualityKind {
    /// Validate `resolution` against `graph` and instantiate the quality function.
    pub fn build(self, resolution: f64, graph: &Graph) -> Result<Arc<dyn QualityFunction>> {
        if !resolution.is_finite() {
            return Err(Error::invalid("resolution", format!("must be finite, got {resolution}")));
        }

        match self {
            QualityKind::Cpm | QualityKind::Rber => {
                if resolution < 0.0 && !graph.has_negative_weights() {
                    return Err(Error::invalid("resolution",
                        format!("{self} requires a non-negative resolution unless edge weights are negative, got {resolution}")));
                }
            }
            QualityKind::Modularity | QualityKind::RbConfiguration => {
                if resolution < 0.0 {
                    return Err(Error::invalid("resolution",
                        format!("{self} requires a non-negative resolution, got {resolution}")));
                }
                if graph.has_negative_weights() {
                    return Err(Error::invalid("weights", format!("{self} requires non-negative edge weights")));
                }
            }
        }

        Ok(match self {
            QualityKind::Cpm => Arc::new(Cpm::new(resolution)),
            QualityKind::Rber => Arc::new(Rber::new(resolution, graph.density())),
            QualityKind::Modularity => Arc::new(Modularity::new(resolution)),
            QualityKind::RbConfiguration => Arc::new(RbConfiguration::new(resolution)),
        })
    }
}

impl fmt::Display for QualityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QualityKind::Cpm => "cpm",
            QualityKind::Modularity => "modularity",
            QualityKind::RbConfiguration => "rb-configuration",
            QualityKind::Rber => "rber",
        })
    }
}
