#![doc = "Multilevel community detection: partitions, quality functions and the Louvain optimiser"]
mod error;
mod graph;
mod optimiser;
mod partition;
mod quality;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use graph::{aggregate, Aggregation, Graph, WeightedGraphView};

#[doc(inline)]
pub use partition::{EdgeWeights, Partition};

#[doc(inline)]
pub use quality::{Cpm, Modularity, NodeMove, QualityFunction, QualityKind, RbConfiguration, Rber};

#[doc(inline)]
pub use optimiser::{ConsiderComms, Optimiser, OptimiserConfig, Routine};
