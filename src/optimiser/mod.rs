mod candidates;
mod merge_nodes;
mod move_nodes;
mod multilevel;
mod optimiser;

pub use optimiser::{ConsiderComms, Optimiser, OptimiserConfig, Routine};
