mod aggregate;
mod graph;
mod view;

pub use aggregate::{aggregate, Aggregation};
pub use graph::Graph;
pub use view::WeightedGraphView;
