mod label_set;
mod members;
mod ops;
mod partition;

pub(self) use label_set::LabelSet;
pub(self) use members::MemberSets;
pub use partition::{EdgeWeights, Partition};
