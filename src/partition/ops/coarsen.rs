use std::sync::Arc;

use crate::{
    error::{Error, Result},
    graph::{aggregate, Aggregation},
    partition::Partition,
};

impl Partition {
    /// Collapse every community into a super-vertex.
    ///
    /// Returns a singleton partition of the aggregated graph evaluated by the
    /// same quality function, plus the fine-to-coarse node mapping.
    pub fn aggregate_partition(&self) -> Result<(Partition, Vec<usize>)> {
        self.aggregate_by(self.membership())
    }

    /// Like `aggregate_partition`, but collapse the groups of `membership`
    /// instead of the current communities.
    pub(crate) fn aggregate_by(&self, membership: &[usize]) -> Result<(Partition, Vec<usize>)> {
        let Aggregation { graph, mapping } = aggregate(&self.graph, membership)?;
        let coarse = Partition::with_quality(graph, Arc::clone(&self.quality))?;
        Ok((coarse, mapping))
    }

    /// Assign every node the community of its super-vertex in `coarse`.
    pub fn from_coarse_partition(&mut self, coarse: &Partition, mapping: &[usize]) -> Result<()> {
        if mapping.len() != self.node_count() {
            return Err(Error::invalid("mapping",
                format!("expected {} entries, got {}", self.node_count(), mapping.len())));
        }

        let membership = mapping.iter()
            .map(|&s| {
                Error::check_range("vertex", s, coarse.node_count())?;
                Ok(coarse.comm_of(s))
            })
            .collect::<Result<Vec<_>>>()?;
        self.set_membership(&membership)
    }
}
