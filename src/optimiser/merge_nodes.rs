use rand::seq::SliceRandom;
use smallvec::SmallVec;

use crate::{
    error::{Error, Result},
    optimiser::{
        candidates::{merge_candidates, Constraint},
        ConsiderComms, Optimiser,
    },
    partition::Partition,
};

impl Optimiser {
    /// Greedily merge whole communities while some merge improves quality.
    ///
    /// Each pass visits the communities in shuffled order and folds each one
    /// into the candidate with the greatest strictly positive gain, ties going
    /// to the lowest label. Passes repeat until one merges nothing or
    /// `max_sweeps` is reached. Communities are renumbered on return.
    pub fn merge_nodes(&mut self, partition: &mut Partition, consider_comms: ConsiderComms) -> Result<f64> {
        self.config.validate()?;
        self.merge_nodes_within(partition, consider_comms, None)
    }

    /// Like `merge_nodes`, but two communities may only merge when both lie
    /// inside the same community of `constraint`.
    pub fn merge_nodes_constrained(&mut self, partition: &mut Partition, consider_comms: ConsiderComms,
        constraint: &[usize],
    ) -> Result<f64> {
        self.config.validate()?;
        let constraint = Constraint::new(constraint, partition.node_count())?;
        self.merge_nodes_within(partition, consider_comms, Some(&constraint))
    }

    pub(super) fn merge_nodes_within(&mut self, partition: &mut Partition, consider_comms: ConsiderComms,
        constraint: Option<&Constraint>,
    ) -> Result<f64> {
        let mut total = 0.0;

        for pass in 0..self.config.max_sweeps {
            let (mut merged, mut improvement) = (0usize, 0.0);

            let mut order = partition.communities().to_vec();
            order.sort_unstable();
            order.shuffle(&mut self.rng);

            for community in order {
                // Already folded into another community this pass.
                if partition.comm_nodes(community) == 0 { continue }

                let cross = partition.cross_weights(community);
                let mut adjacent = cross.keys().copied().collect::<SmallVec<[usize; 16]>>();
                adjacent.sort_unstable();

                let candidates = merge_candidates(partition, community, &adjacent, consider_comms, constraint, &mut self.rng);
                let size = partition.comm_size(community);

                let (mut best, mut best_diff) = (None, 0.0);
                for &target in &candidates {
                    if !self.fits(partition.comm_size(target), size) { continue }

                    let weight = cross.get(&target).copied().unwrap_or(0.0);
                    let diff = partition.quality_function().diff_merge(partition, target, community, weight);
                    let diff = Error::check_finite("diff_merge", diff)?;
                    let better = diff > best_diff
                        || (diff == best_diff && best.is_some_and(|(b, _)| target < b));
                    if better {
                        best = Some((target, weight));
                        best_diff = diff;
                    }
                }

                if let Some((target, weight)) = best {
                    partition.merge_with_cross(target, community, weight);
                    improvement += best_diff;
                    merged += 1;
                }
            }

            tracing::trace!(pass, merged, improvement, "merge pass");
            total += improvement;
            if merged == 0 { break }
        }

        partition.renumber_communities();
        tracing::debug!(nodes = partition.node_count(), communities = partition.community_count(),
            improvement = total, "merged communities");
        Ok(total)
    }
}
