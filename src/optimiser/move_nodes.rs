use rand::seq::SliceRandom;

use crate::{
    error::Result,
    optimiser::{
        candidates::{node_candidates, Constraint, NeighbourWeights},
        ConsiderComms, Optimiser,
    },
    partition::Partition,
    quality::NodeMove,
};

impl Optimiser {
    /// Greedily move single nodes to the community that improves quality most.
    ///
    /// Nodes are visited in an order shuffled once per call; sweeps repeat
    /// until one moves nothing or `max_sweeps` is reached. Only strictly
    /// positive moves are taken, ties going to the lowest label. Communities
    /// are renumbered on return. Returns the total improvement.
    pub fn move_nodes(&mut self, partition: &mut Partition, consider_comms: ConsiderComms) -> Result<f64> {
        self.config.validate()?;
        self.move_nodes_within(partition, consider_comms, None)
    }

    /// Like `move_nodes`, but a node may only join communities that lie
    /// inside its own community of `constraint`.
    pub fn move_nodes_constrained(&mut self, partition: &mut Partition, consider_comms: ConsiderComms,
        constraint: &[usize],
    ) -> Result<f64> {
        self.config.validate()?;
        let constraint = Constraint::new(constraint, partition.node_count())?;
        self.move_nodes_within(partition, consider_comms, Some(&constraint))
    }

    pub(super) fn move_nodes_within(&mut self, partition: &mut Partition, consider_comms: ConsiderComms,
        constraint: Option<&Constraint>,
    ) -> Result<f64> {
        let n = partition.node_count();
        let mut order = (0..n).collect::<Vec<_>>();
        order.shuffle(&mut self.rng);

        let mut neighbours = NeighbourWeights::new(n);
        let mut total = 0.0;

        for sweep in 0..self.config.max_sweeps {
            let (mut moved, mut improvement) = (0usize, 0.0);

            for &node in &order {
                neighbours.collect(partition, node);
                let mut candidates = node_candidates(partition, node, &neighbours, consider_comms, constraint, &mut self.rng);
                if self.config.consider_empty_community {
                    candidates.extend(partition.empty_community());
                }

                let source = partition.comm_of(node);
                let size = partition.graph().node_size(node);
                let mut best = NodeMove {
                    node,
                    source,
                    target: source,
                    source_weight: neighbours.weight(source),
                    target_weight: neighbours.weight(source),
                };
                let mut best_diff = 0.0;

                for &target in &candidates {
                    if target == source || !self.fits(partition.comm_size(target), size) { continue }

                    let mv = NodeMove { target, target_weight: neighbours.weight(target), ..best };
                    let diff = partition.diff_move_weights(&mv)?;
                    let better = diff > best_diff
                        || (diff == best_diff && best.target != source && target < best.target);
                    if better {
                        best = mv;
                        best_diff = diff;
                    }
                }

                if best.target != source {
                    partition.apply_move(&best);
                    improvement += best_diff;
                    moved += 1;
                }
            }

            tracing::trace!(sweep, moved, improvement, "move sweep");
            total += improvement;
            if moved == 0 { break }
        }

        partition.renumber_communities();
        tracing::debug!(nodes = n, communities = partition.community_count(), improvement = total, "moved nodes");
        Ok(total)
    }
}
