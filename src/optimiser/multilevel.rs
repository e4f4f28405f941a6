use std::sync::Arc;

use crate::{
    error::Result,
    optimiser::{candidates::Constraint, ConsiderComms, Optimiser, Routine},
    partition::Partition,
};

impl Optimiser {
    /// Optimise `partition` with the multilevel scheme.
    ///
    /// At each level the configured routine runs to convergence, the
    /// communities are collapsed into super-vertices and the coarser graph is
    /// optimised in turn. The coarse result is projected back and polished by
    /// one more routine call. Stops when no community holds more than one
    /// node or `max_levels` is reached. Returns the total improvement.
    pub fn optimise_partition(&mut self, partition: &mut Partition) -> Result<f64> {
        self.config.validate()?;

        let before = partition.quality();
        let improvement = self.optimise_level(partition, 0)?;
        tracing::debug!(before, after = partition.quality(), improvement,
            communities = partition.community_count(), "optimised partition");
        Ok(improvement)
    }

    fn run_routine(&mut self, partition: &mut Partition, routine: Routine, consider_comms: ConsiderComms,
        constraint: Option<&Constraint>,
    ) -> Result<f64> {
        match routine {
            Routine::MoveNodes => self.move_nodes_within(partition, consider_comms, constraint),
            Routine::MergeNodes => self.merge_nodes_within(partition, consider_comms, constraint),
        }
    }

    fn optimise_level(&mut self, partition: &mut Partition, level: usize) -> Result<f64> {
        let (routine, consider) = (self.config.optimise_routine, self.config.consider_comms);

        // --- 1. Local search on this level ---
        let mut improvement = self.run_routine(partition, routine, consider, None)?;
        let (nodes, communities) = (partition.node_count(), partition.community_count());
        tracing::debug!(level, nodes, communities, improvement, "level converged");

        if communities == nodes || self.config.max_levels.is_some_and(|max| level + 1 >= max) {
            return Ok(improvement);
        }

        // --- 2. Collapse communities (or their refinement) into super-vertices ---
        let (mut coarse, mapping) = match self.refine(partition)? {
            Some(refined) => {
                let (mut coarse, mapping) = partition.aggregate_by(refined.membership())?;
                // Super-vertices start in the community their members belong to.
                let mut initial = vec![0; coarse.node_count()];
                for (node, &s) in mapping.iter().enumerate() {
                    initial[s] = partition.comm_of(node);
                }
                coarse.set_membership(&initial)?;
                (coarse, mapping)
            }
            None => partition.aggregate_partition()?,
        };

        // --- 3. Recurse, project back and polish ---
        improvement += self.optimise_level(&mut coarse, level + 1)?;
        partition.from_coarse_partition(&coarse, &mapping)?;
        improvement += self.run_routine(partition, routine, consider, None)?;

        Ok(improvement)
    }

    /// Split each community of `partition` by a constrained pass over a fresh
    /// singleton partition. `None` when refinement is off or merged nothing.
    fn refine(&mut self, partition: &Partition) -> Result<Option<Partition>> {
        if !self.config.refine_partition { return Ok(None) }

        let mut refined = Partition::with_quality(partition.shared_graph(), Arc::clone(partition.quality_function()))?;
        let constraint = Constraint::new(partition.membership(), partition.node_count())?;
        let (routine, consider) = (self.config.refine_routine, self.config.refine_consider_comms);
        self.run_routine(&mut refined, routine, consider, Some(&constraint))?;

        tracing::trace!(refined = refined.community_count(), communities = partition.community_count(), "refined partition");
        Ok((refined.community_count() < partition.node_count()).then_some(refined))
    }
}
