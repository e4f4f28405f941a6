use crate::{error::{Error, Result}, partition::Partition, quality::NodeMove};

impl Partition {
    /// Move `node` into `community`, updating every cached aggregate.
    pub fn move_node(&mut self, node: usize, community: usize) -> Result<()> {
        Error::check_range("vertex", node, self.node_count())?;
        Error::check_range("community", community, self.node_count())?;

        let mv = NodeMove::new(self, node, community);
        self.apply_move(&mv);
        Ok(())
    }

    /// Apply a move whose linked weights were computed against the current state.
    pub(crate) fn apply_move(&mut self, mv: &NodeMove) {
        let NodeMove { node, source, target, source_weight, target_weight } = *mv;
        debug_assert_eq!(self.comm_of(node), source, "stale move");
        if source == target { return }

        let self_loop = self.graph.self_loop_weight(node);
        let (out_strength, in_strength) = (self.graph.out_strength(node), self.graph.in_strength(node));
        let size = self.graph.node_size(node);

        // Detach from the source community.
        self.internal[source] -= source_weight + self_loop;
        self.weight_out[source] -= out_strength;
        self.weight_in[source] -= in_strength;
        self.csize[source] -= size;

        // Attach to the target community.
        self.internal[target] += target_weight + self_loop;
        self.weight_out[target] += out_strength;
        self.weight_in[target] += in_strength;
        self.csize[target] += size;

        self.members.move_to(node, target);
        self.update_labels(source);
        self.update_labels(target);
    }

    /// Keep label sets in step with the member count of `community`,
    /// zeroing the aggregates of a community that just emptied.
    pub(super) fn update_labels(&mut self, community: usize) {
        if self.members.get(community).is_empty() {
            self.internal[community] = 0.0;
            self.weight_out[community] = 0.0;
            self.weight_in[community] = 0.0;
            self.occupied.remove(community);
            self.empty.insert(community);
        } else {
            self.empty.remove(community);
            self.occupied.insert(community);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::Error, graph::Graph, partition::{EdgeWeights, Partition}, quality::QualityKind};

    fn triangle_with_tail(directed: bool) -> Graph {
        Graph::from_edges(5, directed, &[
            (0, 1, 1.0), (1, 2, 2.0), (2, 0, 3.0), (2, 3, 0.5), (3, 4, 1.5), (4, 4, 2.0),
        ]).unwrap()
    }

    #[test]
    fn moves_keep_aggregates_exact() {
        for directed in [false, true] {
            let mut partition = Partition::new(triangle_with_tail(directed), QualityKind::Cpm, 0.2, EdgeWeights::Graph).unwrap();
            for (node, target) in [(1, 0), (2, 0), (4, 3), (3, 0), (3, 4), (0, 4), (0, 1)] {
                partition.move_node(node, target).unwrap();
                assert_eq!(partition.community(node), Ok(target));
                assert!(partition.check_aggregates(), "after moving {node} to {target}");
            }
        }
    }

    #[test]
    fn moving_last_member_frees_the_label() {
        let mut partition = Partition::new(triangle_with_tail(false), QualityKind::Cpm, 0.2, EdgeWeights::Graph).unwrap();
        partition.move_node(3, 4).unwrap();

        assert_eq!(partition.community_count(), 4);
        assert_eq!(partition.empty_community(), Some(3));
        assert_eq!(partition.total_weight_from_comm(3), Ok(0.0));
        assert_eq!(partition.total_weight_in_comm(4), Ok(1.5 + 2.0));
        assert_eq!(partition.csize(4), Ok(2));

        // Moving into the free label occupies it again.
        partition.move_node(0, 3).unwrap();
        assert_eq!(partition.community_count(), 4);
        assert_eq!(partition.empty_community(), Some(0));
    }

    #[test]
    fn move_to_own_community_is_noop() {
        let mut partition = Partition::new(triangle_with_tail(false), QualityKind::Cpm, 0.2, EdgeWeights::Graph).unwrap();
        partition.move_node(2, 2).unwrap();
        assert_eq!(partition.membership(), &[0, 1, 2, 3, 4]);
        assert!(partition.check_aggregates());
    }

    #[test]
    fn out_of_range_moves_are_rejected() {
        let mut partition = Partition::new(triangle_with_tail(false), QualityKind::Cpm, 0.2, EdgeWeights::Graph).unwrap();
        assert_eq!(partition.move_node(5, 0), Err(Error::OutOfRange { what: "vertex", index: 5, bound: 5 }));
        assert_eq!(partition.move_node(0, 5), Err(Error::OutOfRange { what: "community", index: 5, bound: 5 }));
        assert_eq!(partition.membership(), &[0, 1, 2, 3, 4]);
    }
}
