use ahash::AHashMap;

use crate::{error::{Error, Result}, partition::Partition};

impl Partition {
    /// Fold community `source` into `target`, leaving `source` empty.
    pub fn merge_communities(&mut self, target: usize, source: usize) -> Result<()> {
        Error::check_range("community", target, self.node_count())?;
        Error::check_range("community", source, self.node_count())?;

        let cross = self.cross_weight(target, source);
        self.merge_with_cross(target, source, cross);
        Ok(())
    }

    /// Fold `source` into `target` given the total weight `cross` between them.
    pub(crate) fn merge_with_cross(&mut self, target: usize, source: usize, cross: f64) {
        if target == source || self.members.get(source).is_empty() { return }

        self.internal[target] += self.internal[source] + cross;
        self.weight_out[target] += self.weight_out[source];
        self.weight_in[target] += self.weight_in[source];
        self.csize[target] += self.csize[source];
        self.csize[source] = 0;

        self.members.merge_into(source, target);
        self.update_labels(source);
        self.update_labels(target);
    }

    /// Total weight of edges between communities `a` and `b`, arcs in both directions.
    pub(crate) fn cross_weight(&self, a: usize, b: usize) -> f64 {
        if a == b { return 0.0 }

        // Scan the smaller side.
        let (small, other) = if self.comm_nodes(a) <= self.comm_nodes(b) { (a, b) } else { (b, a) };
        self.comm_members(small).iter()
            .map(|&u| self.linked_weight(u, other))
            .sum()
    }

    /// Weight between `community` and each community adjacent to it.
    pub(crate) fn cross_weights(&self, community: usize) -> AHashMap<usize, f64> {
        let mut weights = AHashMap::new();
        let directed = self.graph.is_directed();

        for &u in self.comm_members(community) {
            let incoming = directed.then(|| self.graph.in_neighbors(u)).into_iter().flatten();
            for (v, w) in self.graph.neighbors(u).chain(incoming) {
                let c = self.comm_of(v);
                if c != community { *weights.entry(c).or_insert(0.0) += w }
            }
        }

        weights
    }
}
