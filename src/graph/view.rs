use crate::{error::Result, graph::Graph};

/// Read-only view over a weighted graph.
///
/// `neighbors` yields out-neighbors for directed graphs. For undirected graphs
/// every non-loop edge must appear in both endpoint lists and a self-loop once.
/// Iteration order must be stable across calls on an unmodified graph.
pub trait WeightedGraphView {
    /// Number of vertices; vertices are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Whether edges are directed.
    fn is_directed(&self) -> bool;

    /// Neighbors of `node` paired with edge weights.
    fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_;

    /// Weighted degree; undirected self-loops count twice.
    fn strength(&self, node: usize) -> f64 {
        let loops = if self.is_directed() { 0.0 } else { self.self_loop_weight(node) };
        self.neighbors(node).map(|(_, w)| w).sum::<f64>() + loops
    }

    /// Weight of the self-loop on `node`, 0 if absent.
    fn self_loop_weight(&self, node: usize) -> f64 {
        self.neighbors(node).filter(|&(u, _)| u == node).map(|(_, w)| w).sum()
    }

    /// Number of original vertices `node` stands for.
    fn node_size(&self, _node: usize) -> usize { 1 }
}

impl WeightedGraphView for Graph {
    #[inline] fn node_count(&self) -> usize { Graph::node_count(self) }

    #[inline] fn is_directed(&self) -> bool { Graph::is_directed(self) }

    #[inline]
    fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        Graph::neighbors(self, node)
    }

    #[inline] fn strength(&self, node: usize) -> f64 { self.out_strength(node) }

    #[inline] fn self_loop_weight(&self, node: usize) -> f64 { Graph::self_loop_weight(self, node) }

    #[inline] fn node_size(&self, node: usize) -> usize { Graph::node_size(self, node) }
}

impl Graph {
    /// Snapshot any weighted graph view into a CSR graph.
    pub fn from_view<G: WeightedGraphView>(view: &G) -> Result<Self> {
        let directed = view.is_directed();
        let edges = (0..view.node_count())
            .flat_map(|u| view.neighbors(u).map(move |(v, w)| (u, v, w)))
            .filter(|&(u, v, _)| directed || u <= v)
            .collect::<Vec<_>>();
        let node_sizes = (0..view.node_count()).map(|u| view.node_size(u)).collect();

        Graph::with_node_sizes(view.node_count(), directed, &edges, node_sizes)
    }
}

#[cfg(feature = "petgraph")]
mod petgraph_view {
    use petgraph::{graph::{IndexType, NodeIndex}, visit::EdgeRef, EdgeType};

    use super::WeightedGraphView;

    impl<N, Ty: EdgeType, Ix: IndexType> WeightedGraphView for petgraph::Graph<N, f64, Ty, Ix> {
        fn node_count(&self) -> usize { petgraph::Graph::node_count(self) }

        fn is_directed(&self) -> bool { petgraph::Graph::is_directed(self) }

        fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
            self.edges(NodeIndex::new(node)).map(move |edge| {
                let other = if edge.source().index() == node { edge.target() } else { edge.source() };
                (other.index(), *edge.weight())
            })
        }
    }
}
