use crate::error::{Error, Result};

/// A weighted graph snapshot in compressed sparse row format.
///
/// Undirected graphs store every non-loop edge in both endpoint lists and a
/// self-loop once. Directed graphs keep a second CSR for incoming arcs.
/// Parallel edges are summed at construction.
#[derive(Clone, Debug)]
pub struct Graph {
    size: usize,
    directed: bool,
    offsets: Vec<u32>,
    edges: Vec<u32>,
    edge_weights: Vec<f64>,
    in_offsets: Vec<u32>,
    in_edges: Vec<u32>,
    in_edge_weights: Vec<f64>,
    node_sizes: Vec<usize>,
    self_loops: Vec<f64>,
    out_strength: Vec<f64>,
    in_strength: Vec<f64>,
    edge_count: usize,
    total_weight: f64,
    total_node_size: usize,
}

type AdjacencyList = Vec<Vec<(u32, f64)>>;

/// Flatten per-node adjacency lists into (offsets, targets, weights).
fn compress(lists: &AdjacencyList) -> (Vec<u32>, Vec<u32>, Vec<f64>) {
    let offsets = std::iter::once(0u32).chain(
        lists.iter()
            .map(|v| v.len() as u32)
            .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
    ).collect::<Vec<u32>>();
    let edges = lists.iter().flatten().map(|&(v, _)| v).collect();
    let weights = lists.iter().flatten().map(|&(_, w)| w).collect();
    (offsets, edges, weights)
}

/// Neumaier-compensated sum; coarse edges can aggregate thousands of weights.
fn compensated_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let (mut sum, mut compensation) = (0.0f64, 0.0f64);
    for x in values {
        let t = sum + x;
        compensation += if sum.abs() >= x.abs() { (sum - t) + x } else { (x - t) + sum };
        sum = t;
    }
    if sum.is_finite() { sum + compensation } else { sum }
}

/// Reject graphs whose vertex ids or adjacency offsets would not fit the u32 CSR.
fn check_csr_capacity(num_nodes: usize, directed: bool, num_edges: usize) -> Result<()> {
    let max = u32::MAX as usize;
    if num_nodes > max {
        return Err(Error::invalid("num_nodes", format!("{num_nodes} vertices exceed the limit of {max}")));
    }
    // Undirected edges are stored in both endpoint lists.
    let entries = if directed { num_edges } else { num_edges.saturating_mul(2) };
    if entries > max {
        return Err(Error::invalid("edges", format!("{entries} adjacency entries exceed the limit of {max}")));
    }
    Ok(())
}

impl Graph {
    /// Construct a graph from an edge list `(u, v, weight)` where every node has size 1.
    pub fn from_edges(num_nodes: usize, directed: bool, edges: &[(usize, usize, f64)]) -> Result<Self> {
        check_csr_capacity(num_nodes, directed, edges.len())?;
        Self::with_node_sizes(num_nodes, directed, edges, vec![1; num_nodes])
    }

    /// Construct a graph from an edge list with explicit node sizes.
    pub fn with_node_sizes(num_nodes: usize, directed: bool, edges: &[(usize, usize, f64)],
        node_sizes: Vec<usize>,
    ) -> Result<Self> {
        check_csr_capacity(num_nodes, directed, edges.len())?;
        if node_sizes.len() != num_nodes {
            return Err(Error::invalid("node_sizes",
                format!("expected {num_nodes} node sizes, got {}", node_sizes.len())));
        }
        for &(u, v, _) in edges {
            Error::check_range("vertex", u, num_nodes)?;
            Error::check_range("vertex", v, num_nodes)?;
        }
        Ok(Self::build(num_nodes, directed, edges, node_sizes))
    }

    /// Build from an edge list whose endpoints are already known to be in range.
    fn build(num_nodes: usize, directed: bool, edges: &[(usize, usize, f64)], node_sizes: Vec<usize>) -> Self {
        // Normalise endpoint order for undirected edges, then coalesce parallel edges.
        let mut list = edges.iter()
            .map(|&(u, v, w)| if directed || u <= v { (u, v, w) } else { (v, u, w) })
            .collect::<Vec<_>>();
        list.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let merged = list.chunk_by(|a, b| (a.0, a.1) == (b.0, b.1))
            .map(|run| (run[0].0, run[0].1, compensated_sum(run.iter().map(|&(_, _, w)| w))))
            .collect::<Vec<_>>();

        let mut out_lists: AdjacencyList = vec![Vec::new(); num_nodes];
        let mut in_lists: AdjacencyList = if directed { vec![Vec::new(); num_nodes] } else { Vec::new() };
        let mut self_loops = vec![0.0; num_nodes];

        for &(u, v, w) in &merged {
            out_lists[u].push((v as u32, w));
            if directed {
                in_lists[v].push((u as u32, w));
            } else if u != v {
                out_lists[v].push((u as u32, w));
            }
            if u == v { self_loops[u] += w }
        }

        // Undirected strength counts the self-loop twice; it is stored once in the list.
        let out_strength = out_lists.iter().enumerate()
            .map(|(u, list)| {
                list.iter().map(|&(_, w)| w).sum::<f64>() + if directed { 0.0 } else { self_loops[u] }
            })
            .collect::<Vec<f64>>();
        let in_strength = if directed {
            in_lists.iter().map(|list| list.iter().map(|&(_, w)| w).sum()).collect()
        } else {
            out_strength.clone()
        };

        let (offsets, edges, edge_weights) = compress(&out_lists);
        let (in_offsets, in_edges, in_edge_weights) =
            if directed { compress(&in_lists) } else { (Vec::new(), Vec::new(), Vec::new()) };

        Self {
            size: num_nodes,
            directed,
            offsets,
            edges,
            edge_weights,
            in_offsets,
            in_edges,
            in_edge_weights,
            total_node_size: node_sizes.iter().sum(),
            node_sizes,
            self_loops,
            out_strength,
            in_strength,
            edge_count: merged.len(),
            total_weight: compensated_sum(merged.iter().map(|&(_, _, w)| w)),
        }
    }

    /// Copy of this graph with every edge weight replaced by 1.
    pub fn with_unit_weights(&self) -> Self {
        let edges = self.edge_list().into_iter()
            .map(|(u, v, _)| (u, v, 1.0))
            .collect::<Vec<_>>();
        Self::build(self.size, self.directed, &edges, self.node_sizes.clone())
    }

    /// Every edge exactly once as `(u, v, weight)`; `u <= v` for undirected graphs.
    pub fn edge_list(&self) -> Vec<(usize, usize, f64)> {
        (0..self.size)
            .flat_map(|u| self.neighbors(u).map(move |(v, w)| (u, v, w)))
            .filter(|&(u, v, _)| self.directed || u <= v)
            .collect()
    }

    /// Get the number of nodes in the graph.
    #[inline] pub fn node_count(&self) -> usize { self.size }

    /// Get the number of distinct edges (self-loops included, each edge once).
    #[inline] pub fn edge_count(&self) -> usize { self.edge_count }

    /// Whether edges are directed.
    #[inline] pub fn is_directed(&self) -> bool { self.directed }

    /// Sum of all edge weights, each edge once and each self-loop once.
    #[inline] pub fn total_weight(&self) -> f64 { self.total_weight }

    /// Sum of all node sizes.
    #[inline] pub fn total_node_size(&self) -> usize { self.total_node_size }

    /// Get the range of outgoing edges for a given node.
    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the number of adjacency entries (out-neighbors) of a given node.
    #[inline] pub fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get the size of a node (number of original vertices it represents).
    #[inline] pub fn node_size(&self, node: usize) -> usize { self.node_sizes[node] }

    /// Get the self-loop weight of a node (0 when there is none).
    #[inline] pub fn self_loop_weight(&self, node: usize) -> f64 { self.self_loops[node] }

    /// Weighted out-degree; for undirected graphs the total incident weight with self-loops counted twice.
    #[inline] pub fn out_strength(&self, node: usize) -> f64 { self.out_strength[node] }

    /// Weighted in-degree; equal to `out_strength` for undirected graphs.
    #[inline] pub fn in_strength(&self, node: usize) -> f64 { self.in_strength[node] }

    /// Get an iterator over the (out-)neighbors and edge weights of a given node.
    #[inline]
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.range(node).map(move |i| (self.edges[i] as usize, self.edge_weights[i]))
    }

    /// Get an iterator over the in-neighbors and edge weights of a given node.
    /// Identical to `neighbors` for undirected graphs.
    #[inline]
    pub fn in_neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (offsets, edges, weights) = if self.directed {
            (&self.in_offsets, &self.in_edges, &self.in_edge_weights)
        } else {
            (&self.offsets, &self.edges, &self.edge_weights)
        };
        (offsets[node] as usize .. offsets[node + 1] as usize).map(move |i| (edges[i] as usize, weights[i]))
    }

    /// Whether any edge carries a negative weight.
    pub fn has_negative_weights(&self) -> bool {
        self.edge_weights.iter().any(|&w| w < 0.0)
    }

    /// First edge weight that is NaN or infinite, if any.
    pub fn first_non_finite_weight(&self) -> Option<f64> {
        self.edge_weights.iter().copied().find(|w| !w.is_finite())
    }

    /// Number of vertex pairs that can carry an edge among `n` vertices.
    #[inline]
    pub fn possible_edges(&self, n: f64) -> f64 {
        if self.directed { n * (n - 1.0) } else { n * (n - 1.0) / 2.0 }
    }

    /// Total weight divided by the number of possible edges over all node sizes.
    pub fn density(&self) -> f64 {
        let possible = self.possible_edges(self.total_node_size as f64);
        if possible > 0.0 { self.total_weight / possible } else { 0.0 }
    }
}
