// Integration tests for the optimiser on reference graphs:
//   complete graphs, random graphs, forests of trees, signed bipartite graphs

use louvain::{ConsiderComms, EdgeWeights, Error, Graph, Optimiser, OptimiserConfig, Partition, QualityKind, Routine};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn complete(n: usize) -> Graph {
    let edges = (0..n).flat_map(|u| (u + 1..n).map(move |v| (u, v, 1.0))).collect::<Vec<_>>();
    Graph::from_edges(n, false, &edges).unwrap()
}

fn erdos_renyi(n: usize, p: f64, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for u in 0..n {
        for v in u + 1..n {
            if rng.random::<f64>() < p { edges.push((u, v, 1.0)) }
        }
    }
    Graph::from_edges(n, false, &edges).unwrap()
}

/// `count` disjoint trees of `size` vertices where vertex i has children 3i+1..=3i+3.
fn forest(count: usize, size: usize) -> Graph {
    let mut edges = Vec::new();
    for t in 0..count {
        let base = t * size;
        for child in 1..size { edges.push((base + (child - 1) / 3, base + child, 1.0)) }
    }
    Graph::from_edges(count * size, false, &edges).unwrap()
}

fn complete_bipartite(a: usize, b: usize, weight: f64) -> Graph {
    let edges = (0..a).flat_map(|u| (a..a + b).map(move |v| (u, v, weight))).collect::<Vec<_>>();
    Graph::from_edges(a + b, false, &edges).unwrap()
}

/// Every `diff_move` towards a neighbouring community is non-positive.
fn assert_node_optimal(partition: &Partition) {
    for v in 0..partition.node_count() {
        for (u, _) in partition.graph().neighbors(v) {
            let diff = partition.diff_move(v, partition.community(u).unwrap()).unwrap();
            assert!(diff <= 1e-12, "node {v} can gain {diff} by joining the community of {u}");
        }
    }
}

#[test]
fn move_nodes_collapses_complete_graph() {
    let mut partition = Partition::new(complete(100), QualityKind::Cpm, 0.5, EdgeWeights::Graph).unwrap();
    let mut optimiser = Optimiser::new().with_seed(42);
    optimiser.move_nodes(&mut partition, ConsiderComms::AllNeighComms).unwrap();
    assert_eq!(partition.sizes(), vec![100]);
}

#[test]
fn merge_nodes_collapses_complete_graph() {
    let mut partition = Partition::new(complete(100), QualityKind::Cpm, 0.5, EdgeWeights::Graph).unwrap();
    let mut optimiser = Optimiser::new().with_seed(42);
    optimiser.merge_nodes(&mut partition, ConsiderComms::AllNeighComms).unwrap();
    assert_eq!(partition.sizes(), vec![100]);
}

#[test]
fn repeated_move_nodes_reaches_node_optimality() {
    let mut partition = Partition::new(erdos_renyi(100, 0.05, 7), QualityKind::Cpm, 0.1, EdgeWeights::Graph).unwrap();
    let mut optimiser = Optimiser::new().with_seed(7);
    while optimiser.move_nodes(&mut partition, ConsiderComms::AllNeighComms).unwrap() > 0.0 {}

    assert_node_optimal(&partition);
    assert!(partition.check_aggregates());
}

#[test]
fn optimise_partition_finds_tree_components() {
    let mut partition = Partition::new(forest(10, 10), QualityKind::Cpm, 0.0, EdgeWeights::Graph).unwrap();
    let mut optimiser = Optimiser::new().with_seed(3).with_consider_comms(ConsiderComms::AllNeighComms);
    optimiser.optimise_partition(&mut partition).unwrap();

    assert_eq!(partition.sizes(), vec![10; 10]);
}

#[test]
fn optimise_partition_recovers_negative_bipartite_sides() {
    let graph = complete_bipartite(50, 50, -0.1);
    let mut partition = Partition::new(graph, QualityKind::Cpm, -0.1, EdgeWeights::Graph).unwrap();
    let mut optimiser = Optimiser::new().with_seed(11).with_consider_comms(ConsiderComms::AllComms);
    optimiser.optimise_partition(&mut partition).unwrap();

    assert_eq!(partition.sizes(), vec![50, 50]);
}

#[test]
fn optimised_partition_is_node_optimal() {
    for (kind, resolution) in [(QualityKind::Cpm, 0.05), (QualityKind::Modularity, 1.0), (QualityKind::RbConfiguration, 0.5)] {
        let mut partition = Partition::new(erdos_renyi(80, 0.08, 21), kind, resolution, EdgeWeights::Graph).unwrap();
        Optimiser::new().with_seed(5).optimise_partition(&mut partition).unwrap();
        assert_node_optimal(&partition);
    }
}

#[test]
fn improvements_are_non_negative_and_exact() {
    let mut partition = Partition::new(erdos_renyi(60, 0.1, 2), QualityKind::Modularity, 1.0, EdgeWeights::Graph).unwrap();
    let mut optimiser = Optimiser::new().with_seed(9);

    for _ in 0..3 {
        let before = partition.quality();
        let improvement = optimiser.optimise_partition(&mut partition).unwrap();
        assert!(improvement >= 0.0);
        assert!((partition.quality() - before - improvement).abs() < 1e-9);
    }
}

#[test]
fn converged_move_nodes_is_idempotent() {
    let mut partition = Partition::new(erdos_renyi(50, 0.1, 4), QualityKind::Cpm, 0.1, EdgeWeights::Graph).unwrap();
    let mut optimiser = Optimiser::new().with_seed(4);
    while optimiser.move_nodes(&mut partition, ConsiderComms::AllNeighComms).unwrap() > 0.0 {}

    let membership = partition.membership().to_vec();
    assert_eq!(optimiser.move_nodes(&mut partition, ConsiderComms::AllNeighComms).unwrap(), 0.0);
    assert_eq!(partition.membership(), membership.as_slice());
}

#[test]
fn fixed_seed_is_deterministic() {
    let run = |seed: u64| {
        let mut partition = Partition::new(erdos_renyi(120, 0.04, 13), QualityKind::Modularity, 1.0, EdgeWeights::Graph).unwrap();
        Optimiser::new().with_seed(seed).with_refine_partition(true).optimise_partition(&mut partition).unwrap();
        partition.membership().to_vec()
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn directed_cliques_are_separated() {
    let mut edges = Vec::new();
    for base in [0, 5] {
        for u in 0..5 {
            for v in 0..5 {
                if u != v { edges.push((base + u, base + v, 1.0)) }
            }
        }
    }
    edges.push((4, 5, 1.0));
    let graph = Graph::from_edges(10, true, &edges).unwrap();

    let mut partition = Partition::new(graph, QualityKind::Modularity, 1.0, EdgeWeights::Graph).unwrap();
    Optimiser::new().with_seed(1).optimise_partition(&mut partition).unwrap();

    assert_eq!(partition.membership(), &[0, 0, 0, 0, 0, 1, 1, 1, 1, 1]);
}

#[test]
fn unit_weights_ignore_edge_weights() {
    // Heavy bridge between two triangles only matters when weights are used.
    let graph = Graph::from_edges(6, false, &[
        (0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0),
        (3, 4, 1.0), (4, 5, 1.0), (3, 5, 1.0),
        (2, 3, 50.0),
    ]).unwrap();

    let mut unit = Partition::new(graph, QualityKind::Cpm, 0.6, EdgeWeights::Unit).unwrap();
    Optimiser::new().with_seed(0).optimise_partition(&mut unit).unwrap();
    assert_eq!(unit.sizes(), vec![3, 3]);
}

#[test]
fn config_file_settings_drive_the_optimiser() {
    let config = OptimiserConfig::from_json(r#"{
        "consider_comms": "all-comms",
        "optimise_routine": "merge-nodes",
        "seed": 12,
        "max_levels": 3
    }"#).unwrap();
    let mut optimiser = Optimiser::from_config(config).unwrap();
    assert_eq!(optimiser.config().optimise_routine, Routine::MergeNodes);

    let mut partition = Partition::new(forest(3, 10), QualityKind::Cpm, 0.0, EdgeWeights::Graph).unwrap();
    optimiser.optimise_partition(&mut partition).unwrap();
    assert_eq!(partition.sizes(), vec![10; 3]);
}

#[test]
fn invalid_inputs_surface_as_errors() {
    assert!(matches!(
        Partition::new(complete(4), QualityKind::Cpm, -1.0, EdgeWeights::Graph),
        Err(Error::InvalidParameter { name: "resolution", .. })
    ));
    assert!(matches!(
        Partition::new(complete_bipartite(2, 2, -1.0), QualityKind::Modularity, 1.0, EdgeWeights::Graph),
        Err(Error::InvalidParameter { name: "weights", .. })
    ));
    assert!(matches!(
        Graph::from_edges(3, false, &[(0, 3, 1.0)]),
        Err(Error::OutOfRange { what: "vertex", index: 3, bound: 3 })
    ));

    let mut partition = Partition::new(complete(4), QualityKind::Cpm, 0.1, EdgeWeights::Graph).unwrap();
    let mut optimiser = Optimiser::new().with_seed(0).with_max_comm_size(Some(0));
    assert!(matches!(
        optimiser.optimise_partition(&mut partition),
        Err(Error::InvalidParameter { name: "max_comm_size", .. })
    ));
}

#[test]
fn empty_and_edgeless_graphs_are_valid() {
    let mut optimiser = Optimiser::new().with_seed(0);

    let mut empty = Partition::new(Graph::from_edges(0, false, &[]).unwrap(), QualityKind::Cpm, 1.0, EdgeWeights::Graph).unwrap();
    assert_eq!(optimiser.optimise_partition(&mut empty).unwrap(), 0.0);
    assert!(empty.sizes().is_empty());

    let mut edgeless = Partition::new(Graph::from_edges(4, false, &[]).unwrap(), QualityKind::Modularity, 1.0, EdgeWeights::Graph).unwrap();
    assert_eq!(optimiser.optimise_partition(&mut edgeless).unwrap(), 0.0);
    assert_eq!(edgeless.sizes(), vec![1; 4]);
}
