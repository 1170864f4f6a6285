#![allow(dead_code)]

use std::path::PathBuf;

use dstar_lib::{dijkstra_distances, route_cost, DStarPlanner, Graph, MemoryGraph, NodeRef};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Scenario A graph: A->B, B->D, A->C, C->D, all costing 1.
pub fn diamond() -> MemoryGraph<&'static str> {
    let mut graph = MemoryGraph::new();
    graph.add_edge_with_cost("A", "B", 1.0);
    graph.add_edge_with_cost("B", "D", 1.0);
    graph.add_edge_with_cost("A", "C", 1.0);
    graph.add_edge_with_cost("C", "D", 1.0);
    graph
}

/// Small seeded generator so randomized tests replay identically.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    /// Uniform-ish index in `0..bound`.
    pub fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }

    /// Edge weight in `1.0..=9.0`.
    pub fn weight(&mut self) -> f64 {
        (self.next() % 9 + 1) as f64
    }
}

/// Deterministic pseudo-random weights in `1.0..=9.0` so incremental tests
/// exercise uneven costs without a rand dependency.
pub fn lcg_weights(seed: u64) -> impl FnMut(u32, u32) -> f64 {
    let mut rng = Lcg::new(seed);
    move |_, _| rng.weight()
}

/// Assert that every node the planner reports a finite cost for agrees
/// with a from-scratch Dijkstra run, and that every node Dijkstra reaches
/// has a consistent backpointer chain.
pub fn assert_matches_dijkstra<N: NodeRef>(
    planner: &DStarPlanner<N>,
    graph: &MemoryGraph<N>,
    goal: N,
) {
    let cost = planner.cost_function();
    let distances = dijkstra_distances(graph, goal, cost);

    for node in graph.nodes() {
        let expected = distances.get(&node).copied();
        let actual = planner.path_cost(node);
        match expected {
            Some(distance) => {
                let actual = actual.unwrap_or_else(|| panic!("{node:?} should be reachable"));
                assert!(
                    (actual - distance).abs() < 1e-9,
                    "{node:?}: planner {actual} vs dijkstra {distance}"
                );
                let path = planner
                    .extract_path(node)
                    .unwrap_or_else(|error| panic!("{node:?}: {error}"));
                assert_path_consistent(planner, graph, &path, goal);
            }
            None => assert!(actual.is_none(), "{node:?} should be unreachable"),
        }
    }
}

/// Path starts at its first node, ends at the goal, only uses existing
/// edges, and its summed cost equals the start node's cost estimate.
pub fn assert_path_consistent<N: NodeRef>(
    planner: &DStarPlanner<N>,
    graph: &MemoryGraph<N>,
    path: &[N],
    goal: N,
) {
    assert_eq!(path.last(), Some(&goal), "path must end at the goal");
    for pair in path.windows(2) {
        assert!(
            graph.connects(pair[0], pair[1]),
            "{:?} and {:?} are not adjacent",
            pair[0],
            pair[1]
        );
    }
    let summed = route_cost(graph, path, planner.cost_function());
    let estimate = planner.path_cost(path[0]).expect("finite estimate");
    assert!(
        (summed - estimate).abs() < 1e-9,
        "path cost {summed} disagrees with estimate {estimate}"
    );
}
