//! Small deterministic graph generators for tests, demos, and benchmarks.

use crate::graph::MemoryGraph;

/// Node id of cell `(x, y)` in a grid `width` cells wide.
pub fn grid_id(x: u32, y: u32, width: u32) -> u32 {
    y * width + x
}

/// 4-connected `width` x `height` lattice with every edge costing `weight`.
///
/// Each adjacent pair is linked in both directions.
pub fn grid_graph(width: u32, height: u32, weight: f64) -> MemoryGraph<u32> {
    grid_graph_with(width, height, |_, _| weight)
}

/// 4-connected lattice whose edge costs come from `weight(from, to)`.
pub fn grid_graph_with<F>(width: u32, height: u32, mut weight: F) -> MemoryGraph<u32>
where
    F: FnMut(u32, u32) -> f64,
{
    let mut graph = MemoryGraph::new();
    for y in 0..height {
        for x in 0..width {
            let id = grid_id(x, y, width);
            graph.add_node(id);
            if x + 1 < width {
                let right = grid_id(x + 1, y, width);
                graph.add_edge_with_cost(id, right, weight(id, right));
                graph.add_edge_with_cost(right, id, weight(right, id));
            }
            if y + 1 < height {
                let below = grid_id(x, y + 1, width);
                graph.add_edge_with_cost(id, below, weight(id, below));
                graph.add_edge_with_cost(below, id, weight(below, id));
            }
        }
    }
    graph
}

/// Path graph `0 - 1 - ... - (len - 1)` with bidirectional edges.
pub fn chain_graph(len: u32, weight: f64) -> MemoryGraph<u32> {
    let mut graph = MemoryGraph::new();
    for id in 0..len {
        graph.add_node(id);
        if id > 0 {
            graph.add_edge_with_cost(id - 1, id, weight);
            graph.add_edge_with_cost(id, id - 1, weight);
        }
    }
    graph
}
