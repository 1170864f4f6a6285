use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::cost::CostFunction;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeRef};
use crate::planner::DStarPlanner;

impl<N: NodeRef> DStarPlanner<N> {
    /// Follow backpointers from `from` to the goal.
    ///
    /// The returned sequence starts at `from` and ends at the goal. Fails
    /// with [`Error::NoPath`] when the chain breaks before reaching the goal,
    /// which happens while the search is incomplete or the goal is
    /// unreachable. Does not mutate the planner.
    pub fn extract_path(&self, from: N) -> Result<Vec<N>> {
        let goal = self.ready()?.target;
        let no_path = || Error::NoPath {
            from: format!("{from:?}"),
            goal: format!("{goal:?}"),
        };

        if from == goal {
            return Ok(vec![goal]);
        }

        let start = self.states.get(from).ok_or_else(no_path)?;
        if start.is_new() || !start.cost.is_finite() {
            return Err(no_path());
        }

        // A chain longer than the number of known states must contain a
        // cycle, which only a half-repaired search can produce.
        let limit = self.states.len();
        let mut path = vec![from];
        let mut current = from;
        while current != goal {
            let next = self.states.backpointer(current).ok_or_else(no_path)?;
            if path.len() > limit {
                return Err(no_path());
            }
            path.push(next);
            current = next;
        }

        Ok(path)
    }

    /// Finite cost estimate from `node` to the goal, if one is known.
    pub fn path_cost(&self, node: N) -> Option<f64> {
        self.states
            .get(node)
            .filter(|state| !state.is_new() && state.cost.is_finite())
            .map(|state| state.cost)
    }
}

/// Sum the edge costs along a path that ends at the goal.
///
/// Each hop is priced the way the planner prices it: the cost of stepping
/// from `path[i]` onto `path[i + 1]` is `cost(path[i + 1], path[i])`. Returns
/// `+inf` if two consecutive nodes are not connected.
pub fn route_cost<G: Graph>(graph: &G, path: &[G::Node], cost: &CostFunction) -> f64 {
    path.windows(2)
        .map(|pair| cost.traversal(graph, pair[1], pair[0]))
        .sum()
}

/// Static shortest distances to `goal` for every node that can reach it,
/// computed from scratch with Dijkstra's algorithm under the same cost
/// function the planner uses.
pub fn dijkstra_distances<G: Graph>(
    graph: &G,
    goal: G::Node,
    cost: &CostFunction,
) -> HashMap<G::Node, f64> {
    let mut distances: HashMap<G::Node, f64> = HashMap::new();
    let mut queue = BinaryHeap::new();

    if !graph.contains_node(goal) {
        return distances;
    }

    distances.insert(goal, 0.0);
    queue.push(QueueEntry::new(goal, 0.0));

    while let Some(entry) = queue.pop() {
        let current_distance = match distances.get(&entry.node) {
            Some(distance) if *distance < entry.cost.0 => continue,
            Some(distance) => *distance,
            None => continue,
        };

        for next in graph.neighbours(entry.node) {
            let next_cost = current_distance + cost.traversal(graph, entry.node, next);
            if next_cost < *distances.get(&next).unwrap_or(&f64::INFINITY) {
                distances.insert(next, next_cost);
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    distances
}

/// Total ordering wrapper for `f64` costs.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct FloatOrd(pub(crate) f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry<N> {
    node: N,
    cost: FloatOrd,
}

impl<N> QueueEntry<N> {
    fn new(node: N, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl<N: Ord> Ord for QueueEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl<N: Ord> PartialOrd for QueueEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
