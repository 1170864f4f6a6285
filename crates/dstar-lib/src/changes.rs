//! Translates graph mutation events into cost invalidations.
//!
//! Events are only applied at step boundaries: either explicitly through
//! [`DStarPlanner::apply_event`] or when a propagation step drains the
//! planner's subscription.

use crate::error::{Error, Result};
use crate::graph::{Graph, GraphEvent, NodeRef};
use crate::planner::DStarPlanner;

impl<N: NodeRef> DStarPlanner<N> {
    /// Apply every event the graph delivered since the last drain.
    pub fn sync_events<G>(&mut self, graph: &G) -> Result<usize>
    where
        G: Graph<Node = N>,
    {
        let events = match &self.subscription {
            Some(subscription) => subscription.drain(),
            None => return Ok(0),
        };
        let count = events.len();
        for event in events {
            self.apply_event(graph, event)?;
        }
        Ok(count)
    }

    /// React to a single graph mutation.
    ///
    /// Removing the goal or the current position, or clearing the graph, is
    /// fatal: the error is returned now and on every later call until the
    /// planner is re-initialized.
    pub fn apply_event<G>(&mut self, graph: &G, event: GraphEvent<N>) -> Result<()>
    where
        G: Graph<Node = N>,
    {
        let anchors = self.ready()?;

        match event {
            GraphEvent::NodeAdded(node) => {
                tracing::trace!(node = ?node, "node added; discovered on demand");
            }
            GraphEvent::EdgeAdded { from, to } => {
                tracing::debug!(from = ?from, to = ?to, "edge added");
                self.invalidate_edge(graph, from, to);
            }
            GraphEvent::EdgeRemoved { from, to } => {
                tracing::debug!(from = ?from, to = ?to, "edge removed");
                self.invalidate_edge(graph, from, to);
            }
            GraphEvent::EdgeAttributeChanged {
                from,
                to,
                key,
                value,
            } => {
                if key != self.cost.attribute() {
                    tracing::trace!(key = %key, "ignoring non-cost attribute change");
                    return Ok(());
                }
                tracing::debug!(from = ?from, to = ?to, value, "edge cost changed");
                self.invalidate_edge(graph, from, to);
            }
            GraphEvent::NodeRemoved { node, neighbours } => {
                if node == anchors.target {
                    return Err(self.fail(Error::GoalRemoved {
                        node: format!("{node:?}"),
                    }));
                }
                if node == anchors.source {
                    return Err(self.fail(Error::PositionRemoved {
                        node: format!("{node:?}"),
                    }));
                }
                tracing::debug!(node = ?node, neighbours = neighbours.len(), "node removed");
                self.open.remove(node);
                self.states.remove(node);

                let mut affected = neighbours;
                affected.extend(self.states.dependents_of(node));
                affected.sort_unstable();
                affected.dedup();
                for other in affected {
                    self.invalidate_endpoint(graph, other, node);
                }
            }
            GraphEvent::Cleared => {
                return Err(self.fail(Error::GraphCleared));
            }
        }

        Ok(())
    }

    /// Re-open both endpoints of an edge whose cost or existence changed.
    fn invalidate_edge<G>(&mut self, graph: &G, a: N, b: N)
    where
        G: Graph<Node = N>,
    {
        self.invalidate_endpoint(graph, a, b);
        self.invalidate_endpoint(graph, b, a);
    }

    /// An endpoint whose backpointer crosses the edge loses it and is raised;
    /// any other settled endpoint is re-queued at its current cost so a
    /// cheaper edge can be pushed outward.
    fn invalidate_endpoint<G>(&mut self, graph: &G, node: N, other: N)
    where
        G: Graph<Node = N>,
    {
        if !graph.contains_node(node) {
            return;
        }
        let Some(state) = self.states.get(node) else {
            return;
        };

        if state.backpointer == Some(other) {
            self.raise(node);
        } else if state.is_closed() {
            let state = self.states.state_of(node);
            state.prev_cost = state.cost;
            self.enqueue(node);
        }
    }

    fn fail(&mut self, error: Error) -> Error {
        tracing::error!(error = %error, "search precondition violated");
        let replay = error.replay();
        self.fault = Some(error);
        replay.unwrap_or(Error::GraphCleared)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::graph::{GraphEvent, MemoryGraph};
    use crate::planner::DStarPlanner;
    use crate::state::Tag;

    fn line() -> MemoryGraph<u32> {
        let mut graph = MemoryGraph::new();
        graph.add_edge_with_cost(1, 2, 1.0);
        graph.add_edge_with_cost(2, 3, 1.0);
        graph
    }

    #[test]
    fn events_require_initialization() {
        let graph = line();
        let mut planner = DStarPlanner::default();
        let error = planner
            .apply_event(&graph, GraphEvent::NodeAdded(4))
            .expect_err("not initialized");
        assert!(matches!(error, Error::NotInitialized));
    }

    #[test]
    fn cost_change_raises_dependent_endpoint() {
        let mut graph = line();
        let mut planner = DStarPlanner::default();
        planner.initialize(&mut graph, 1, 3).expect("init");
        planner.compute(&graph).expect("converge");

        graph.set_edge_cost(2, 3, 5.0);
        assert_eq!(planner.sync_events(&graph).expect("sync"), 1);

        let state = planner.state(2).expect("state");
        assert_eq!(state.tag, Tag::Open);
        assert_eq!(state.backpointer, None);
        assert_eq!(state.cost, f64::INFINITY);
        assert_eq!(state.prev_cost, 1.0);
        // The goal endpoint does not depend on the edge; it is re-queued as is.
        assert!(planner.state(3).expect("goal").is_open());
    }

    #[test]
    fn unrelated_attribute_is_ignored() {
        let mut graph = line();
        let mut planner = DStarPlanner::default();
        planner.initialize(&mut graph, 1, 3).expect("init");
        planner.compute(&graph).expect("converge");

        graph.set_edge_attribute(1, 2, "colour", 3.0);
        planner.sync_events(&graph).expect("sync");
        assert_eq!(planner.open_len(), 0);
    }

    #[test]
    fn removing_goal_poisons_planner() {
        let mut graph = line();
        let mut planner = DStarPlanner::default();
        planner.initialize(&mut graph, 1, 3).expect("init");
        planner.compute(&graph).expect("converge");

        graph.remove_node(3);
        let error = planner.compute(&graph).expect_err("goal removed");
        assert!(matches!(error, Error::GoalRemoved { .. }));
        let again = planner.compute(&graph).expect_err("still poisoned");
        assert!(matches!(again, Error::GoalRemoved { .. }));
    }
}
