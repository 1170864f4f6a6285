//! Incremental D* planner: episode anchors and the propagation engine.
//!
//! The planner searches backwards from the target. Every node's cost is the
//! best known cost of reaching the target from it, and its backpointer names
//! the next hop. Graph mutations re-open only the affected region (see
//! [`crate::changes`]) and later `compute` calls repair it in place.

use serde::Serialize;

use crate::config::PlannerConfig;
use crate::cost::CostFunction;
use crate::error::{Error, Result};
use crate::graph::{Graph, NodeRef, ObservableGraph, Subscription};
use crate::queue::OpenQueue;
use crate::state::{SearchState, StateTable, Tag};

/// Source and target of the current planning episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Anchors<N> {
    pub(crate) source: N,
    pub(crate) target: N,
}

/// Summary of a `compute` run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComputeOutcome {
    /// Number of `process_state` expansions performed.
    pub steps: usize,
    /// `true` when the run ended because the open queue emptied before the
    /// source settled.
    pub exhausted: bool,
    /// Smallest key left in the queue (`+inf` when empty).
    pub min_key: f64,
    /// Cost estimate of the source once the run ended.
    pub source_cost: f64,
}

/// D* planner over any [`Graph`] whose nodes are `N`.
#[derive(Debug)]
pub struct DStarPlanner<N: NodeRef> {
    pub(crate) config: PlannerConfig,
    pub(crate) cost: CostFunction,
    pub(crate) states: StateTable<N>,
    pub(crate) open: OpenQueue<N>,
    pub(crate) anchors: Option<Anchors<N>>,
    pub(crate) subscription: Option<Subscription<N>>,
    pub(crate) fault: Option<Error>,
}

impl<N: NodeRef> Default for DStarPlanner<N> {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl<N: NodeRef> DStarPlanner<N> {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            cost: CostFunction::from_config(&config),
            config,
            states: StateTable::new(),
            open: OpenQueue::new(),
            anchors: None,
            subscription: None,
            fault: None,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn cost_function(&self) -> &CostFunction {
        &self.cost
    }

    /// Current position, if an episode is active.
    pub fn source(&self) -> Option<N> {
        self.anchors.map(|anchors| anchors.source)
    }

    /// Current goal, if an episode is active.
    pub fn target(&self) -> Option<N> {
        self.anchors.map(|anchors| anchors.target)
    }

    /// Search state of `node`, if it was ever referenced.
    pub fn state(&self, node: N) -> Option<&SearchState<N>> {
        self.states.get(node)
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    pub fn min_key(&self) -> f64 {
        self.open.min_key()
    }

    /// Whether the graph subscription is still live.
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Start a new episode on `graph`.
    ///
    /// Discards all previous search state, subscribes to the graph's change
    /// notifications, and seeds the target with cost `0`.
    pub fn initialize<G>(&mut self, graph: &mut G, source: N, target: N) -> Result<()>
    where
        G: ObservableGraph<Node = N>,
    {
        ensure_node(&*graph, source)?;
        ensure_node(&*graph, target)?;

        self.states.clear();
        self.open.clear();
        self.fault = None;
        // Dropping a previous receiver detaches it; the old graph prunes the
        // dead sender on its next mutation.
        self.subscription = Some(graph.subscribe());
        self.anchors = Some(Anchors { source, target });

        self.anchor_target(target);
        tracing::debug!(source = ?source, target = ?target, "initialized episode");
        Ok(())
    }

    /// Move the current position without discarding accumulated state.
    pub fn set_source<G>(&mut self, graph: &G, source: N) -> Result<()>
    where
        G: Graph<Node = N>,
    {
        let mut anchors = self.ready()?;
        ensure_node(graph, source)?;
        anchors.source = source;
        self.anchors = Some(anchors);
        tracing::debug!(source = ?source, "moved source");
        Ok(())
    }

    /// Re-anchor the search on a new goal.
    ///
    /// Other nodes keep their state. The old target loses its fixed zero
    /// cost and is re-queued as a raised node, so costs derived from it are
    /// repaired by the next `compute`.
    pub fn set_target<G>(&mut self, graph: &G, target: N) -> Result<()>
    where
        G: Graph<Node = N>,
    {
        let mut anchors = self.ready()?;
        ensure_node(graph, target)?;
        if anchors.target == target {
            return Ok(());
        }

        let previous = anchors.target;
        anchors.target = target;
        self.anchors = Some(anchors);

        self.anchor_target(target);
        self.raise(previous);
        tracing::debug!(previous = ?previous, target = ?target, "moved target");
        Ok(())
    }

    /// Expand the open node with the smallest key.
    ///
    /// Pending graph events are applied first. Returns the new minimum key,
    /// or `-1` once the open queue is empty.
    pub fn process_state<G>(&mut self, graph: &G) -> Result<f64>
    where
        G: Graph<Node = N>,
    {
        let target = self.ready()?.target;
        self.sync_events(graph)?;

        let Some((x, k_old)) = self.open.extract_min() else {
            return Ok(-1.0);
        };
        self.states.state_of(x).tag = Tag::Closed;

        let neighbours = graph.neighbours(x);

        // Settled neighbours may offer x a cheaper route before x pushes
        // its own cost outward.
        if x != target {
            for &y in &neighbours {
                let Some(y_state) = self.states.get(y) else {
                    continue;
                };
                if !y_state.is_closed() || y_state.cost > k_old {
                    continue;
                }
                let via_y = y_state.cost + self.edge_cost(graph, y, x);
                let x_state = self.states.state_of(x);
                if x_state.cost > via_y {
                    x_state.backpointer = Some(y);
                    x_state.cost = via_y;
                }
            }
        }

        // Lower or raise is fixed for the whole expansion. Re-queuing x below
        // resets its prev cost, which must not turn it into a lowering node
        // that later neighbours get redirected onto.
        let lowering = self.states.state_of(x).trend() == Tag::Lower;

        for &y in &neighbours {
            if y == target {
                continue;
            }

            // x may be re-queued mid-loop, so read its state on every pass.
            let x_state = self.states.state_of(x).clone();
            let through_x = x_state.cost + self.edge_cost(graph, x, y);
            let y_state = self.states.state_of(y).clone();

            if y_state.is_new() {
                let state = self.states.state_of(y);
                state.backpointer = Some(x);
                state.cost = through_x;
                state.prev_cost = through_x;
                self.enqueue(y);
            } else if y_state.backpointer == Some(x) && y_state.cost != through_x {
                let state = self.states.state_of(y);
                if y_state.is_open() {
                    state.prev_cost = state.prev_cost.min(state.cost);
                } else {
                    // A raised node keeps the key it settled with.
                    state.prev_cost = state.cost.min(through_x);
                }
                state.cost = through_x;
                self.enqueue(y);
            } else if y_state.backpointer != Some(x) && y_state.cost > through_x {
                if lowering {
                    let state = self.states.state_of(y);
                    state.backpointer = Some(x);
                    state.cost = through_x;
                    if y_state.is_closed() {
                        state.prev_cost = through_x;
                    }
                    self.enqueue(y);
                } else {
                    let state = self.states.state_of(x);
                    state.prev_cost = state.cost;
                    self.enqueue(x);
                }
            } else if !lowering
                && y_state.backpointer != Some(x)
                && y_state.is_closed()
                && y_state.cost > k_old
                && x_state.cost > y_state.cost + self.edge_cost(graph, y, x)
            {
                let state = self.states.state_of(y);
                state.prev_cost = state.cost;
                self.enqueue(y);
            }
        }

        tracing::trace!(
            node = ?x,
            k_old,
            cost = self.states.cost(x),
            open = self.open.len(),
            "expanded node"
        );

        if self.open.is_empty() {
            Ok(-1.0)
        } else {
            Ok(self.open.min_key())
        }
    }

    /// Propagate until the source is settled or the open queue empties.
    ///
    /// The source counts as settled once it is closed and no queued key is
    /// below its cost, so a converged planner performs no work on repeat
    /// calls.
    pub fn compute<G>(&mut self, graph: &G) -> Result<ComputeOutcome>
    where
        G: Graph<Node = N>,
    {
        self.run(graph, true)
    }

    /// Propagate until the open queue is empty, settling every reachable
    /// node rather than only the source.
    pub fn compute_all<G>(&mut self, graph: &G) -> Result<ComputeOutcome>
    where
        G: Graph<Node = N>,
    {
        self.run(graph, false)
    }

    /// Stop listening for graph changes. Accumulated state is kept.
    pub fn terminate<G>(&mut self, graph: &mut G)
    where
        G: ObservableGraph<Node = N>,
    {
        if let Some(subscription) = self.subscription.take() {
            graph.unsubscribe(subscription.id());
            tracing::debug!("unsubscribed from graph changes");
        }
    }

    fn run<G>(&mut self, graph: &G, stop_at_source: bool) -> Result<ComputeOutcome>
    where
        G: Graph<Node = N>,
    {
        self.ready()?;
        self.sync_events(graph)?;

        let mut steps = 0usize;
        let exhausted = loop {
            let source = self.ready()?.source;
            if stop_at_source && self.is_settled(source) {
                break false;
            }
            if self.open.is_empty() {
                break true;
            }
            if let Some(limit) = self.config.step_limit {
                if steps >= limit {
                    tracing::warn!(limit, open = self.open.len(), "step limit reached");
                    return Err(Error::StepLimitExceeded { limit });
                }
            }
            self.process_state(graph)?;
            steps += 1;
        };

        let source = self.ready()?.source;
        let outcome = ComputeOutcome {
            steps,
            exhausted,
            min_key: self.open.min_key(),
            source_cost: self.source_cost(source),
        };
        tracing::debug!(
            steps,
            exhausted,
            open = self.open.len(),
            source_cost = outcome.source_cost,
            "compute finished"
        );
        Ok(outcome)
    }

    fn is_settled(&self, source: N) -> bool {
        self.states
            .get(source)
            .is_some_and(|state| state.is_closed() && self.open.min_key() >= state.cost)
    }

    fn source_cost(&self, source: N) -> f64 {
        match self.states.get(source) {
            Some(state) if !state.is_new() => state.cost,
            _ => f64::INFINITY,
        }
    }

    /// Active anchors, or the reason the planner cannot run.
    pub(crate) fn ready(&self) -> Result<Anchors<N>> {
        if let Some(replayed) = self.fault.as_ref().and_then(Error::replay) {
            return Err(replayed);
        }
        self.anchors.ok_or(Error::NotInitialized)
    }

    /// Mark `node` open and queue it under its current key.
    pub(crate) fn enqueue(&mut self, node: N) {
        let state = self.states.state_of(node);
        debug_assert_eq!(state.is_open(), self.open.contains(node));
        state.tag = Tag::Open;
        let key = state.key();
        self.open.insert(node, key);
    }

    /// Cut `node` loose from its backpointer and queue it with an infinite
    /// cost; the key stays at the cost it had so the rise propagates in
    /// order.
    pub(crate) fn raise(&mut self, node: N) {
        let Some(existing) = self.states.get(node) else {
            return;
        };
        if existing.is_new() {
            return;
        }
        let state = self.states.state_of(node);
        state.prev_cost = if state.is_open() {
            state.prev_cost.min(state.cost)
        } else {
            state.cost
        };
        state.backpointer = None;
        state.cost = f64::INFINITY;
        self.enqueue(node);
    }

    fn anchor_target(&mut self, target: N) {
        let state = self.states.state_of(target);
        state.backpointer = None;
        state.cost = 0.0;
        state.prev_cost = 0.0;
        self.enqueue(target);
    }

    /// Edge cost that is safe to compare. Propagation only asks about
    /// adjacent pairs, so a missing edge here means the graph changed
    /// underneath us without a notification.
    fn edge_cost<G>(&self, graph: &G, x: N, y: N) -> f64
    where
        G: Graph<Node = N>,
    {
        let cost = self.cost.cost(graph, x, y);
        debug_assert!(!cost.is_nan(), "no edge between {x:?} and {y:?}");
        if cost.is_nan() {
            f64::INFINITY
        } else {
            cost
        }
    }
}

pub(crate) fn ensure_node<G: Graph>(graph: &G, node: G::Node) -> Result<()> {
    if graph.contains_node(node) {
        Ok(())
    } else {
        Err(Error::UnknownNode {
            node: format!("{node:?}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraph;

    fn diamond() -> MemoryGraph<&'static str> {
        let mut graph = MemoryGraph::new();
        graph.add_edge_with_cost("A", "B", 1.0);
        graph.add_edge_with_cost("B", "D", 1.0);
        graph.add_edge_with_cost("A", "C", 1.0);
        graph.add_edge_with_cost("C", "D", 1.0);
        graph
    }

    #[test]
    fn compute_before_initialize_fails() {
        let graph = diamond();
        let mut planner = DStarPlanner::default();
        let error = planner.compute(&graph).expect_err("not initialized");
        assert!(matches!(error, Error::NotInitialized));
    }

    #[test]
    fn initialize_rejects_unknown_anchor() {
        let mut graph = diamond();
        let mut planner = DStarPlanner::default();
        let error = planner
            .initialize(&mut graph, "A", "Z")
            .expect_err("unknown target");
        assert!(matches!(error, Error::UnknownNode { .. }));
    }

    #[test]
    fn first_step_expands_the_goal() {
        let mut graph = diamond();
        let mut planner = DStarPlanner::default();
        planner.initialize(&mut graph, "A", "D").expect("init");

        let key = planner.process_state(&graph).expect("step");
        assert_eq!(key, 1.0);
        assert!(planner.state("D").expect("goal").is_closed());
        let b = planner.state("B").expect("discovered");
        assert!(b.is_open());
        assert_eq!(b.backpointer, Some("D"));
        assert_eq!(b.cost, 1.0);
        assert_eq!(planner.open_len(), 2);
    }

    #[test]
    fn process_state_on_empty_queue_returns_negative() {
        let mut graph = MemoryGraph::new();
        graph.add_node(1u32);
        let mut planner = DStarPlanner::default();
        planner.initialize(&mut graph, 1, 1).expect("init");

        assert_eq!(planner.process_state(&graph).expect("step"), -1.0);
        assert_eq!(planner.process_state(&graph).expect("step"), -1.0);
    }

    #[test]
    fn step_limit_stops_compute() {
        let mut graph = diamond();
        let mut planner = DStarPlanner::new(PlannerConfig::default().with_step_limit(1));
        planner.initialize(&mut graph, "A", "D").expect("init");

        let error = planner.compute(&graph).expect_err("limited");
        assert!(matches!(error, Error::StepLimitExceeded { limit: 1 }));
        // State stays consistent; later calls keep making progress.
        while planner.compute(&graph).is_err() {}
        assert_eq!(planner.state("A").expect("source").cost, 2.0);
    }

    #[test]
    fn terminate_detaches_subscription() {
        let mut graph = diamond();
        let mut planner = DStarPlanner::default();
        planner.initialize(&mut graph, "A", "D").expect("init");
        assert!(planner.is_subscribed());
        planner.terminate(&mut graph);
        assert!(!planner.is_subscribed());
    }
}
