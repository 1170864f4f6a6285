//! Per-node incremental search bookkeeping.

use std::collections::HashMap;

use serde::Serialize;

use crate::graph::NodeRef;

/// Lifecycle stage of a node's search state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// Never visited.
    New,
    /// Queued; cost is tentative.
    Open,
    /// Settled.
    Closed,
    /// Open with a cost at or below the value it was queued with.
    Lower,
    /// Open with a cost above the value it was queued with.
    Raise,
}

/// Search state of a single node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchState<N> {
    pub tag: Tag,
    /// Next hop toward the goal on the current best path.
    pub backpointer: Option<N>,
    /// Current estimate of the path cost to the goal (`h`).
    pub cost: f64,
    /// Cost estimate recorded when the node was last queued (`p`).
    pub prev_cost: f64,
}

impl<N> Default for SearchState<N> {
    fn default() -> Self {
        Self {
            tag: Tag::New,
            backpointer: None,
            cost: 0.0,
            prev_cost: 0.0,
        }
    }
}

impl<N> SearchState<N> {
    /// Queue ordering value, `min(cost, prev_cost)`.
    pub fn key(&self) -> f64 {
        self.cost.min(self.prev_cost)
    }

    /// Direction in which this node's cost is moving: [`Tag::Lower`] when
    /// the cost has not risen above the queued value, [`Tag::Raise`] otherwise.
    pub fn trend(&self) -> Tag {
        if self.prev_cost >= self.cost {
            Tag::Lower
        } else {
            Tag::Raise
        }
    }

    pub fn is_new(&self) -> bool {
        self.tag == Tag::New
    }

    pub fn is_open(&self) -> bool {
        self.tag == Tag::Open
    }

    pub fn is_closed(&self) -> bool {
        self.tag == Tag::Closed
    }
}

/// Side table mapping node identity to its search state.
#[derive(Debug)]
pub struct StateTable<N: NodeRef> {
    states: HashMap<N, SearchState<N>>,
}

impl<N: NodeRef> Default for StateTable<N> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
        }
    }
}

impl<N: NodeRef> StateTable<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing state for `node`, or a fresh `New` state created on demand.
    pub fn state_of(&mut self, node: N) -> &mut SearchState<N> {
        self.states.entry(node).or_default()
    }

    /// State for `node` if it was ever referenced.
    pub fn get(&self, node: N) -> Option<&SearchState<N>> {
        self.states.get(&node)
    }

    /// Cost estimate of `node`, or `0` for unreferenced nodes.
    pub fn cost(&self, node: N) -> f64 {
        self.states.get(&node).map_or(0.0, |state| state.cost)
    }

    pub fn backpointer(&self, node: N) -> Option<N> {
        self.states.get(&node).and_then(|state| state.backpointer)
    }

    pub fn remove(&mut self, node: N) -> Option<SearchState<N>> {
        self.states.remove(&node)
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Nodes whose backpointer currently names `target`.
    pub fn dependents_of(&self, target: N) -> Vec<N> {
        let mut nodes: Vec<N> = self
            .states
            .iter()
            .filter(|(_, state)| state.backpointer == Some(target))
            .map(|(node, _)| *node)
            .collect();
        nodes.sort_unstable();
        nodes
    }
}
