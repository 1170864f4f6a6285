//! Graph collaborator contract and an in-memory implementation.
//!
//! The planner never owns the graph. It reads adjacency and edge attributes
//! through [`Graph`] and learns about mutations through the synchronous event
//! channel exposed by [`ObservableGraph`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::config::DEFAULT_COST_ATTRIBUTE;

/// Opaque node handle. The planner only copies, compares, and hashes it.
pub trait NodeRef: Copy + Eq + Hash + Ord + Debug {}

impl<T: Copy + Eq + Hash + Ord + Debug> NodeRef for T {}

/// Read access required by the search core.
pub trait Graph {
    type Node: NodeRef;

    /// Whether the node currently exists.
    fn contains_node(&self, node: Self::Node) -> bool;

    /// Every node sharing an edge with `node`, in either direction, in a
    /// deterministic order.
    fn neighbours(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Whether the directed edge `from -> to` exists.
    fn has_edge(&self, from: Self::Node, to: Self::Node) -> bool;

    /// Numeric attribute stored on the directed edge `from -> to`.
    fn edge_attribute(&self, from: Self::Node, to: Self::Node, key: &str) -> Option<f64>;

    /// Whether an edge connects the two nodes in either direction.
    fn connects(&self, a: Self::Node, b: Self::Node) -> bool {
        self.has_edge(a, b) || self.has_edge(b, a)
    }
}

/// Identifier handed out by [`ObservableGraph::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Mutation notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent<N> {
    NodeAdded(N),
    /// `neighbours` lists every node that shared an edge with the removed
    /// node right before it disappeared.
    NodeRemoved {
        node: N,
        neighbours: Vec<N>,
    },
    EdgeAdded {
        from: N,
        to: N,
    },
    EdgeRemoved {
        from: N,
        to: N,
    },
    EdgeAttributeChanged {
        from: N,
        to: N,
        key: String,
        value: f64,
    },
    Cleared,
}

/// Receiving end of a graph subscription.
#[derive(Debug)]
pub struct Subscription<N> {
    id: SubscriptionId,
    receiver: Receiver<GraphEvent<N>>,
}

impl<N> Subscription<N> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Take every event delivered since the last drain, oldest first.
    pub fn drain(&self) -> Vec<GraphEvent<N>> {
        self.receiver.try_iter().collect()
    }
}

/// Graph that can notify subscribers about its mutations.
///
/// Events must be delivered before the mutating call returns.
pub trait ObservableGraph: Graph {
    fn subscribe(&mut self) -> Subscription<Self::Node>;

    /// Returns `false` when the id was not subscribed.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}

/// Attribute bag attached to every edge.
pub type EdgeAttributes = BTreeMap<String, f64>;

/// Directed graph stored in ordered maps so iteration is deterministic.
#[derive(Debug)]
pub struct MemoryGraph<N: NodeRef> {
    incidence: BTreeMap<N, BTreeSet<N>>,
    edges: BTreeMap<(N, N), EdgeAttributes>,
    subscribers: Vec<(SubscriptionId, Sender<GraphEvent<N>>)>,
    next_subscription: u64,
}

impl<N: NodeRef> Default for MemoryGraph<N> {
    fn default() -> Self {
        Self {
            incidence: BTreeMap::new(),
            edges: BTreeMap::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }
}

impl<N: NodeRef> MemoryGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.incidence.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.incidence.keys().copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = (N, N, &EdgeAttributes)> + '_ {
        self.edges
            .iter()
            .map(|((from, to), attributes)| (*from, *to, attributes))
    }

    /// Insert a node. Returns `false` if it already existed.
    pub fn add_node(&mut self, node: N) -> bool {
        if self.incidence.contains_key(&node) {
            return false;
        }
        self.incidence.insert(node, BTreeSet::new());
        self.emit(GraphEvent::NodeAdded(node));
        true
    }

    /// Insert the directed edge `from -> to` without attributes, creating
    /// missing endpoints. Returns `false` if the edge already existed.
    pub fn add_edge(&mut self, from: N, to: N) -> bool {
        self.add_node(from);
        self.add_node(to);
        if self.edges.contains_key(&(from, to)) {
            return false;
        }
        self.edges.insert((from, to), EdgeAttributes::new());
        self.link(from, to);
        self.emit(GraphEvent::EdgeAdded { from, to });
        true
    }

    /// Insert (or update) `from -> to` carrying the given attribute.
    pub fn add_edge_with_attribute(&mut self, from: N, to: N, key: &str, value: f64) {
        self.add_edge(from, to);
        self.set_edge_attribute(from, to, key, value);
    }

    /// Insert (or update) `from -> to` with a value for the default cost
    /// attribute.
    pub fn add_edge_with_cost(&mut self, from: N, to: N, cost: f64) {
        self.add_edge_with_attribute(from, to, DEFAULT_COST_ATTRIBUTE, cost);
    }

    /// Store an attribute on an existing edge. Returns `false` when the edge
    /// does not exist.
    pub fn set_edge_attribute(&mut self, from: N, to: N, key: &str, value: f64) -> bool {
        let Some(attributes) = self.edges.get_mut(&(from, to)) else {
            return false;
        };
        attributes.insert(key.to_string(), value);
        self.emit(GraphEvent::EdgeAttributeChanged {
            from,
            to,
            key: key.to_string(),
            value,
        });
        true
    }

    /// Update the default cost attribute on an existing edge.
    pub fn set_edge_cost(&mut self, from: N, to: N, cost: f64) -> bool {
        self.set_edge_attribute(from, to, DEFAULT_COST_ATTRIBUTE, cost)
    }

    /// Remove the directed edge `from -> to`. Returns `false` if absent.
    pub fn remove_edge(&mut self, from: N, to: N) -> bool {
        if self.edges.remove(&(from, to)).is_none() {
            return false;
        }
        if !self.edges.contains_key(&(to, from)) {
            self.unlink(from, to);
        }
        self.emit(GraphEvent::EdgeRemoved { from, to });
        true
    }

    /// Remove a node with every incident edge. Returns `false` if absent.
    pub fn remove_node(&mut self, node: N) -> bool {
        let Some(adjacent) = self.incidence.remove(&node) else {
            return false;
        };
        let neighbours: Vec<N> = adjacent.into_iter().collect();
        for &other in &neighbours {
            self.edges.remove(&(node, other));
            self.edges.remove(&(other, node));
            if let Some(set) = self.incidence.get_mut(&other) {
                set.remove(&node);
            }
        }
        // Self-loops are not tracked in `incidence` but may still exist.
        self.edges.remove(&(node, node));
        self.emit(GraphEvent::NodeRemoved { node, neighbours });
        true
    }

    /// Drop every node and edge.
    pub fn clear(&mut self) {
        self.incidence.clear();
        self.edges.clear();
        self.emit(GraphEvent::Cleared);
    }

    fn link(&mut self, a: N, b: N) {
        if a == b {
            return;
        }
        self.incidence.entry(a).or_default().insert(b);
        self.incidence.entry(b).or_default().insert(a);
    }

    fn unlink(&mut self, a: N, b: N) {
        if let Some(set) = self.incidence.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(set) = self.incidence.get_mut(&b) {
            set.remove(&a);
        }
    }

    fn emit(&mut self, event: GraphEvent<N>) {
        // Subscribers whose receiver was dropped are pruned on send failure.
        self.subscribers
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
    }
}

impl<N: NodeRef> Graph for MemoryGraph<N> {
    type Node = N;

    fn contains_node(&self, node: N) -> bool {
        self.incidence.contains_key(&node)
    }

    fn neighbours(&self, node: N) -> Vec<N> {
        self.incidence
            .get(&node)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn has_edge(&self, from: N, to: N) -> bool {
        self.edges.contains_key(&(from, to))
    }

    fn edge_attribute(&self, from: N, to: N, key: &str) -> Option<f64> {
        self.edges
            .get(&(from, to))
            .and_then(|attributes| attributes.get(key).copied())
    }
}

impl<N: NodeRef> ObservableGraph for MemoryGraph<N> {
    fn subscribe(&mut self) -> Subscription<N> {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push((id, sender));
        Subscription { id, receiver }
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }
}
