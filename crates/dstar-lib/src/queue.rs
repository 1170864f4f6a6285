//! Open queue of nodes pending (re)expansion.
//!
//! Backed by a binary heap with lazy deletion: re-inserting a node pushes a
//! fresh entry and bumps its sequence number, so older entries for the same
//! node are recognised as stale and discarded when they surface.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::NodeRef;
use crate::path::FloatOrd;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry<N> {
    key: FloatOrd,
    node: N,
    seq: u64,
}

impl<N: Ord> Ord for QueueEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by key; ties go to
        // the smaller node.
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<N: Ord> PartialOrd for QueueEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority queue of open nodes ordered by ascending key.
#[derive(Debug)]
pub struct OpenQueue<N: NodeRef> {
    heap: BinaryHeap<QueueEntry<N>>,
    live: HashMap<N, (u64, f64)>,
    next_seq: u64,
}

impl<N: NodeRef> Default for OpenQueue<N> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            live: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<N: NodeRef> OpenQueue<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `node` under `key`, replacing any earlier key it was queued with.
    pub fn insert(&mut self, node: N, key: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(node, (seq, key));
        self.heap.push(QueueEntry {
            key: FloatOrd(key),
            node,
            seq,
        });
        self.prune();
    }

    /// Remove and return the node with the smallest key.
    pub fn extract_min(&mut self) -> Option<(N, f64)> {
        let entry = self.heap.pop()?;
        self.live.remove(&entry.node);
        self.prune();
        Some((entry.node, entry.key.0))
    }

    /// Drop `node` from the queue. Returns `false` if it was not queued.
    pub fn remove(&mut self, node: N) -> bool {
        let removed = self.live.remove(&node).is_some();
        self.prune();
        removed
    }

    /// Smallest key among queued nodes, or `+inf` when empty.
    pub fn min_key(&self) -> f64 {
        self.heap
            .peek()
            .map_or(f64::INFINITY, |entry| entry.key.0)
    }

    pub fn contains(&self, node: N) -> bool {
        self.live.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }

    /// Discard stale entries at the top so the heap head is always live.
    fn prune(&mut self) {
        while let Some(top) = self.heap.peek() {
            match self.live.get(&top.node) {
                Some((seq, _)) if *seq == top.seq => break,
                _ => {
                    self.heap.pop();
                }
            }
        }
    }
}
