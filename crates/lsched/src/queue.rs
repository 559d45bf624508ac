//! Ready queues.
//!
//! A ready queue holds the nodes whose predecessors have all been emitted and
//! decides which one goes next. Strategies differ only in that choice; the
//! scheduler's ordering guarantees hold for any of them.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use lsched_dag::{DepGraph, NodeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{SchedConfig, Strategy};

/// Candidate selection policy.
pub trait ReadyQueue {
    /// Add a ready node.
    fn push(&mut self, graph: &DepGraph, node: NodeId);

    /// Remove and return the node to emit at `cycle`.
    fn pop_best(&mut self, graph: &DepGraph, cycle: u32) -> Option<NodeId>;

    /// Number of ready nodes.
    fn len(&self) -> usize;

    /// Drop all ready nodes.
    fn clear(&mut self);

    /// Check if no node is ready.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Greatest total latency first; ties go to the earliest node.
#[derive(Debug, Default)]
pub struct CriticalPathQueue {
    heap: BinaryHeap<(u32, Reverse<NodeId>)>,
}

impl CriticalPathQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadyQueue for CriticalPathQueue {
    fn push(&mut self, graph: &DepGraph, node: NodeId) {
        self.heap.push((graph.node(node).total_latency(), Reverse(node)));
    }

    fn pop_best(&mut self, _graph: &DepGraph, _cycle: u32) -> Option<NodeId> {
        self.heap.pop().map(|(_, Reverse(node))| node)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn clear(&mut self) {
        self.heap.clear();
    }
}

/// Uniformly random choice from a seeded generator.
#[derive(Debug)]
pub struct StressQueue {
    ready: Vec<NodeId>,
    rng: StdRng,
}

impl StressQueue {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            ready: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl ReadyQueue for StressQueue {
    fn push(&mut self, _graph: &DepGraph, node: NodeId) {
        self.ready.push(node);
    }

    fn pop_best(&mut self, _graph: &DepGraph, _cycle: u32) -> Option<NodeId> {
        if self.ready.is_empty() {
            return None;
        }
        let pick = self.rng.gen_range(0..self.ready.len());
        Some(self.ready.swap_remove(pick))
    }

    fn len(&self) -> usize {
        self.ready.len()
    }

    fn clear(&mut self) {
        self.ready.clear();
    }
}

/// Queue selected by [`Strategy`].
#[derive(Debug)]
pub enum Queue {
    CriticalPath(CriticalPathQueue),
    Stress(StressQueue),
}

impl Queue {
    /// Queue for `config`'s strategy, seeded from `config.seed`.
    pub fn for_config(config: &SchedConfig) -> Self {
        match config.strategy {
            Strategy::CriticalPath => Self::CriticalPath(CriticalPathQueue::new()),
            Strategy::Stress => Self::Stress(StressQueue::new(config.seed)),
        }
    }
}

impl ReadyQueue for Queue {
    fn push(&mut self, graph: &DepGraph, node: NodeId) {
        match self {
            Self::CriticalPath(q) => q.push(graph, node),
            Self::Stress(q) => q.push(graph, node),
        }
    }

    fn pop_best(&mut self, graph: &DepGraph, cycle: u32) -> Option<NodeId> {
        match self {
            Self::CriticalPath(q) => q.pop_best(graph, cycle),
            Self::Stress(q) => q.pop_best(graph, cycle),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::CriticalPath(q) => q.len(),
            Self::Stress(q) => q.len(),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::CriticalPath(q) => q.clear(),
            Self::Stress(q) => q.clear(),
        }
    }
}
