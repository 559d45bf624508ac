//! Graph nodes.

use std::fmt;

/// Index of a node in its block's graph. Also its creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a node id from an arena index.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Arena index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Scheduling state for one instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) inst: usize,
    pub(crate) successors: Vec<NodeId>,
    pub(crate) unscheduled_preds: u32,
    pub(crate) latency: u32,
    pub(crate) total_latency: u32,
    pub(crate) start_cycle: u32,
}

impl Node {
    pub(crate) const fn new(inst: usize, latency: u32) -> Self {
        Self {
            inst,
            successors: Vec::new(),
            unscheduled_preds: 0,
            latency,
            total_latency: 0,
            start_cycle: 0,
        }
    }

    /// Index of the wrapped instruction in its block.
    pub const fn inst(&self) -> usize {
        self.inst
    }

    /// Nodes that must be scheduled after this one.
    pub fn successors(&self) -> &[NodeId] {
        &self.successors
    }

    /// Predecessors not yet emitted. Zero means ready.
    pub const fn unscheduled_preds(&self) -> u32 {
        self.unscheduled_preds
    }

    /// Latency in cycles.
    pub const fn latency(&self) -> u32 {
        self.latency
    }

    /// Longest chain (in cycles) from this node to any sink.
    pub const fn total_latency(&self) -> u32 {
        self.total_latency
    }

    /// Earliest cycle at which all inputs are available.
    pub const fn start_cycle(&self) -> u32 {
        self.start_cycle
    }

    /// Check if no node depends on this one.
    pub fn is_sink(&self) -> bool {
        self.successors.is_empty()
    }
}
