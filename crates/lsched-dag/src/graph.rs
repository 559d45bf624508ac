//! Per-block dependency graph arena.

use crate::node::{Node, NodeId};

/// Dependency graph for one basic block.
///
/// Cleared and refilled for every block, keeping its allocation.
#[derive(Clone, Debug, Default)]
pub struct DepGraph {
    nodes: Vec<Node>,
}

impl DepGraph {
    /// Create an empty graph.
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Drop all nodes, keeping capacity.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Get number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node ids in creation order.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = NodeId> + use<> {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// All edges as (from, to) pairs.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.iter().enumerate().flat_map(|(i, node)| {
            node.successors.iter().map(move |&succ| (NodeId::new(i), succ))
        })
    }

    /// Incoming edge count per node, computed from the edge lists.
    pub fn in_degrees(&self) -> Vec<u32> {
        let mut degrees = vec![0u32; self.nodes.len()];
        for (_, to) in self.edges() {
            degrees[to.index()] += 1;
        }
        degrees
    }

    pub(crate) fn add_node(&mut self, inst: usize, latency: u32) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(inst, latency));
        id
    }

    /// Add `from -> to` unless it already exists. Returns whether it was added.
    pub(crate) fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        let succs = &mut self.nodes[from.index()].successors;
        if succs.contains(&to) {
            return false;
        }
        succs.push(to);
        self.nodes[to.index()].unscheduled_preds += 1;
        true
    }

    /// Compute `total_latency` for every node, saturating at `u32::MAX`.
    ///
    /// Successors are always created after their predecessors, so a single
    /// reverse pass sees every successor before the node itself.
    pub fn compute_total_latencies(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            let longest_tail = self.nodes[i]
                .successors
                .iter()
                .map(|s| self.nodes[s.index()].total_latency)
                .max()
                .unwrap_or(0);
            let node = &mut self.nodes[i];
            node.total_latency = node.latency.saturating_add(longest_tail);
        }
    }

    /// Mark `id` as emitted at `cycle`, releasing its successors.
    ///
    /// Each successor's start cycle moves to at least `cycle + latency(id)`.
    /// Successors whose last predecessor this was are appended to `ready`.
    pub fn release_successors(&mut self, id: NodeId, cycle: u32, ready: &mut Vec<NodeId>) {
        let available = cycle.saturating_add(self.nodes[id.index()].latency);
        for i in 0..self.nodes[id.index()].successors.len() {
            let succ = self.nodes[id.index()].successors[i];
            let node = &mut self.nodes[succ.index()];
            debug_assert!(node.unscheduled_preds > 0, "{succ} released twice");
            node.unscheduled_preds -= 1;
            node.start_cycle = node.start_cycle.max(available);
            if node.unscheduled_preds == 0 {
                ready.push(succ);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(latencies: &[u32]) -> DepGraph {
        let mut graph = DepGraph::new();
        for (i, &lat) in latencies.iter().enumerate() {
            graph.add_node(i, lat);
        }
        for i in 1..latencies.len() {
            graph.add_edge(NodeId::new(i - 1), NodeId::new(i));
        }
        graph
    }

    #[test]
    fn test_add_edge_dedups() {
        let mut graph = chain(&[1, 1]);
        assert!(!graph.add_edge(NodeId::new(0), NodeId::new(1)));
        assert_eq!(graph.node(NodeId::new(1)).unscheduled_preds(), 1);
        assert_eq!(graph.edges().count(), 1);
    }

    #[test]
    fn test_total_latency_chain() {
        let mut graph = chain(&[2, 3, 4]);
        graph.compute_total_latencies();
        let totals: Vec<u32> = graph.nodes().iter().map(Node::total_latency).collect();
        assert_eq!(totals, vec![9, 7, 4]);
    }

    #[test]
    fn test_total_latency_takes_longest_branch() {
        let mut graph = DepGraph::new();
        let root = graph.add_node(0, 1);
        let short = graph.add_node(1, 1);
        let long = graph.add_node(2, 5);
        graph.add_edge(root, short);
        graph.add_edge(root, long);
        graph.compute_total_latencies();
        assert_eq!(graph.node(root).total_latency(), 6);
        assert_eq!(graph.node(short).total_latency(), 1);
        assert_eq!(graph.node(long).total_latency(), 5);
    }

    #[test]
    fn test_release_successors() {
        let mut graph = DepGraph::new();
        let a = graph.add_node(0, 3);
        let b = graph.add_node(1, 1);
        let c = graph.add_node(2, 1);
        graph.add_edge(a, c);
        graph.add_edge(b, c);

        let mut ready = Vec::new();
        graph.release_successors(a, 0, &mut ready);
        assert!(ready.is_empty());
        assert_eq!(graph.node(c).start_cycle(), 3);

        graph.release_successors(b, 1, &mut ready);
        assert_eq!(ready, vec![c]);
        assert_eq!(graph.node(c).start_cycle(), 3);
        assert_eq!(graph.node(c).unscheduled_preds(), 0);
    }

    #[test]
    fn test_latencies_saturate() {
        let mut graph = chain(&[u32::MAX, 1, 1]);
        graph.compute_total_latencies();
        let totals: Vec<u32> = graph.nodes().iter().map(Node::total_latency).collect();
        assert_eq!(totals, vec![u32::MAX, 2, 1]);

        let mut ready = Vec::new();
        graph.release_successors(NodeId::new(0), 5, &mut ready);
        assert_eq!(ready, vec![NodeId::new(1)]);
        assert_eq!(graph.node(NodeId::new(1)).start_cycle(), u32::MAX);
    }

    #[test]
    fn test_in_degrees() {
        let graph = chain(&[1, 1, 1]);
        assert_eq!(graph.in_degrees(), vec![0, 1, 1]);
    }
}
