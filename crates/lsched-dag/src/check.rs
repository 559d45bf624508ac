//! Graph invariant checks.
//!
//! Always compiled. Tests call them directly; the scheduler runs them when
//! verification is enabled.

use thiserror::Error;

use crate::graph::DepGraph;
use crate::node::NodeId;

/// A violated dependency graph invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("edge {from} -> {to} points backwards")]
    BackwardEdge { from: NodeId, to: NodeId },
    #[error("dependency cycle through {0}")]
    Cycle(NodeId),
    #[error("{node} records {recorded} unscheduled predecessors but has {actual} incoming edges")]
    PredecessorCount {
        node: NodeId,
        recorded: u32,
        actual: u32,
    },
    #[error("{node} has total latency {actual}, expected {expected}")]
    TotalLatency {
        node: NodeId,
        actual: u32,
        expected: u32,
    },
}

/// Check that the graph has no cycle (Kahn's algorithm on the edge lists).
pub fn assert_no_cycles(graph: &DepGraph) -> Result<(), GraphError> {
    let mut degrees = graph.in_degrees();
    let mut stack: Vec<NodeId> = graph.ids().filter(|id| degrees[id.index()] == 0).collect();
    let mut visited = 0usize;

    while let Some(id) = stack.pop() {
        visited += 1;
        for &succ in graph.node(id).successors() {
            degrees[succ.index()] -= 1;
            if degrees[succ.index()] == 0 {
                stack.push(succ);
            }
        }
    }

    if visited == graph.len() {
        return Ok(());
    }
    let stuck = graph
        .ids()
        .find(|id| degrees[id.index()] > 0)
        .unwrap_or(NodeId::new(0));
    Err(GraphError::Cycle(stuck))
}

/// Check that every edge points from an earlier node to a later one.
pub fn assert_forward_edges(graph: &DepGraph) -> Result<(), GraphError> {
    match graph.edges().find(|(from, to)| from >= to) {
        Some((from, to)) => Err(GraphError::BackwardEdge { from, to }),
        None => Ok(()),
    }
}

/// Check total latencies against `latency + max(successor totals, 0)`.
///
/// Covers the sink base case: a node without successors has
/// `total_latency == latency`.
pub fn assert_total_latencies(graph: &DepGraph) -> Result<(), GraphError> {
    for id in graph.ids() {
        let node = graph.node(id);
        let tail = node
            .successors()
            .iter()
            .map(|&s| graph.node(s).total_latency())
            .max()
            .unwrap_or(0);
        let expected = node.latency().saturating_add(tail);
        if node.total_latency() != expected {
            return Err(GraphError::TotalLatency {
                node: id,
                actual: node.total_latency(),
                expected,
            });
        }
    }
    Ok(())
}

/// Check a freshly built graph before scheduling starts.
///
/// Runs the edge direction, cycle, predecessor count and latency checks.
pub fn check_graph(graph: &DepGraph) -> Result<(), GraphError> {
    assert_forward_edges(graph)?;
    assert_no_cycles(graph)?;
    for (i, actual) in graph.in_degrees().into_iter().enumerate() {
        let node = NodeId::new(i);
        let recorded = graph.node(node).unscheduled_preds();
        if recorded != actual {
            return Err(GraphError::PredecessorCount {
                node,
                recorded,
                actual,
            });
        }
    }
    assert_total_latencies(graph)
}

#[cfg(test)]
mod tests {
    use lsched_ir::{OpcodeTable, parse_block};

    use super::*;
    use crate::GraphBuilder;

    #[test]
    fn test_built_graph_passes() {
        let block = parse_block(
            "v0 = param
             v1 = load v0
             v2 = mul v1, v0
             store v2, v0
             v3 = load v0
             call v3",
        )
        .unwrap();
        let table = OpcodeTable::x64();
        let mut graph = DepGraph::new();
        let graph = GraphBuilder::build_block(&mut graph, &table, &block.insts);
        assert_eq!(check_graph(graph), Ok(()));
        for node in graph.nodes().iter().filter(|n| n.is_sink()) {
            assert_eq!(node.total_latency(), node.latency());
        }
    }

    #[test]
    fn test_detects_cycle() {
        let mut graph = DepGraph::new();
        let a = graph.add_node(0, 1);
        let b = graph.add_node(1, 1);
        let c = graph.add_node(2, 1);
        graph.add_edge(a, b);
        graph.add_edge(b, c);
        graph.add_edge(c, b);
        assert!(matches!(assert_no_cycles(&graph), Err(GraphError::Cycle(_))));
        assert_eq!(
            assert_forward_edges(&graph),
            Err(GraphError::BackwardEdge { from: c, to: b })
        );
    }

    #[test]
    fn test_detects_stale_latency() {
        let mut graph = DepGraph::new();
        let a = graph.add_node(0, 2);
        let b = graph.add_node(1, 3);
        graph.add_edge(a, b);
        assert_eq!(
            assert_total_latencies(&graph),
            Err(GraphError::TotalLatency {
                node: a,
                actual: 0,
                expected: 2,
            })
        );
        graph.compute_total_latencies();
        assert_eq!(check_graph(&graph), Ok(()));
    }

    #[test]
    fn test_empty_graph() {
        let graph = DepGraph::new();
        assert_eq!(check_graph(&graph), Ok(()));
    }
}
