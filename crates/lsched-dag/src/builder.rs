//! Incremental dependency graph construction.

use lsched_ir::{MachInst, OpcodeInfo};
use tracing::trace;

use crate::graph::DepGraph;
use crate::node::NodeId;

/// Builds the dependency graph of one block from its instructions in order.
///
/// Every edge added points from an existing node to the node being added, so
/// edges never point backwards. Block terminators must not be added; the
/// scheduler emits them last on its own.
pub struct GraphBuilder<'g, 'i, I: OpcodeInfo + ?Sized> {
    graph: &'g mut DepGraph,
    info: &'g I,
    insts: Vec<&'i MachInst>,
    last_live_in: Option<NodeId>,
    last_side_effect: Option<NodeId>,
    pending_loads: Vec<NodeId>,
}

impl<'g, 'i, I: OpcodeInfo + ?Sized> GraphBuilder<'g, 'i, I> {
    /// Start a block, reusing `graph`'s storage.
    pub fn start_block(graph: &'g mut DepGraph, info: &'g I) -> Self {
        graph.clear();
        Self {
            graph,
            info,
            insts: Vec::new(),
            last_live_in: None,
            last_side_effect: None,
            pending_loads: Vec::new(),
        }
    }

    /// Build the graph for `body` (a block without its terminator) in one go.
    pub fn build_block(
        graph: &'g mut DepGraph,
        info: &'g I,
        body: &'i [MachInst],
    ) -> &'g mut DepGraph {
        let mut builder = Self::start_block(graph, info);
        for (index, inst) in body.iter().enumerate() {
            builder.add_instruction(index, inst);
        }
        builder.end_block()
    }

    /// Add the next instruction of the block. `index` is its position in the block.
    pub fn add_instruction(&mut self, index: usize, inst: &'i MachInst) -> NodeId {
        let id = self.graph.add_node(index, self.info.latency(inst));

        // Live-in markers stay in order, and nothing runs before the last one.
        if let Some(marker) = self.last_live_in {
            self.graph.add_edge(marker, id);
        }
        if inst.is_fixed_reg_param() {
            self.last_live_in = Some(id);
        }

        for (prev, &producer) in self.insts.iter().enumerate() {
            if self.info.has_operand_dependency(producer, inst) {
                self.graph.add_edge(NodeId::new(prev), id);
            }
        }

        if self.info.has_side_effect(inst) {
            if let Some(prev) = self.last_side_effect {
                self.graph.add_edge(prev, id);
            }
            for &load in &self.pending_loads {
                self.graph.add_edge(load, id);
            }
            self.pending_loads.clear();
            self.last_side_effect = Some(id);
        } else if self.info.is_load(inst) {
            if let Some(prev) = self.last_side_effect {
                self.graph.add_edge(prev, id);
            }
            self.pending_loads.push(id);
        }

        self.insts.push(inst);
        id
    }

    /// Finish the block and compute total latencies.
    pub fn end_block(self) -> &'g mut DepGraph {
        self.graph.compute_total_latencies();
        trace!(
            nodes = self.graph.len(),
            edges = self.graph.edges().count(),
            "dependency graph built"
        );
        self.graph
    }
}
