//! Block scheduler.
//!
//! Per block the scheduler goes through Building (the [`GraphBuilder`] owns
//! the arena), LatencyComputed (`end_block` hands the graph back), Scheduling
//! (the emission loop below) and Done (a [`Schedule`] is returned and the
//! arena is reused for the next block).

use lsched_dag::{DepGraph, GraphBuilder, NodeId};
use lsched_ir::{MachBlock, MachInst, OpcodeInfo};
use tracing::trace_span;

use crate::config::SchedConfig;
use crate::invariants::verify_schedule;
use crate::observer::{NoopObserver, SchedEvent, SchedObserver};
use crate::queue::{Queue, ReadyQueue};

/// Summary of one block's schedule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    /// Cycles spent emitting graph nodes (one per node).
    pub cycles: u32,
    /// Cycles nodes were emitted before their inputs were available.
    pub stall_cycles: u32,
    /// Instructions whose position changed.
    pub moved: usize,
}

/// Reordering of one block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Original instruction indices in emission order, terminator last.
    pub order: Vec<usize>,
    /// Index of the block terminator, if the block has one.
    pub terminator: Option<usize>,
    pub stats: ScheduleStats,
}

impl Schedule {
    /// Check if the schedule keeps the original order.
    pub fn is_identity(&self) -> bool {
        self.stats.moved == 0
    }

    /// Reorder `items` (the block's instructions) according to this schedule.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        debug_assert_eq!(items.len(), self.order.len());
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        self.order
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect()
    }
}

/// Split off the block terminator, if the last instruction is one.
pub fn split_terminator<'i, I: OpcodeInfo + ?Sized>(
    info: &I,
    insts: &'i [MachInst],
) -> (&'i [MachInst], Option<usize>) {
    match insts.split_last() {
        Some((last, body)) if info.is_block_terminator(last) => (body, Some(body.len())),
        _ => (insts, None),
    }
}

/// List scheduler for basic blocks.
///
/// One instance schedules all blocks of a function; its graph arena and queue
/// are reused from block to block.
pub struct BlockScheduler<'a, I: OpcodeInfo + ?Sized, O: SchedObserver = NoopObserver> {
    info: &'a I,
    config: SchedConfig,
    graph: DepGraph,
    queue: Queue,
    released: Vec<NodeId>,
    observer: O,
}

impl<'a, I: OpcodeInfo + ?Sized> BlockScheduler<'a, I> {
    /// Create a scheduler with no observer.
    pub fn new(info: &'a I, config: &SchedConfig) -> Self {
        Self {
            info,
            config: config.clone(),
            graph: DepGraph::new(),
            queue: Queue::for_config(config),
            released: Vec::new(),
            observer: NoopObserver,
        }
    }
}

impl<'a, I: OpcodeInfo + ?Sized, O: SchedObserver> BlockScheduler<'a, I, O> {
    /// Replace the observer.
    pub fn with_observer<P: SchedObserver>(self, observer: P) -> BlockScheduler<'a, I, P> {
        BlockScheduler {
            info: self.info,
            config: self.config,
            graph: self.graph,
            queue: self.queue,
            released: self.released,
            observer,
        }
    }

    /// Get the observer.
    pub const fn observer(&self) -> &O {
        &self.observer
    }

    /// Take the observer back.
    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Get the configuration.
    pub const fn config(&self) -> &SchedConfig {
        &self.config
    }

    /// Dependency graph of the most recently scheduled block.
    pub const fn graph(&self) -> &DepGraph {
        &self.graph
    }

    /// Schedule a block in place.
    pub fn schedule_block(&mut self, block: &mut MachBlock) -> ScheduleStats {
        let schedule = self.schedule(&block.insts);
        if !schedule.is_identity() {
            let insts = std::mem::take(&mut block.insts);
            block.insts = schedule.apply(insts);
        }
        schedule.stats
    }

    /// Compute a schedule for `insts` without modifying them.
    ///
    /// Only the last instruction may be a block terminator; see
    /// [`check_block_shape`](crate::check_block_shape). [`Pipeline`](crate::Pipeline)
    /// rejects other blocks before they get here.
    ///
    /// # Panics
    ///
    /// Panics if verification is enabled and the schedule breaks an ordering
    /// invariant. That is a bug in the scheduler or in the opcode info.
    pub fn schedule(&mut self, insts: &[MachInst]) -> Schedule {
        let (body, terminator) = split_terminator(self.info, insts);

        let graph = {
            let _span = trace_span!("build_graph", insts = body.len()).entered();
            GraphBuilder::build_block(&mut self.graph, self.info, body)
        };

        let _span = trace_span!("emit", nodes = graph.len()).entered();
        self.observer.event(&SchedEvent::BlockStart {
            nodes: graph.len(),
            terminator,
        });

        self.queue.clear();
        for id in graph.ids() {
            if graph.node(id).unscheduled_preds() == 0 {
                self.queue.push(graph, id);
                self.observer.event(&SchedEvent::Ready { node: id, cycle: 0 });
            }
        }

        let mut order = Vec::with_capacity(insts.len());
        let mut cycle = 0u32;
        let mut stall_cycles = 0u32;
        while let Some(id) = self.queue.pop_best(graph, cycle) {
            let node = graph.node(id);
            stall_cycles = stall_cycles.saturating_add(node.start_cycle().saturating_sub(cycle));
            order.push(node.inst());
            self.observer.event(&SchedEvent::Emit {
                node: id,
                inst: node.inst(),
                cycle,
                start_cycle: node.start_cycle(),
                total_latency: node.total_latency(),
            });

            self.released.clear();
            graph.release_successors(id, cycle, &mut self.released);
            for &succ in &self.released {
                self.queue.push(graph, succ);
                self.observer.event(&SchedEvent::Ready {
                    node: succ,
                    cycle: cycle + 1,
                });
            }
            cycle += 1;
        }

        if let Some(inst) = terminator {
            order.push(inst);
            self.observer.event(&SchedEvent::Terminator { inst });
        }
        self.observer.event(&SchedEvent::BlockEnd {
            cycles: cycle,
            stall_cycles,
        });

        if self.config.verify {
            if let Err(violation) = verify_schedule(self.info, insts, Some(&*graph), &order) {
                panic!("instruction schedule invariant violated: {violation}");
            }
        }

        let moved = order.iter().enumerate().filter(|&(pos, &i)| pos != i).count();
        Schedule {
            order,
            terminator,
            stats: ScheduleStats {
                cycles: cycle,
                stall_cycles,
                moved,
            },
        }
    }
}
