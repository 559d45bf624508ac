//! Scheduling event observers.

use lsched_dag::NodeId;
use tracing::trace;

/// Event emitted while scheduling a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedEvent {
    /// Graph built; scheduling starts.
    BlockStart {
        nodes: usize,
        terminator: Option<usize>,
    },
    /// Node entered the ready queue.
    Ready { node: NodeId, cycle: u32 },
    /// Node emitted.
    Emit {
        node: NodeId,
        inst: usize,
        cycle: u32,
        start_cycle: u32,
        total_latency: u32,
    },
    /// Block terminator appended.
    Terminator { inst: usize },
    /// Block done.
    BlockEnd { cycles: u32, stall_cycles: u32 },
}

/// Receives scheduling events.
pub trait SchedObserver {
    fn event(&mut self, event: &SchedEvent);
}

impl<O: SchedObserver + ?Sized> SchedObserver for &mut O {
    fn event(&mut self, event: &SchedEvent) {
        (**self).event(event);
    }
}

/// Ignores all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SchedObserver for NoopObserver {
    fn event(&mut self, _event: &SchedEvent) {}
}

/// Keeps every event.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<SchedEvent>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Instruction indices in emission order, terminator included.
    pub fn emitted(&self) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SchedEvent::Emit { inst, .. } | SchedEvent::Terminator { inst } => Some(*inst),
                _ => None,
            })
            .collect()
    }
}

impl SchedObserver for RecordingObserver {
    fn event(&mut self, event: &SchedEvent) {
        self.events.push(event.clone());
    }
}

/// Forwards events to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl SchedObserver for TracingObserver {
    fn event(&mut self, event: &SchedEvent) {
        match *event {
            SchedEvent::BlockStart { nodes, terminator } => {
                trace!(nodes, terminator = ?terminator, "block start");
            }
            SchedEvent::Ready { node, cycle } => trace!(%node, cycle, "ready"),
            SchedEvent::Emit {
                node,
                inst,
                cycle,
                start_cycle,
                total_latency,
            } => trace!(%node, inst, cycle, start_cycle, total_latency, "emit"),
            SchedEvent::Terminator { inst } => trace!(inst, "terminator"),
            SchedEvent::BlockEnd {
                cycles,
                stall_cycles,
            } => trace!(cycles, stall_cycles, "block end"),
        }
    }
}
