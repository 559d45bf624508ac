//! Scheduling pass over functions and modules.

use lsched_ir::{MachFunction, OpcodeInfo};
use rayon::prelude::*;
use tracing::{debug, debug_span};

use crate::config::SchedConfig;
use crate::error::{Error, Result};
use crate::invariants::check_block_shape;
use crate::metrics;
use crate::observer::{SchedObserver, TracingObserver};
use crate::scheduler::BlockScheduler;

/// Scheduling pass.
pub struct Pipeline<'a, I: OpcodeInfo + ?Sized> {
    info: &'a I,
    config: SchedConfig,
}

impl<'a, I: OpcodeInfo + ?Sized> Pipeline<'a, I> {
    /// Create a pass for the given target and configuration.
    pub const fn new(info: &'a I, config: SchedConfig) -> Self {
        Self { info, config }
    }

    /// Get the configuration.
    pub const fn config(&self) -> &SchedConfig {
        &self.config
    }

    /// Schedule every block of `func` in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] if a block has a terminator before its
    /// last instruction. `func` is left unchanged in that case.
    pub fn run_function(&self, func: &mut MachFunction) -> Result<PassStats> {
        self.check_function(func)?;
        Ok(self.run_function_seeded(func, self.config.seed))
    }

    /// Schedule every function of a module in parallel.
    ///
    /// Under the stress strategy, function `i` uses seed `config.seed ^ i`, so
    /// results do not depend on thread interleaving.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedBlock`] for the first malformed block. Every
    /// block is checked before any is scheduled, so `funcs` is left unchanged.
    pub fn run_module(&self, funcs: &mut [MachFunction]) -> Result<PassStats>
    where
        I: Sync,
    {
        for func in funcs.iter() {
            self.check_function(func)?;
        }
        let stats = funcs
            .par_iter_mut()
            .enumerate()
            .map(|(i, func)| self.run_function_seeded(func, self.config.seed ^ i as u64))
            .reduce(PassStats::default, PassStats::merge);
        debug!(
            functions = stats.functions,
            blocks = stats.blocks,
            moved = stats.moved,
            "module scheduled"
        );
        Ok(stats)
    }

    /// Check that every block ends in its only terminator, if any.
    fn check_function(&self, func: &MachFunction) -> Result<()> {
        if !self.info.scheduler_supported() {
            return Ok(());
        }
        for block in &func.blocks {
            check_block_shape(self.info, &block.insts).map_err(|source| Error::MalformedBlock {
                function: func.name.clone(),
                block: block.label.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn run_function_seeded(&self, func: &mut MachFunction, seed: u64) -> PassStats {
        let _span = debug_span!("schedule_function", name = %func.name).entered();
        let mut stats = PassStats {
            functions: 1,
            ..PassStats::default()
        };

        if !self.info.scheduler_supported() {
            stats.skipped_blocks = func.blocks.len();
            metrics::record_skipped(func.blocks.len());
            debug!(blocks = func.blocks.len(), "scheduling not supported, skipping");
            return stats;
        }

        let config = self.config.clone().with_seed(seed);
        let sched = BlockScheduler::new(self.info, &config);
        if config.trace {
            schedule_blocks(sched.with_observer(TracingObserver), func, &mut stats);
        } else {
            schedule_blocks(sched, func, &mut stats);
        }

        debug!(
            blocks = stats.blocks,
            instructions = stats.instructions,
            moved = stats.moved,
            stall_cycles = stats.stall_cycles,
            "function scheduled"
        );
        stats
    }
}

fn schedule_blocks<I: OpcodeInfo + ?Sized, O: SchedObserver>(
    mut sched: BlockScheduler<'_, I, O>,
    func: &mut MachFunction,
    stats: &mut PassStats,
) {
    for block in &mut func.blocks {
        let block_stats = sched.schedule_block(block);
        debug!(
            block = %block.label,
            insts = block.len(),
            cycles = block_stats.cycles,
            stall_cycles = block_stats.stall_cycles,
            moved = block_stats.moved,
            "block scheduled"
        );
        metrics::record_block(&block_stats, block.len());
        stats.blocks += 1;
        stats.instructions += block.len();
        stats.moved += block_stats.moved;
        stats.stall_cycles += u64::from(block_stats.stall_cycles);
    }
}

/// Totals for a scheduling run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub functions: usize,
    pub blocks: usize,
    /// Blocks passed through because the target has no latency model.
    pub skipped_blocks: usize,
    pub instructions: usize,
    pub moved: usize,
    pub stall_cycles: u64,
}

impl PassStats {
    /// Combine two runs.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            functions: self.functions + other.functions,
            blocks: self.blocks + other.blocks,
            skipped_blocks: self.skipped_blocks + other.skipped_blocks,
            instructions: self.instructions + other.instructions,
            moved: self.moved + other.moved,
            stall_cycles: self.stall_cycles + other.stall_cycles,
        }
    }
}
