//! Schedule command.

use std::path::Path;

use lsched::{Pipeline, SchedConfig};
use tracing::{error, info};

use crate::cli::{ArchArg, EXIT_FAILURE, EXIT_SUCCESS, StrategyArg};

/// Handle the `schedule` command.
pub fn cmd_schedule(
    input: &Path,
    arch: ArchArg,
    strategy: StrategyArg,
    seed: u64,
    verify: bool,
    trace: bool,
) -> i32 {
    info!(input = %input.display(), arch = ?arch, strategy = ?strategy, "scheduling");

    let mut funcs = match lsched::load_listing(input) {
        Ok(funcs) => funcs,
        Err(e) => {
            error!(error = %e, "failed to load listing");
            return EXIT_FAILURE;
        }
    };

    let table = arch.table();
    let config = SchedConfig::default()
        .with_strategy(strategy.into())
        .with_seed(seed)
        .with_verify(verify)
        .with_trace(trace);
    let stats = match Pipeline::new(&table, config).run_module(&mut funcs) {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = %e, "scheduling failed");
            return EXIT_FAILURE;
        }
    };

    for (i, func) in funcs.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{func}");
    }

    info!(
        functions = stats.functions,
        blocks = stats.blocks,
        skipped = stats.skipped_blocks,
        instructions = stats.instructions,
        moved = stats.moved,
        stall_cycles = stats.stall_cycles,
        "done"
    );
    EXIT_SUCCESS
}
