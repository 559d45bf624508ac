//! Command implementations.

mod schedule;
mod stress;

use crate::cli::{Cli, Commands};

/// Dispatch CLI command to the appropriate handler.
pub fn run_command(cli: &Cli) -> i32 {
    match &cli.command {
        Commands::Schedule {
            input,
            arch,
            strategy,
            seed,
            verify,
            trace,
        } => schedule::cmd_schedule(input, *arch, *strategy, *seed, *verify, *trace),
        Commands::Stress {
            input,
            arch,
            seeds,
            start_seed,
            jobs,
        } => stress::cmd_stress(input, *arch, *seeds, *start_seed, *jobs),
    }
}
