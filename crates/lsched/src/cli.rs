//! CLI definitions and argument types.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use lsched::{Arch, OpcodeTable, Strategy};

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "lsched")]
#[command(about = "List scheduler for machine basic blocks")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output (only show errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub silent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Schedule every block of a listing and print the result
    Schedule {
        /// Input listing
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Target latency model
        #[arg(long, value_enum, default_value = "x64")]
        arch: ArchArg,

        /// Ready-queue strategy
        #[arg(long, value_enum, default_value = "critical-path")]
        strategy: StrategyArg,

        /// Seed for the stress strategy
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Check every schedule against the ordering invariants
        #[arg(long)]
        verify: bool,

        /// Log every scheduling event at TRACE level
        #[arg(long)]
        trace: bool,
    },
    /// Schedule a listing under many stress seeds and check every result
    Stress {
        /// Input listing
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Target latency model
        #[arg(long, value_enum, default_value = "x64")]
        arch: ArchArg,

        /// Number of seeds to try
        #[arg(long, default_value = "256")]
        seeds: u64,

        /// First seed
        #[arg(long, default_value = "0")]
        start_seed: u64,

        /// Number of parallel jobs (0 = auto)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,
    },
}

/// Target latency model.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum ArchArg {
    #[default]
    X64,
    Arm64,
    /// No latency model; blocks pass through unchanged
    Generic,
}

impl From<ArchArg> for Arch {
    fn from(arg: ArchArg) -> Self {
        match arg {
            ArchArg::X64 => Self::X64,
            ArchArg::Arm64 => Self::Arm64,
            ArchArg::Generic => Self::Generic,
        }
    }
}

impl ArchArg {
    /// Opcode table for this target.
    pub fn table(self) -> OpcodeTable {
        OpcodeTable::new(self.into())
    }
}

/// Ready-queue strategy.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum StrategyArg {
    /// Longest remaining dependency chain first
    #[default]
    CriticalPath,
    /// Random ready node (testing only)
    Stress,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::CriticalPath => Self::CriticalPath,
            StrategyArg::Stress => Self::Stress,
        }
    }
}
