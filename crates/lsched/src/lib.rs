//! lsched - latency-aware list scheduling for machine basic blocks.
//!
//! Reorders the instructions of each basic block to shorten dependency
//! chains, keeping operand dependencies, side-effect order and load/store
//! order intact. The block terminator always stays last.
//!
//! # Example
//!
//! ```
//! use lsched::{OpcodeTable, Pipeline, SchedConfig, parse_listing};
//!
//! let mut funcs = parse_listing(
//!     "func f\nblock entry:\n  v1 = add v0, v0\n  v2 = load v0\n  ret v2\n",
//! )?;
//! let table = OpcodeTable::x64();
//! Pipeline::new(&table, SchedConfig::default()).run_module(&mut funcs)?;
//! assert_eq!(funcs[0].blocks[0].insts[0].to_string(), "v2 = load v0");
//! # Ok::<(), lsched::Error>(())
//! ```

// Re-export from sub-crates
pub use lsched_dag::{
    DepGraph, GraphBuilder, GraphError, Node, NodeId, assert_no_cycles, check_graph,
};
pub use lsched_ir::{
    Arch, MachBlock, MachFunction, MachInst, Opcode, OpcodeInfo, OpcodeProps, OpcodeTable,
    ParseError, ParseErrorKind, VReg, parse_block, parse_listing,
};

pub mod metrics;

mod config;
mod error;
mod invariants;
mod observer;
mod pipeline;
mod queue;
mod scheduler;

pub use config::*;
pub use error::*;
pub use invariants::*;
pub use observer::*;
pub use pipeline::*;
pub use queue::*;
pub use scheduler::*;

use std::path::Path;

/// Read and parse a listing file.
pub fn load_listing(path: &Path) -> Result<Vec<MachFunction>> {
    let src = std::fs::read_to_string(path)?;
    Ok(parse_listing(&src)?)
}
