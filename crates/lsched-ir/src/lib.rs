//! Machine instruction model for the lsched block scheduler.
//!
//! This crate provides the instruction stream the scheduler reorders, a textual
//! listing format for it, and the per-opcode tables the scheduler queries for
//! latencies and ordering constraints.

mod block;
mod info;
mod inst;
mod opcode;
mod parse;
mod reg;

pub use block::*;
pub use info::*;
pub use inst::*;
pub use opcode::*;
pub use parse::*;
pub use reg::*;
