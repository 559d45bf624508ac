//! Dependency graph for basic-block scheduling.
//!
//! The graph is an index arena: nodes live in one vector per block and refer
//! to each other by [`NodeId`]. Edges always run from an earlier node to a
//! later one, so the graph is acyclic without any cycle check.

mod builder;
mod check;
mod graph;
mod node;

pub use builder::*;
pub use check::*;
pub use graph::*;
pub use node::*;
