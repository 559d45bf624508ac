use thiserror::Error;

use crate::invariants::InvariantViolation;

/// Scheduler errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] lsched_ir::ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed block `{block}` in function `{function}`: {source}")]
    MalformedBlock {
        function: String,
        block: String,
        #[source]
        source: InvariantViolation,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
