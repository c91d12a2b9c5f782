use thiserror::Error;

use cidgraph_resolver::ResolveError;

/// Errors produced by multi-way comparison.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("need at least 2 references to compare, got {0}")]
    InsufficientInputs(usize),

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

pub type CompareResult<T> = Result<T, CompareError>;
