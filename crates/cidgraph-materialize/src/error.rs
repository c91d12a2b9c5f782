use thiserror::Error;

use cidgraph_resolver::ResolveError;
use cidgraph_types::RefError;

/// Errors produced while materializing a graph to files.
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("invalid root reference: {0}")]
    InvalidReference(#[from] RefError),

    #[error("failed to materialize root {reference}: {source}")]
    RootUnavailable {
        reference: String,
        #[source]
        source: Box<MaterializeError>,
    },

    #[error("resolve error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MaterializeResult<T> = Result<T, MaterializeError>;
