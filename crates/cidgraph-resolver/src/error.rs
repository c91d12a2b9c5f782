use thiserror::Error;

use cidgraph_types::RefError;

/// Errors produced while resolving a content reference.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid content reference: {0}")]
    InvalidReference(#[from] RefError),

    #[error("rate limited fetching {reference} ({attempts} attempts)")]
    RateLimited { reference: String, attempts: u32 },

    #[error("gateway returned HTTP {status} for {reference}")]
    Status { reference: String, status: u16 },

    #[error("network failure fetching {reference}: {message}")]
    Network { reference: String, message: String },

    #[error("invalid JSON in {reference}: {message}")]
    Decode { reference: String, message: String },
}

pub type ResolveResult<T> = Result<T, ResolveError>;
