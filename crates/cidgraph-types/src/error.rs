use thiserror::Error;

/// Errors produced when validating content references.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefError {
    #[error("invalid content identifier: {0}")]
    Invalid(String),

    #[error("content identifier too short: {len} characters (minimum 46)")]
    TooShort { len: usize },
}
