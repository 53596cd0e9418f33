use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier range: min {min} > max {max}")]
    InvertedRange { min: u32, max: u32 },

    #[error("identifier 0 is reserved and cannot be issued")]
    ReservedId,

    #[error("invalid identifier: {0}")]
    InvalidId(String),
}
