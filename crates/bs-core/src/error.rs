//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `BsError` as one variant
//! via `#[from]`.

use thiserror::Error;

use crate::{BusId, StopId};

/// The top-level error type for `bs-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum BsError {
    #[error("bus {0} not found")]
    BusNotFound(BusId),

    #[error("stop {0} not found")]
    StopNotFound(StopId),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `bs-core`.
pub type BsResult<T> = Result<T, BsError>;
