//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `AvError` as one variant
//! where they need to surface core failures.

use thiserror::Error;

/// The top-level error type for `av-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum AvError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `av-*` crates.
pub type AvResult<T> = Result<T, AvError>;
