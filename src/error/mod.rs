//! Error handling module for ClipSwap

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ClipSwap operations
#[derive(Error, Debug)]
pub enum SwapError {
    /// Required external tooling or input is missing; fatal to the whole run
    #[error("configuration error: {detail}")]
    Configuration { detail: String },

    /// Media file unreadable or its duration unparsable
    #[error("failed to probe {path}: {detail}")]
    Probe { path: PathBuf, detail: String },

    /// External transform exited non-zero
    #[error("{operation} stage failed: {detail}")]
    Stage { operation: String, detail: String },

    /// External transform exceeded the configured time budget
    #[error("{operation} stage timed out after {seconds}s")]
    StageTimeout { operation: String, seconds: u64 },

    /// No usable pool entries while fillers are required
    #[error("segment composition failed: {detail}")]
    Composition { detail: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SwapError {
    /// Shorthand for a whole-run-fatal configuration failure
    pub fn configuration(detail: impl Into<String>) -> Self {
        SwapError::Configuration {
            detail: detail.into(),
        }
    }

    /// Shorthand for a per-file composition failure
    pub fn composition(detail: impl Into<String>) -> Self {
        SwapError::Composition {
            detail: detail.into(),
        }
    }
}

/// Result type alias for ClipSwap operations
pub type SwapResult<T> = std::result::Result<T, SwapError>;
