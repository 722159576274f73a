//! Error types shared across Reelcut crates.

use std::path::PathBuf;

/// Top-level error type for Reelcut operations that touch the filesystem
/// or configuration. Pipeline stages carry their own narrower errors.
#[derive(Debug, thiserror::Error)]
pub enum ReelcutError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Instruction input error: {message}")]
    Instructions { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ReelcutError.
pub type ReelcutResult<T> = Result<T, ReelcutError>;

impl ReelcutError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn instructions(msg: impl Into<String>) -> Self {
        Self::Instructions {
            message: msg.into(),
        }
    }
}
