//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;

use cwidth_core::WidthError;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("resolution failed: {0}")]
    Width(#[from] WidthError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("descriptor {}: {source}", path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Usage(String),
    #[error("log validation failed with {count} error(s)")]
    LogValidation { count: usize },
}

impl HarnessError {
    /// Resolution error underneath, if any.
    #[must_use]
    pub fn width(&self) -> Option<&WidthError> {
        match self {
            Self::Width(err) => Some(err),
            _ => None,
        }
    }
}
