//! Error types that cross the library boundary
//!
//! Classification never fails outward (see `classifier`). The hard errors are
//! losing a human-labelled training case and confirming a verdict that was
//! never made.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("training log I/O failed at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize training case: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("corrupt training log {} at line {line}: {reason}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("classification fell back to the fail-safe result; supply an explicit decision instead of confirming")]
    NothingToConfirm,
}
