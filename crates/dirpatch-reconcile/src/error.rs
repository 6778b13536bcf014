//! Error types for reconciliation and report output.

use std::path::PathBuf;

use thiserror::Error;

use dirpatch_core::FingerprintKind;

/// Errors raised when two scans cannot be compared.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The scans were fingerprinted with different algorithms.
    #[error("Cannot reconcile scans fingerprinted with {a} and {b}")]
    FingerprintMismatch { a: FingerprintKind, b: FingerprintKind },
}

/// Errors raised while rendering or persisting a patch report.
#[derive(Debug, Error)]
pub enum PatchError {
    /// Writing the report failed.
    #[error("Failed to write patch report {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("Failed to serialize patch report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl PatchError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
