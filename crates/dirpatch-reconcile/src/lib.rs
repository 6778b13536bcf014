//! Reconciliation and patch reports for dirpatch.
//!
//! Given two [`ScanResult`]s, the [`Reconciler`] classifies every relative
//! path per side as added, unchanged or conflicting, and the [`PatchWriter`]
//! renders that classification into a stable textual report.
//!
//! ```rust,ignore
//! use std::time::SystemTime;
//! use dirpatch_reconcile::{PatchWriter, Reconciler};
//! use dirpatch_scan::{ScanConfig, TreeScanner};
//!
//! let config = ScanConfig::new("left");
//! let (a, b) = TreeScanner::new().scan_pair(&config, &config.with_root("right")).unwrap();
//!
//! let outcome = Reconciler::new().reconcile(&a, &b).unwrap();
//! let report = PatchWriter::new()
//!     .with_ignore_unchanged(true)
//!     .render("left", "right", &outcome, SystemTime::now())
//!     .unwrap();
//! print!("{report}");
//! ```

mod error;
mod patch;
mod reconcile;

pub use error::{PatchError, ReconcileError};
pub use patch::{DEFAULT_PATCH_FILE, PatchFormat, PatchLine, PatchWriter, TimestampZone};
pub use reconcile::{
    Change, PatchSet, PatchSummary, ReconcileConfig, ReconcileConfigBuilder, Reconciler,
    Reconciliation,
};

// Re-export core types
pub use dirpatch_core::{FileRecord, FingerprintKind, ScanResult};
