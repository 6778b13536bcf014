//! Three-way classification of two scans.
//!
//! For every relative path in either scan, each side gets exactly one of:
//!
//! - **Added**: the other side has the path and this side does not
//! - **Unchanged**: both sides have an equal record
//! - **Conflict**: both sides have the path but the records differ
//!
//! No ordering is applied here; the patch writer sorts.

use std::fmt;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::debug;

use dirpatch_core::{FileRecord, FingerprintKind, ScanResult};

use crate::error::ReconcileError;

/// Classification of one path from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    /// Present only on the other side; this side should receive it.
    Added,
    /// Present on both sides with equal records.
    Unchanged,
    /// Present on both sides with differing records.
    Conflict,
}

impl Change {
    /// Symbol used in the patch report.
    pub fn symbol(self) -> char {
        match self {
            Self::Added => '+',
            Self::Unchanged => '=',
            Self::Conflict => '!',
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Configuration for reconciliation.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ReconcileConfig {
    /// Modification times closer than this count as equal.
    ///
    /// Zero means exact equality. Path, fingerprint and size always compare
    /// exactly.
    #[builder(default = "Duration::ZERO")]
    pub mtime_tolerance: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            mtime_tolerance: Duration::ZERO,
        }
    }
}

impl ReconcileConfig {
    /// Create a new config builder.
    pub fn builder() -> ReconcileConfigBuilder {
        ReconcileConfigBuilder::default()
    }
}

/// What one directory needs, borrowed from the scans.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PatchSet<'a> {
    /// Records from the other side that this side lacks.
    pub added: Vec<&'a FileRecord>,
    /// This side's records that match the other side.
    pub unchanged: Vec<&'a FileRecord>,
    /// This side's records that differ from the other side.
    pub conflict: Vec<&'a FileRecord>,
}

impl<'a> PatchSet<'a> {
    /// All entries tagged with their change, grouped by category.
    pub fn entries(&self) -> impl Iterator<Item = (Change, &'a FileRecord)> + '_ {
        self.added
            .iter()
            .map(|record| (Change::Added, *record))
            .chain(self.unchanged.iter().map(|record| (Change::Unchanged, *record)))
            .chain(self.conflict.iter().map(|record| (Change::Conflict, *record)))
    }

    /// Records for a single category.
    pub fn records(&self, change: Change) -> &[&'a FileRecord] {
        match change {
            Change::Added => &self.added,
            Change::Unchanged => &self.unchanged,
            Change::Conflict => &self.conflict,
        }
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.added.len() + self.unchanged.len() + self.conflict.len()
    }

    /// Check if there is nothing to report for this side.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-category counts.
    pub fn summary(&self) -> PatchSummary {
        PatchSummary {
            added: self.added.len(),
            unchanged: self.unchanged.len(),
            conflict: self.conflict.len(),
        }
    }
}

/// Per-category counts for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSummary {
    pub added: usize,
    pub unchanged: usize,
    pub conflict: usize,
}

/// Result of reconciling two scans.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation<'a> {
    /// Fingerprint algorithm both scans used.
    pub fingerprint: FingerprintKind,
    /// What directory A needs.
    pub a: PatchSet<'a>,
    /// What directory B needs.
    pub b: PatchSet<'a>,
}

/// Compares two scans.
#[derive(Debug, Clone)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    /// Create a reconciler with exact equality.
    pub fn new() -> Self {
        Self {
            config: ReconcileConfig::default(),
        }
    }

    /// Create a reconciler with custom config.
    pub fn with_config(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Classify every path of both scans.
    ///
    /// Never fails for two scans taken with the same fingerprint algorithm.
    pub fn reconcile<'a>(
        &self,
        scan_a: &'a ScanResult,
        scan_b: &'a ScanResult,
    ) -> Result<Reconciliation<'a>, ReconcileError> {
        if scan_a.fingerprint != scan_b.fingerprint {
            return Err(ReconcileError::FingerprintMismatch {
                a: scan_a.fingerprint,
                b: scan_b.fingerprint,
            });
        }

        let tolerance = self.config.mtime_tolerance;
        let mut patch_a = PatchSet::default();
        let mut patch_b = PatchSet::default();

        for (path, record_a) in &scan_a.records {
            match scan_b.records.get(path) {
                Some(record_b) if record_a.matches(record_b, tolerance) => {
                    patch_a.unchanged.push(record_a);
                    patch_b.unchanged.push(record_b);
                }
                Some(record_b) => {
                    patch_a.conflict.push(record_a);
                    patch_b.conflict.push(record_b);
                }
                None => patch_b.added.push(record_a),
            }
        }

        patch_a.added.extend(
            scan_b
                .records
                .iter()
                .filter(|(path, _)| !scan_a.records.contains_key(*path))
                .map(|(_, record)| record),
        );

        debug!(
            a = ?patch_a.summary(),
            b = ?patch_b.summary(),
            "Reconciled scans"
        );

        Ok(Reconciliation {
            fingerprint: scan_a.fingerprint,
            a: patch_a,
            b: patch_b,
        })
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}
