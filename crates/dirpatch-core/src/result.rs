//! Scan result container.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::fingerprint::FingerprintKind;
use crate::record::FileRecord;

/// All regular files found under one root, keyed by relative path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root path that was scanned.
    pub root: PathBuf,

    /// Fingerprint algorithm used for every record.
    pub fingerprint: FingerprintKind,

    /// Records keyed by their relative path.
    pub records: HashMap<CompactString, FileRecord>,

    /// When this scan was performed.
    pub scanned_at: SystemTime,

    /// Duration of the scan.
    pub scan_duration: Duration,
}

impl ScanResult {
    /// Create a scan result from already keyed records.
    pub fn new(
        root: PathBuf,
        fingerprint: FingerprintKind,
        records: HashMap<CompactString, FileRecord>,
        scan_duration: Duration,
    ) -> Self {
        Self {
            root,
            fingerprint,
            records,
            scanned_at: SystemTime::now(),
            scan_duration,
        }
    }

    /// Build a scan result from a list of records.
    ///
    /// Later records replace earlier ones with the same path.
    pub fn from_records(
        root: impl Into<PathBuf>,
        fingerprint: FingerprintKind,
        records: impl IntoIterator<Item = FileRecord>,
    ) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r.relative_path.clone(), r))
            .collect();
        Self::new(root.into(), fingerprint, records, Duration::ZERO)
    }

    /// Look up a record by relative path.
    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.records.get(path)
    }

    /// Check whether a relative path was scanned.
    pub fn contains(&self, path: &str) -> bool {
        self.records.contains_key(path)
    }

    /// Iterate over the scanned relative paths, in no particular order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(CompactString::as_str)
    }

    /// Number of files scanned.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no files were found.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all file sizes.
    pub fn total_size(&self) -> u64 {
        self.records.values().map(|r| r.size_bytes).sum()
    }
}
