//! Per-file scan records.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One scanned regular file.
///
/// Two records are equal only when all four fields are equal. A record with
/// the same path but a different fingerprint, size or modification time is a
/// different record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the scan root, `/`-separated, no leading separator.
    pub relative_path: CompactString,

    /// Lower-case hex digest of the full file content.
    pub fingerprint: String,

    /// File size in bytes at scan time.
    pub size_bytes: u64,

    /// Last modification time at scan time.
    pub modified_at: SystemTime,
}

impl FileRecord {
    /// Create a new file record.
    pub fn new(
        relative_path: impl Into<CompactString>,
        fingerprint: impl Into<String>,
        size_bytes: u64,
        modified_at: SystemTime,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            fingerprint: fingerprint.into(),
            size_bytes,
            modified_at,
        }
    }

    /// Modification time as seconds since the Unix epoch, fractional part kept.
    ///
    /// Times before the epoch come out negative.
    pub fn modified_secs(&self) -> f64 {
        match self.modified_at.duration_since(UNIX_EPOCH) {
            Ok(after) => after.as_secs_f64(),
            Err(before) => -before.duration().as_secs_f64(),
        }
    }

    /// Compare against another record, allowing modification times to drift
    /// by strictly less than `tolerance`.
    ///
    /// A zero tolerance is plain equality.
    pub fn matches(&self, other: &FileRecord, tolerance: Duration) -> bool {
        if tolerance.is_zero() {
            return self == other;
        }

        let drift = match self.modified_at.duration_since(other.modified_at) {
            Ok(d) => d,
            Err(e) => e.duration(),
        };

        self.relative_path == other.relative_path
            && self.fingerprint == other.fingerprint
            && self.size_bytes == other.size_bytes
            && drift < tolerance
    }
}
