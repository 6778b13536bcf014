//! Directory scanning engine for dirpatch.
//!
//! This crate walks a directory tree, fingerprints every regular file and
//! returns a [`ScanResult`] keyed by canonical relative path.
//!
//! # Overview
//!
//! - **Parallel traversal** via jwalk
//! - **Parallel fingerprinting** on a bounded rayon pool
//! - **Pluggable fingerprints**: MD5, SHA-1, SHA-256, BLAKE3, Adler-32, CRC-32
//! - **Fail fast**: the first unreadable file aborts the scan
//!
//! # Example
//!
//! ```rust,no_run
//! use dirpatch_scan::{FingerprintKind, ScanConfig, TreeScanner};
//!
//! let config = ScanConfig::builder()
//!     .root("/path/to/scan")
//!     .fingerprint(FingerprintKind::Md5)
//!     .build()
//!     .unwrap();
//! let scan = TreeScanner::new().scan(&config).unwrap();
//!
//! println!("Files: {}", scan.len());
//! println!("Total size: {} bytes", scan.total_size());
//! ```

mod fingerprint;
mod scanner;

pub use fingerprint::{
    ChecksumState, Fingerprint, Fingerprinter, HashState, fingerprint_bytes, fingerprint_reader,
};
pub use scanner::{TreeScanner, relative_path, resolve_root};

// Re-export core types for convenience
pub use dirpatch_core::{
    FileRecord, FingerprintFamily, FingerprintKind, ScanConfig, ScanError, ScanResult,
};
