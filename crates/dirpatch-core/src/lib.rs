//! Core types and configuration for dirpatch.
//!
//! This crate provides the data model shared by the scanner and the
//! reconciler: file records, scan results, the fingerprint selector and
//! scan configuration.

mod config;
mod error;
mod fingerprint;
mod record;
mod result;

pub use config::{DEFAULT_CHUNK_SIZE, ScanConfig, ScanConfigBuilder};
pub use error::ScanError;
pub use fingerprint::{FingerprintFamily, FingerprintKind};
pub use record::FileRecord;
pub use result::ScanResult;
