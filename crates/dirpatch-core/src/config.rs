//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::fingerprint::FingerprintKind;

/// Read buffer size used when streaming file content into a fingerprint.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for scanning one directory tree.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Fingerprint algorithm applied to every file.
    #[builder(default)]
    #[serde(default)]
    pub fingerprint: FingerprintKind,

    /// Bytes read per chunk while fingerprinting.
    #[builder(default = "DEFAULT_CHUNK_SIZE")]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Number of hashing threads (0 = auto-detect).
    ///
    /// Each thread keeps at most one file open, so this also bounds the
    /// number of concurrently open file handles.
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if self.chunk_size == Some(0) {
            return Err("Chunk size must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path with the default fingerprint.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fingerprint: FingerprintKind::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            threads: 0,
        }
    }

    /// Same settings, different root.
    pub fn with_root(&self, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..self.clone()
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .root("/home/user")
            .threads(4usize)
            .fingerprint(FingerprintKind::Crc32)
            .build()
            .unwrap();

        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert_eq!(config.threads, 4);
        assert_eq!(config.fingerprint, FingerprintKind::Crc32);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_config_simple() {
        let config = ScanConfig::new("/home/user");
        assert_eq!(config.root, PathBuf::from("/home/user"));
        assert_eq!(config.fingerprint, FingerprintKind::Sha256);
        assert_eq!(config.chunk_size, 64 * 1024);
        assert_eq!(config.threads, 0);
    }

    #[test]
    fn test_builder_rejects_bad_values() {
        assert!(ScanConfig::builder().build().is_err());
        assert!(ScanConfig::builder().root("").build().is_err());
        assert!(ScanConfig::builder().root("/a").chunk_size(0usize).build().is_err());
    }

    #[test]
    fn test_with_root_keeps_settings() {
        let config = ScanConfig::builder()
            .root("/a")
            .fingerprint(FingerprintKind::Md5)
            .chunk_size(16usize)
            .build()
            .unwrap();
        let other = config.with_root("/b");

        assert_eq!(other.root, PathBuf::from("/b"));
        assert_eq!(other.fingerprint, FingerprintKind::Md5);
        assert_eq!(other.chunk_size, 16);
    }
}
