//! Fingerprint strategy selection.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Algorithm family a fingerprint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FingerprintFamily {
    /// Cryptographic hash, usable as a content-equality oracle.
    Hash,
    /// Fast 32-bit rolling checksum. Only good enough for equality checks.
    Checksum,
}

/// Selects the algorithm used to fingerprint file content.
///
/// Exactly one kind is active per scan. Both scans being reconciled must use
/// the same kind.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintKind {
    /// MD5 (128-bit).
    Md5,
    /// SHA-1 (160-bit).
    Sha1,
    /// SHA-256 (256-bit).
    #[default]
    #[strum(to_string = "sha256", serialize = "sha2")]
    Sha256,
    /// BLAKE3 (256-bit).
    Blake3,
    /// Adler-32 checksum.
    Adler32,
    /// CRC-32 (IEEE) checksum.
    #[strum(to_string = "crc32", serialize = "crc")]
    Crc32,
}

impl FingerprintKind {
    /// Family this algorithm belongs to.
    pub fn family(self) -> FingerprintFamily {
        match self {
            Self::Md5 | Self::Sha1 | Self::Sha256 | Self::Blake3 => FingerprintFamily::Hash,
            Self::Adler32 | Self::Crc32 => FingerprintFamily::Checksum,
        }
    }

    /// Length of the finalized hex string.
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 | Self::Blake3 => 64,
            Self::Adler32 | Self::Crc32 => 8,
        }
    }

    /// Whether this kind is a cryptographic hash.
    pub fn is_cryptographic(self) -> bool {
        self.family() == FingerprintFamily::Hash
    }
}
