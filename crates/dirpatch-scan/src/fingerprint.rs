//! Streaming content fingerprints.
//!
//! Every algorithm shares one contract: feed bytes with [`Fingerprint::update`]
//! as many times as needed, then consume the state with
//! [`Fingerprint::finalize`]. The result depends only on the concatenated
//! bytes, never on how they were chunked.

use std::io::{self, Read};

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use dirpatch_core::FingerprintKind;

/// Incremental fingerprint capability.
pub trait Fingerprint {
    /// Feed more content.
    fn update(&mut self, bytes: &[u8]);

    /// Finish and return the lower-case hex digest, without prefix.
    fn finalize(self) -> String;
}

/// Cryptographic hash state.
#[derive(Clone)]
pub enum HashState {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

/// Rolling 32-bit checksum state.
#[derive(Clone)]
pub enum ChecksumState {
    Adler32(adler2::Adler32),
    Crc32(crc32fast::Hasher),
}

/// Fingerprint state for any [`FingerprintKind`].
#[derive(Clone)]
pub enum Fingerprinter {
    Hash(HashState),
    Checksum(ChecksumState),
}

impl Fingerprinter {
    /// Fresh state for the given algorithm.
    pub fn new(kind: FingerprintKind) -> Self {
        match kind {
            FingerprintKind::Md5 => Self::Hash(HashState::Md5(Md5::new())),
            FingerprintKind::Sha1 => Self::Hash(HashState::Sha1(Sha1::new())),
            FingerprintKind::Sha256 => Self::Hash(HashState::Sha256(Sha256::new())),
            FingerprintKind::Blake3 => {
                Self::Hash(HashState::Blake3(Box::new(blake3::Hasher::new())))
            }
            FingerprintKind::Adler32 => {
                Self::Checksum(ChecksumState::Adler32(adler2::Adler32::new()))
            }
            FingerprintKind::Crc32 => Self::Checksum(ChecksumState::Crc32(crc32fast::Hasher::new())),
        }
    }

    /// Algorithm this state computes.
    pub fn kind(&self) -> FingerprintKind {
        match self {
            Self::Hash(HashState::Md5(_)) => FingerprintKind::Md5,
            Self::Hash(HashState::Sha1(_)) => FingerprintKind::Sha1,
            Self::Hash(HashState::Sha256(_)) => FingerprintKind::Sha256,
            Self::Hash(HashState::Blake3(_)) => FingerprintKind::Blake3,
            Self::Checksum(ChecksumState::Adler32(_)) => FingerprintKind::Adler32,
            Self::Checksum(ChecksumState::Crc32(_)) => FingerprintKind::Crc32,
        }
    }
}

impl Fingerprint for Fingerprinter {
    fn update(&mut self, bytes: &[u8]) {
        match self {
            Self::Hash(HashState::Md5(h)) => h.update(bytes),
            Self::Hash(HashState::Sha1(h)) => h.update(bytes),
            Self::Hash(HashState::Sha256(h)) => h.update(bytes),
            Self::Hash(HashState::Blake3(h)) => {
                h.update(bytes);
            }
            Self::Checksum(ChecksumState::Adler32(c)) => c.write_slice(bytes),
            Self::Checksum(ChecksumState::Crc32(c)) => c.update(bytes),
        }
    }

    fn finalize(self) -> String {
        match self {
            Self::Hash(HashState::Md5(h)) => hex::encode(h.finalize()),
            Self::Hash(HashState::Sha1(h)) => hex::encode(h.finalize()),
            Self::Hash(HashState::Sha256(h)) => hex::encode(h.finalize()),
            Self::Hash(HashState::Blake3(h)) => h.finalize().to_hex().to_string(),
            // Checksums are fixed width so every digest of a kind has the same length.
            Self::Checksum(ChecksumState::Adler32(c)) => format!("{:08x}", c.checksum()),
            Self::Checksum(ChecksumState::Crc32(c)) => format!("{:08x}", c.finalize()),
        }
    }
}

/// Stream a reader through a fresh fingerprint in `chunk_size` reads.
pub fn fingerprint_reader<R: Read>(
    kind: FingerprintKind,
    mut reader: R,
    chunk_size: usize,
) -> io::Result<String> {
    let mut state = Fingerprinter::new(kind);
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        state.update(&buffer[..bytes_read]);
    }

    Ok(state.finalize())
}

/// Fingerprint an in-memory buffer.
pub fn fingerprint_bytes(kind: FingerprintKind, bytes: &[u8]) -> String {
    let mut state = Fingerprinter::new(kind);
    state.update(bytes);
    state.finalize()
}
