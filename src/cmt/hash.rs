//! Digest primitive used for leaves, aggregates and roots.

use serde::{Deserialize, Serialize};
use sha2::Digest as _;
use std::fmt;

/// Every digest in the tree is 32 bytes regardless of the hash family.
pub const HASH_SIZE: usize = 32;

pub type Digest = [u8; HASH_SIZE];

/// Hash families available for tree commitments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HashKind {
    #[default]
    Sha3_256,
    Sha256,
}

impl HashKind {
    pub fn digest(self, bytes: &[u8]) -> Digest {
        match self {
            HashKind::Sha3_256 => sha3::Sha3_256::digest(bytes).into(),
            HashKind::Sha256 => sha2::Sha256::digest(bytes).into(),
        }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashKind::Sha3_256 => write!(f, "SHA3-256"),
            HashKind::Sha256 => write!(f, "SHA-256"),
        }
    }
}

impl std::str::FromStr for HashKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha3" | "sha3-256" | "sha3_256" => Ok(HashKind::Sha3_256),
            "sha2" | "sha256" | "sha-256" => Ok(HashKind::Sha256),
            other => Err(format!("unknown hash kind: {other}. Use 'sha3' or 'sha256'")),
        }
    }
}

/// Hashes `bytes` with the given family.
pub fn digest(bytes: &[u8], kind: HashKind) -> Digest {
    kind.digest(bytes)
}
