//! # Commitment Digests and the Hash Oracle Seam
//!
//! Defines `Digest`, the opaque 256-bit commitment value, and `HashOracle`,
//! the trait through which the coordinator computes digests. The engine
//! treats the oracle as a collision- and preimage-resistant black box — it
//! checks only that a revealed `(value, secret)` pair reproduces the stored
//! digest, never whether the value is "correct" at the business level.
//!
//! ## Input Framing
//!
//! `Sha256Oracle` length-prefixes both inputs before hashing:
//!
//! ```text
//! digest = SHA256( be64(len(value)) || value || be64(len(secret)) || secret )
//! ```
//!
//! Without the prefixes, `("ab", "c")` and `("a", "bc")` would hash to the
//! same digest, letting a participant reveal a different split of the same
//! byte string than the one committed.

use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};

use crate::error::CoreError;

/// An opaque 256-bit commitment digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Construct a digest from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a digest from a 64-char hex string, with or without a `0x`
    /// prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        if hex.len() != 64 {
            return Err(CoreError::InvalidDigest {
                input: s.to_string(),
                reason: format!("expected 64 hex chars, got {}", hex.len()),
            });
        }
        let mut out = [0u8; 32];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|e| CoreError::InvalidDigest {
                input: s.to_string(),
                reason: format!("invalid hex: {e}"),
            })?;
            out[i] = u8::from_str_radix(pair, 16).map_err(|e| CoreError::InvalidDigest {
                input: s.to_string(),
                reason: format!("invalid hex at byte {i}: {e}"),
            })?;
        }
        Ok(Self(out))
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "digest:{}", self.to_hex())
    }
}

/// The hash oracle the coordinator uses to bind and check commitments.
///
/// Supplied by the environment; the engine never picks a hash function
/// itself. Implementations must be deterministic — the same `(value,
/// secret)` pair must always produce the same digest.
pub trait HashOracle {
    /// Compute the commitment digest for a `(value, secret)` pair.
    fn commitment_digest(&self, value: &[u8], secret: &[u8]) -> Digest;
}

/// Reference oracle: length-prefixed SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Oracle;

impl HashOracle for Sha256Oracle {
    fn commitment_digest(&self, value: &[u8], secret: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update((value.len() as u64).to_be_bytes());
        hasher.update(value);
        hasher.update((secret.len() as u64).to_be_bytes());
        hasher.update(secret);
        let hash = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Digest(bytes)
    }
}
