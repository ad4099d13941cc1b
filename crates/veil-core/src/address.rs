//! # Participant Addresses
//!
//! Newtype wrapper for the opaque fixed-width participant identity. Using a
//! dedicated type prevents identifier confusion — you cannot pass a raw byte
//! array or a digest where an `Address` is expected.
//!
//! ## Reserved Values
//!
//! Two constants are carved out of the domain and never assigned to real
//! participants:
//!
//! - [`Address::NULL`] (all zeros) — "no successor" / absent marker.
//! - [`Address::SENTINEL`] (all ones) — the registry head/tail marker.
//!
//! Every operation that accepts a participant rejects both. Real deployments
//! already treat the all-zero address as a burn target and never issue the
//! all-one address, so neither reservation removes a usable identity.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Width of a participant address in bytes.
pub const ADDRESS_WIDTH: usize = 20;

/// An opaque fixed-width participant identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; ADDRESS_WIDTH]);

impl Address {
    /// The all-zero reserved address. Marks "no successor" in the registry
    /// and is never a valid participant.
    pub const NULL: Address = Address([0x00; ADDRESS_WIDTH]);

    /// The all-one reserved address. Serves as the registry head/tail
    /// sentinel and is never a valid participant.
    pub const SENTINEL: Address = Address([0xFF; ADDRESS_WIDTH]);

    /// Construct an address from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_WIDTH]) -> Self {
        Self(bytes)
    }

    /// Parse an address from a 40-char lowercase or uppercase hex string,
    /// with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        if hex.len() != ADDRESS_WIDTH * 2 {
            return Err(CoreError::InvalidAddress {
                input: s.to_string(),
                reason: format!("expected {} hex chars, got {}", ADDRESS_WIDTH * 2, hex.len()),
            });
        }
        let mut out = [0u8; ADDRESS_WIDTH];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|e| CoreError::InvalidAddress {
                input: s.to_string(),
                reason: format!("invalid hex: {e}"),
            })?;
            out[i] = u8::from_str_radix(pair, 16).map_err(|e| CoreError::InvalidAddress {
                input: s.to_string(),
                reason: format!("invalid hex at byte {i}: {e}"),
            })?;
        }
        Ok(Self(out))
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_WIDTH] {
        &self.0
    }

    /// Render as a lowercase hex string without prefix.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Whether this address is one of the two reserved values.
    pub fn is_reserved(&self) -> bool {
        *self == Self::NULL || *self == Self::SENTINEL
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "addr:{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; ADDRESS_WIDTH])
    }

    #[test]
    fn test_reserved_values_are_distinct() {
        assert_ne!(Address::NULL, Address::SENTINEL);
        assert!(Address::NULL.is_reserved());
        assert!(Address::SENTINEL.is_reserved());
        assert!(!addr(0x11).is_reserved());
    }

    #[test]
    fn test_hex_roundtrip() {
        let a = addr(0xAB);
        let parsed = Address::from_hex(&a.to_hex()).unwrap();
        assert_eq!(a, parsed);
    }

    #[test]
    fn test_from_hex_accepts_0x_prefix() {
        let a = addr(0x42);
        let parsed = Address::from_hex(&format!("0x{}", a.to_hex())).unwrap();
        assert_eq!(a, parsed);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(Address::from_hex("abcd").is_err());
        assert!(Address::from_hex("").is_err());
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let bad = "zz".repeat(ADDRESS_WIDTH);
        assert!(Address::from_hex(&bad).is_err());
    }

    #[test]
    fn test_display_prefix() {
        let a = addr(0x01);
        let s = format!("{a}");
        assert!(s.starts_with("addr:"));
        assert_eq!(s.len(), 5 + ADDRESS_WIDTH * 2);
    }

    #[test]
    fn test_serde_roundtrip() {
        let a = addr(0x7F);
        let json = serde_json::to_string(&a).unwrap();
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(a, parsed);
    }
}
