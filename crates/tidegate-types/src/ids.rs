//! Identifiers used throughout Tidegate.
//!
//! Account IDs are opaque fixed-width binary handed out at registration;
//! order IDs are content hashes of the order's canonical serialization.
//! Both compare by byte equality.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ACCOUNT_ID_SIZE, ORDER_ID_SIZE};

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Opaque fixed-width identity for a registered trading account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub [u8; ACCOUNT_ID_SIZE]);

impl AccountId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; ACCOUNT_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse an account ID from a wire-supplied blob. Returns `None` if
    /// the blob is not exactly [`ACCOUNT_ID_SIZE`] bytes.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; ACCOUNT_ID_SIZE] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_SIZE] {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// OrderId
// ---------------------------------------------------------------------------

/// Unique order identifier: the SHA-256 digest of the order's canonical
/// serialization. Deterministic — every node derives the same ID for
/// the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderId(pub [u8; ORDER_ID_SIZE]);

impl OrderId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; ORDER_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parse an order ID from a wire-supplied blob. Returns `None` if
    /// the blob is not exactly [`ORDER_ID_SIZE`] bytes.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; ORDER_ID_SIZE] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; ORDER_ID_SIZE] {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// AssetId
// ---------------------------------------------------------------------------

/// Wire-shared index of a supported asset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct AssetId(pub u32);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_byte_equality() {
        let a = AccountId([7u8; 32]);
        let b = AccountId([7u8; 32]);
        let c = AccountId([8u8; 32]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn account_id_from_slice_rejects_wrong_length() {
        assert!(AccountId::from_slice(&[0u8; 31]).is_none());
        assert!(AccountId::from_slice(&[0u8; 33]).is_none());
        assert!(AccountId::from_slice(&[0u8; 32]).is_some());
    }

    #[test]
    fn order_id_from_slice_rejects_wrong_length() {
        assert!(OrderId::from_slice(&[1u8; 16]).is_none());
        let id = OrderId::from_slice(&[1u8; 32]).unwrap();
        assert_eq!(id.as_bytes(), &[1u8; 32]);
    }

    #[test]
    fn order_id_display_is_hex() {
        let id = OrderId([0xabu8; 32]);
        assert_eq!(format!("{id}"), "ab".repeat(32));
    }

    #[test]
    fn serde_roundtrips() {
        let id = OrderId([3u8; 32]);
        let json = serde_json::to_string(&id).unwrap();
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let asset = AssetId(42);
        let json = serde_json::to_string(&asset).unwrap();
        assert_eq!(json, "42");
        let back: AssetId = serde_json::from_str(&json).unwrap();
        assert_eq!(asset, back);
    }
}
