//! Wire messages for the order routes.
//!
//! Requests arrive as a framed [`Message`] whose JSON payload decodes
//! into one of the route payload structs. Byte fields travel
//! hex-encoded ([`HexBytes`]). Every payload also has a deterministic
//! byte serialization — the content covered by the client's request
//! signature and, after stamping, by the server's response signature.
//! The byte layouts are a shared contract with clients; change them and
//! every signature breaks.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::AssetId;

// ---------------------------------------------------------------------------
// HexBytes
// ---------------------------------------------------------------------------

/// Byte blob that travels hex-encoded on the JSON wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(Self)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for HexBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl de::Visitor<'_> for HexVisitor {
            type Value = HexBytes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a hex-encoded string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                hex::decode(v).map(HexBytes).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Whether a message carries a request or a response to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Request,
    Response,
}

/// The framed RPC unit exchanged with clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    /// Route name; empty on responses.
    pub route: String,
    /// Client-chosen correlation ID, echoed on the response.
    pub id: u64,
    pub payload: serde_json::Value,
}

impl Message {
    /// Frame a request for `route`.
    pub fn request<T: Serialize>(
        id: u64,
        route: &str,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: MessageKind::Request,
            route: route.to_string(),
            id,
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Frame a response to the request with the given ID.
    pub fn response<T: Serialize>(id: u64, payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: MessageKind::Response,
            route: String::new(),
            id,
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Decode the payload as the route's message type.
    pub fn parse_payload<T: de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

// ---------------------------------------------------------------------------
// Signable / Stampable
// ---------------------------------------------------------------------------

/// Anything carrying a detached signature over its deterministic
/// serialization.
pub trait Signable {
    /// The exact bytes the signature covers.
    fn serialize(&self) -> Vec<u8>;

    fn sig_bytes(&self) -> &[u8];

    fn set_sig(&mut self, sig: Vec<u8>);
}

/// A signable request the server stamps with its acceptance time before
/// countersigning.
pub trait Stampable: Signable {
    fn stamp(&mut self, server_time: u64);
}

// ---------------------------------------------------------------------------
// Payload pieces
// ---------------------------------------------------------------------------

/// Order prefix fields common to every order route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixFields {
    pub account_id: HexBytes,
    pub base: AssetId,
    pub quote: AssetId,
    pub order_type: u8,
    /// Client clock at submission, unix seconds.
    pub client_time: u64,
    /// Must be zero on submission; stamped by the server on acceptance.
    pub server_time: u64,
}

impl PrefixFields {
    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.account_id.0);
        buf.extend_from_slice(&self.base.0.to_le_bytes());
        buf.extend_from_slice(&self.quote.0.to_le_bytes());
        buf.push(self.order_type);
        buf.extend_from_slice(&self.client_time.to_le_bytes());
        buf.extend_from_slice(&self.server_time.to_le_bytes());
    }
}

/// One funding UTXO with its ownership proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    pub txid: HexBytes,
    pub vout: u32,
    pub pubkeys: Vec<HexBytes>,
    pub sigs: Vec<HexBytes>,
    /// Redeem script for pay-to-script-hash outputs; empty otherwise.
    pub redeem: HexBytes,
}

impl UtxoEntry {
    /// The message covered by this entry's ownership signatures.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.txid.len() + 4);
        buf.extend_from_slice(&self.txid.0);
        buf.extend_from_slice(&self.vout.to_le_bytes());
        buf
    }

    /// Hex encoding of the transaction hash, as backends expect it.
    #[must_use]
    pub fn txid_hex(&self) -> String {
        hex::encode(&self.txid.0)
    }
}

/// Trade fields shared by the limit and market routes.
///
/// The per-UTXO authorization fields (pubkeys, sigs, redeem) are proved
/// by their own signatures and are not part of the request signature
/// material.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFields {
    pub side: u8,
    pub quantity: u64,
    pub utxos: Vec<UtxoEntry>,
    /// Receiving-asset address for the swap.
    pub address: String,
}

impl TradeFields {
    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.side);
        buf.extend_from_slice(&self.quantity.to_le_bytes());
        buf.extend_from_slice(&(self.utxos.len() as u32).to_le_bytes());
        for utxo in &self.utxos {
            buf.extend_from_slice(&utxo.txid.0);
            buf.extend_from_slice(&utxo.vout.to_le_bytes());
        }
        buf.extend_from_slice(self.address.as_bytes());
    }
}

// ---------------------------------------------------------------------------
// Route payloads
// ---------------------------------------------------------------------------

/// Payload of the `limit` route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPayload {
    #[serde(flatten)]
    pub prefix: PrefixFields,
    #[serde(flatten)]
    pub trade: TradeFields,
    pub rate: u64,
    pub tif: u8,
    pub sig: HexBytes,
}

impl Signable for LimitPayload {
    fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        self.prefix.write_to(&mut buf);
        self.trade.write_to(&mut buf);
        buf.extend_from_slice(&self.rate.to_le_bytes());
        buf.push(self.tif);
        buf
    }

    fn sig_bytes(&self) -> &[u8] {
        &self.sig.0
    }

    fn set_sig(&mut self, sig: Vec<u8>) {
        self.sig = HexBytes(sig);
    }
}

impl Stampable for LimitPayload {
    fn stamp(&mut self, server_time: u64) {
        self.prefix.server_time = server_time;
    }
}

/// Payload of the `market` route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPayload {
    #[serde(flatten)]
    pub prefix: PrefixFields,
    #[serde(flatten)]
    pub trade: TradeFields,
    pub sig: HexBytes,
}

impl Signable for MarketPayload {
    fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        self.prefix.write_to(&mut buf);
        self.trade.write_to(&mut buf);
        buf
    }

    fn sig_bytes(&self) -> &[u8] {
        &self.sig.0
    }

    fn set_sig(&mut self, sig: Vec<u8>) {
        self.sig = HexBytes(sig);
    }
}

impl Stampable for MarketPayload {
    fn stamp(&mut self, server_time: u64) {
        self.prefix.server_time = server_time;
    }
}

/// Payload of the `cancel` route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelPayload {
    #[serde(flatten)]
    pub prefix: PrefixFields,
    pub target_order_id: HexBytes,
    pub sig: HexBytes,
}

impl Signable for CancelPayload {
    fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(128);
        self.prefix.write_to(&mut buf);
        buf.extend_from_slice(&self.target_order_id.0);
        buf
    }

    fn sig_bytes(&self) -> &[u8] {
        &self.sig.0
    }

    fn set_sig(&mut self, sig: Vec<u8>) {
        self.sig = HexBytes(sig);
    }
}

impl Stampable for CancelPayload {
    fn stamp(&mut self, server_time: u64) {
        self.prefix.server_time = server_time;
    }
}

/// The original request a handler retains for the response protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRequest {
    Limit(LimitPayload),
    Market(MarketPayload),
    Cancel(CancelPayload),
}

impl Signable for OrderRequest {
    fn serialize(&self) -> Vec<u8> {
        match self {
            Self::Limit(p) => Signable::serialize(p),
            Self::Market(p) => Signable::serialize(p),
            Self::Cancel(p) => Signable::serialize(p),
        }
    }

    fn sig_bytes(&self) -> &[u8] {
        match self {
            Self::Limit(p) => p.sig_bytes(),
            Self::Market(p) => p.sig_bytes(),
            Self::Cancel(p) => p.sig_bytes(),
        }
    }

    fn set_sig(&mut self, sig: Vec<u8>) {
        match self {
            Self::Limit(p) => p.set_sig(sig),
            Self::Market(p) => p.set_sig(sig),
            Self::Cancel(p) => p.set_sig(sig),
        }
    }
}

impl Stampable for OrderRequest {
    fn stamp(&mut self, server_time: u64) {
        match self {
            Self::Limit(p) => p.stamp(server_time),
            Self::Market(p) => p.stamp(server_time),
            Self::Cancel(p) => p.stamp(server_time),
        }
    }
}

/// Successful reply to any order route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    /// Server signature over the stamped request.
    pub sig: HexBytes,
    /// Acceptance time, unix seconds.
    pub server_time: u64,
    pub order_id: HexBytes,
}
