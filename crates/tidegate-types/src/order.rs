//! The order model handed to market tunnels.
//!
//! Orders are built by the router after validation, stamped with server
//! time exactly once, and serialized deterministically. An order's ID
//! is the SHA-256 digest of that serialization, so every component that
//! sees the order derives the same ID.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{
    CANCEL_ORDER_NUM, IMMEDIATE_TIF_NUM, LIMIT_ORDER_NUM, MARKET_ORDER_NUM, STANDING_TIF_NUM,
};
use crate::ids::{AccountId, AssetId, OrderId};

/// Domain separator mixed into every order ID digest.
const ORDER_ID_DOMAIN: &[u8] = b"tidegate:order:v1:";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The type of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
    Cancel,
}

impl OrderType {
    /// Numeric wire code for this order type.
    #[must_use]
    pub const fn wire_code(self) -> u8 {
        match self {
            Self::Limit => LIMIT_ORDER_NUM,
            Self::Market => MARKET_ORDER_NUM,
            Self::Cancel => CANCEL_ORDER_NUM,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
            Self::Market => write!(f, "MARKET"),
            Self::Cancel => write!(f, "CANCEL"),
        }
    }
}

/// Time-in-force of a limit order: rest on the book, or fill in the
/// current epoch only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    Standing,
    Immediate,
}

impl TimeInForce {
    /// Numeric wire code for this time-in-force.
    #[must_use]
    pub const fn wire_code(self) -> u8 {
        match self {
            Self::Standing => STANDING_TIF_NUM,
            Self::Immediate => IMMEDIATE_TIF_NUM,
        }
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standing => write!(f, "STANDING"),
            Self::Immediate => write!(f, "IMMEDIATE"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outpoint
// ---------------------------------------------------------------------------

/// A funding UTXO reference: transaction hash plus output index.
/// Identity by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Outpoint {
    pub txid: Vec<u8>,
    pub vout: u32,
}

impl Outpoint {
    #[must_use]
    pub fn new(txid: Vec<u8>, vout: u32) -> Self {
        Self { txid, vout }
    }

    /// Hex encoding of the transaction hash, as backends expect it.
    #[must_use]
    pub fn txid_hex(&self) -> String {
        hex::encode(&self.txid)
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(&self.txid), self.vout)
    }
}

// ---------------------------------------------------------------------------
// Order structs
// ---------------------------------------------------------------------------

/// Fields common to every order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefix {
    pub account_id: AccountId,
    pub base_asset: AssetId,
    pub quote_asset: AssetId,
    pub order_type: OrderType,
    /// Client-supplied submission time, unix seconds.
    pub client_time: u64,
    /// Set by the router at acceptance, unix seconds.
    pub server_time: u64,
}

impl Prefix {
    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.account_id.as_bytes());
        buf.extend_from_slice(&self.base_asset.0.to_le_bytes());
        buf.extend_from_slice(&self.quote_asset.0.to_le_bytes());
        buf.push(self.order_type.wire_code());
        buf.extend_from_slice(&self.client_time.to_le_bytes());
        buf.extend_from_slice(&self.server_time.to_le_bytes());
    }
}

/// A market order: trade at whatever the epoch's matching produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub prefix: Prefix,
    /// Accepted funding outpoints, in submission order.
    pub utxos: Vec<Outpoint>,
    pub sell: bool,
    /// Base-asset atoms for a sell, quote-asset atoms for a market buy.
    pub quantity: u64,
    /// Receiving-asset address for the swap.
    pub address: String,
}

impl MarketOrder {
    fn write_to(&self, buf: &mut Vec<u8>) {
        self.prefix.write_to(buf);
        buf.extend_from_slice(&(self.utxos.len() as u32).to_le_bytes());
        for utxo in &self.utxos {
            buf.extend_from_slice(&utxo.txid);
            buf.extend_from_slice(&utxo.vout.to_le_bytes());
        }
        buf.push(u8::from(self.sell));
        buf.extend_from_slice(&self.quantity.to_le_bytes());
        buf.extend_from_slice(self.address.as_bytes());
    }
}

/// A limit order: trade at `rate` or better.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrder {
    pub market: MarketOrder,
    /// Quote-asset rate in atomic rate-encoding units.
    pub rate: u64,
    pub force: TimeInForce,
}

impl LimitOrder {
    fn write_to(&self, buf: &mut Vec<u8>) {
        self.market.write_to(buf);
        buf.extend_from_slice(&self.rate.to_le_bytes());
        buf.push(self.force.wire_code());
    }
}

/// A cancel order targeting a standing limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub prefix: Prefix,
    pub target_order_id: OrderId,
}

impl CancelOrder {
    fn write_to(&self, buf: &mut Vec<u8>) {
        self.prefix.write_to(buf);
        buf.extend_from_slice(self.target_order_id.as_bytes());
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// Any order the router can hand to a market tunnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Limit(LimitOrder),
    Market(MarketOrder),
    Cancel(CancelOrder),
}

impl Order {
    /// Deterministic canonical serialization. Shared contract: the
    /// order ID is derived from these bytes.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        match self {
            Self::Limit(lo) => lo.write_to(&mut buf),
            Self::Market(mo) => mo.write_to(&mut buf),
            Self::Cancel(co) => co.write_to(&mut buf),
        }
        buf
    }

    /// The order's unique ID: SHA-256 over the canonical serialization.
    #[must_use]
    pub fn id(&self) -> OrderId {
        let mut hasher = Sha256::new();
        hasher.update(ORDER_ID_DOMAIN);
        hasher.update(self.serialize());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        OrderId(bytes)
    }

    #[must_use]
    pub fn prefix(&self) -> &Prefix {
        match self {
            Self::Limit(lo) => &lo.market.prefix,
            Self::Market(mo) => &mo.prefix,
            Self::Cancel(co) => &co.prefix,
        }
    }

    /// The submitting account.
    #[must_use]
    pub fn user(&self) -> AccountId {
        self.prefix().account_id
    }

    /// The server acceptance timestamp, unix seconds.
    #[must_use]
    pub fn time(&self) -> u64 {
        self.prefix().server_time
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    /// A minimal limit sell for unit tests.
    #[must_use]
    pub fn dummy_limit(client_time: u64, server_time: u64) -> Self {
        Self::Limit(LimitOrder {
            market: MarketOrder {
                prefix: Prefix {
                    account_id: AccountId([1u8; 32]),
                    base_asset: AssetId(42),
                    quote_asset: AssetId(0),
                    order_type: OrderType::Limit,
                    client_time,
                    server_time,
                },
                utxos: vec![Outpoint::new(vec![0xaa; 32], 0)],
                sell: true,
                quantity: 1_000_000,
                address: "addr".to_string(),
            },
            rate: 50,
            force: TimeInForce::Standing,
        })
    }
}
