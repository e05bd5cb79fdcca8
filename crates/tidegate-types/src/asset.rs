//! Asset registry entries and the per-chain backend capability traits.
//!
//! The router never talks to an asset node directly. Each supported
//! asset carries a [`AssetBackend`] handle; all chain interaction
//! (address validity, UTXO lookup, confirmation depth, script
//! authorization) goes through it. Production backends wrap node RPC
//! clients; tests substitute doubles.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::ids::AssetId;

/// Failure surfaced by an asset backend. Backend errors never reach the
/// wire directly; the validator maps them into the client-visible
/// taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The outpoint does not resolve to an unspent output.
    #[error("coin not found")]
    CoinNotFound,

    /// The asset node could not be reached or returned an error.
    #[error("node RPC error: {0}")]
    Node(String),

    /// The pubkey/signature/script combination does not spend the
    /// output.
    #[error("authorization rejected: {0}")]
    Auth(String),
}

/// A resolved unspent transaction output.
pub trait UtxoHandle: Send + Sync {
    /// Current confirmation depth. May block on node RPC.
    fn confirmations(&self) -> Result<i64, BackendError>;

    /// Output value in atomic units.
    fn value(&self) -> u64;

    /// Serialized size in bytes of the input that will spend this
    /// output, used for fee estimation.
    fn spend_size(&self) -> u32;

    /// Verify that `sigs` over `msg` authorize spending this output
    /// with the given `pubkeys`.
    fn auth(&self, pubkeys: &[Vec<u8>], sigs: &[Vec<u8>], msg: &[u8]) -> Result<(), BackendError>;
}

/// Chain-specific operations for one asset.
pub trait AssetBackend: Send + Sync {
    /// Whether `address` is well-formed for this asset.
    fn check_address(&self, address: &str) -> bool;

    /// Resolve an outpoint to a [`UtxoHandle`]. `redeem` is the redeem
    /// script for pay-to-script-hash outputs, empty otherwise. May
    /// block on node RPC.
    fn utxo(&self, txid: &str, vout: u32, redeem: &[u8])
        -> Result<Box<dyn UtxoHandle>, BackendError>;
}

/// One registered asset: market parameters plus the backend handle.
#[derive(Clone)]
pub struct AssetInfo {
    /// Wire-shared asset index.
    pub id: AssetId,
    /// Lowercase ticker symbol, used in canonical market names.
    pub symbol: String,
    /// Atomic multiple for order quantities when this is the base asset.
    pub lot_size: u64,
    /// Atomic multiple for limit rates when this is the quote asset.
    pub rate_step: u64,
    /// Fee rate in atomic units per byte.
    pub fee_rate: u64,
    /// Serialized size in bytes of a swap initialization transaction.
    pub swap_size: u32,
    /// Confirmations required before an output can fund an order.
    pub fund_conf: u32,
    /// Chain access.
    pub backend: Arc<dyn AssetBackend>,
}

impl fmt::Debug for AssetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetInfo")
            .field("id", &self.id)
            .field("symbol", &self.symbol)
            .field("lot_size", &self.lot_size)
            .field("rate_step", &self.rate_step)
            .field("fee_rate", &self.fee_rate)
            .field("swap_size", &self.swap_size)
            .field("fund_conf", &self.fund_conf)
            .finish_non_exhaustive()
    }
}

/// Canonical market name for a base/quote symbol pair, e.g. `"dcr_btc"`.
#[must_use]
pub fn market_name(base_symbol: &str, quote_symbol: &str) -> String {
    format!(
        "{}_{}",
        base_symbol.to_lowercase(),
        quote_symbol.to_lowercase()
    )
}
