//! Configuration types for assets and markets.
//!
//! These are the static, serde-able descriptions loaded at boot. The
//! router pairs each [`AssetConfig`] with a live backend handle to form
//! an [`AssetInfo`](crate::AssetInfo); misconfigurations surface as
//! [`ConfigError`]s before any route is served.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::asset::{AssetBackend, AssetInfo};
use crate::ids::AssetId;

/// Static parameters of one supported asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub id: AssetId,
    pub symbol: String,
    pub lot_size: u64,
    pub rate_step: u64,
    pub fee_rate: u64,
    pub swap_size: u32,
    pub fund_conf: u32,
}

impl AssetConfig {
    /// Attach a live backend to form the registry entry.
    #[must_use]
    pub fn into_info(self, backend: Arc<dyn AssetBackend>) -> AssetInfo {
        AssetInfo {
            id: self.id,
            symbol: self.symbol,
            lot_size: self.lot_size,
            rate_step: self.rate_step,
            fee_rate: self.fee_rate,
            swap_size: self.swap_size,
            fund_conf: self.fund_conf,
            backend,
        }
    }
}

/// Static description of one market: the asset pair it trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub base: AssetId,
    pub quote: AssetId,
}

impl MarketConfig {
    #[must_use]
    pub fn new(base: AssetId, quote: AssetId) -> Self {
        Self { base, quote }
    }
}

/// Boot-time configuration failure. These indicate corrupted server
/// configuration, never client misbehavior.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A market references an asset ID absent from the asset registry.
    #[error("market {base}/{quote} references unregistered asset ID {missing}")]
    UnknownAsset {
        base: u32,
        quote: u32,
        missing: u32,
    },

    /// A market's base and quote must be distinct assets.
    #[error("market base and quote are the same asset ID {0}")]
    SameAssets(u32),

    /// Two markets resolve to the same canonical name.
    #[error("duplicate market {0}")]
    DuplicateMarket(String),
}
