//! # tidegate-types
//!
//! Shared types, wire messages, and errors for the **Tidegate** DEX
//! server.
//!
//! This crate is the leaf dependency of the workspace — every other
//! crate depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`OrderId`], [`AssetId`]
//! - **Order model**: [`Order`], [`LimitOrder`], [`MarketOrder`],
//!   [`CancelOrder`], [`Prefix`], [`Outpoint`], [`OrderType`],
//!   [`TimeInForce`]
//! - **Wire messages**: [`Message`], the route payloads
//!   ([`LimitPayload`], [`MarketPayload`], [`CancelPayload`]),
//!   [`UtxoEntry`], [`OrderResult`], [`HexBytes`], and the
//!   [`Signable`]/[`Stampable`] traits
//! - **Asset model**: [`AssetInfo`] and the [`AssetBackend`] /
//!   [`UtxoHandle`] capability traits
//! - **Errors**: [`TidegateError`] with `TG_ERR_` prefix codes,
//!   [`BackendError`], [`ConfigError`]
//! - **Configuration**: [`AssetConfig`], [`MarketConfig`]
//! - **Constants**: wire codes and system-wide limits

pub mod asset;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod msgs;
pub mod order;

// Re-export all primary types at the crate root for ergonomic imports:
//   use tidegate_types::{Order, OrderId, TidegateError, ...};

pub use asset::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use msgs::*;
pub use order::*;

// Constants are accessed via `tidegate_types::constants::FOO`
// (not re-exported to avoid name collisions).
