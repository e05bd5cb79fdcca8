//! # tidegate-router
//!
//! **Order admission plane**: the authenticated ingress of the Tidegate
//! DEX server. Accepts client-submitted trade intentions, validates
//! them against market, asset, funding, signature, and clock rules, and
//! hands accepted orders to the owning market's epoch queue.
//!
//! ## Request Flow
//!
//! ```text
//! AuthManager dispatch → handler → decode → verify account/signature
//!     → resolve market → check prefix + trade + funding → price
//!     → MarketTunnel.submit_order_async → stamp + sign → reply
//! ```
//!
//! Every step is a hard gate: the first failure produces a single wire
//! error and nothing reaches the tunnel. The router itself is
//! stateless between requests — read-only asset and market tables,
//! everything mutable behind the [`AuthManager`], [`MarketTunnel`], and
//! asset-backend collaborator traits.

pub mod auth;
pub mod coins;
pub mod funds;
pub mod router;
pub mod tunnel;
pub mod validate;

mod respond;

#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

pub use auth::{AuthError, AuthManager, RouteHandler};
pub use coins::AssetSet;
pub use funds::{base_to_quote, quote_to_base, required_funds};
pub use router::{MarketDef, OrderRouter, RouterConfig};
pub use tunnel::{MarketTunnel, OrderRecord};
pub use validate::TradeFunding;
