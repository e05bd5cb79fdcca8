//! System-wide constants for the Tidegate order router.
//!
//! The numeric codes in this module are shared with clients and must
//! never be renumbered.

/// Maximum tolerated offset between the client's order timestamp and
/// server time, in seconds. An offset at or beyond this bound is
/// rejected.
pub const MAX_CLOCK_OFFSET_S: i64 = 10;

/// Scaling factor applied to rates on the wire. A rate of
/// `RATE_ENCODING_FACTOR` converts one atomic unit to one atomic unit.
pub const RATE_ENCODING_FACTOR: u64 = 100_000_000;

/// Length in bytes of an order ID.
pub const ORDER_ID_SIZE: usize = 32;

/// Length in bytes of an account ID.
pub const ACCOUNT_ID_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Wire enums. One numeric code per variant, shared with clients.
// ---------------------------------------------------------------------------

/// Side code for a buy order.
pub const BUY_ORDER_NUM: u8 = 1;
/// Side code for a sell order.
pub const SELL_ORDER_NUM: u8 = 2;

/// Order-type code for a limit order.
pub const LIMIT_ORDER_NUM: u8 = 1;
/// Order-type code for a market order.
pub const MARKET_ORDER_NUM: u8 = 2;
/// Order-type code for a cancel order.
pub const CANCEL_ORDER_NUM: u8 = 3;

/// Time-in-force code for a standing limit order.
pub const STANDING_TIF_NUM: u8 = 1;
/// Time-in-force code for an immediate limit order.
pub const IMMEDIATE_TIF_NUM: u8 = 2;

// ---------------------------------------------------------------------------
// Route names.
// ---------------------------------------------------------------------------

/// Route name for limit order submission.
pub const LIMIT_ROUTE: &str = "limit";
/// Route name for market order submission.
pub const MARKET_ROUTE: &str = "market";
/// Route name for order cancellation.
pub const CANCEL_ROUTE: &str = "cancel";

/// Default market buy buffer: a market buy must carry enough quote
/// funding to fill at least this many base-asset lots at the mid-gap
/// rate.
pub const DEFAULT_MARKET_BUY_BUFFER: f64 = 1.25;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
