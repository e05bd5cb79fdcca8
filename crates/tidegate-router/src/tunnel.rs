//! The market tunnel capability set and the submission envelope.

use tidegate_types::{AccountId, Order, OrderId, OrderRequest};

/// Everything needed to respond to an order request after the order has
/// been handed to the epoch queue.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub order: Order,
    /// The original request, retained for the response signature.
    pub req: OrderRequest,
    /// Correlation ID of the originating message.
    pub msg_id: u64,
}

impl OrderRecord {
    #[must_use]
    pub fn new(order: Order, req: OrderRequest, msg_id: u64) -> Self {
        Self { order, req, msg_id }
    }
}

/// A connection to one market and to its knowledge of in-flight swaps.
pub trait MarketTunnel: Send + Sync {
    /// Hand the order to the market for insertion into the epoch queue.
    /// Non-blocking by contract; the tunnel takes its own copy of the
    /// record. The epoch queue owns sequencing and outpoint locking
    /// from this point on.
    fn submit_order_async(&self, record: &OrderRecord);

    /// The rate halfway between the best buy and the best sell on the
    /// book, used to price market buys.
    fn mid_gap(&self) -> u64;

    /// Whether the outpoint currently funds an active order. Covers the
    /// epoch queue, the book, and the swap monitor, since outputs stay
    /// unspent on-chain until clients broadcast their initialization
    /// transactions.
    fn outpoint_locked(&self, txid: &str, vout: u32) -> bool;

    /// Whether the order is cancelable: a standing limit order
    /// currently in the epoch queue or on the book.
    fn cancelable(&self, order_id: OrderId) -> bool;

    /// Whether the user's transaction belongs to a monitored trade.
    /// Change outputs of monitored trades may fund new orders without
    /// waiting for the confirmation requirement.
    fn tx_monitored(&self, user: AccountId, txid: &str) -> bool;
}
