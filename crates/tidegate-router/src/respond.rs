//! The response protocol for accepted orders.

use tracing::{debug, error};

use tidegate_types::{HexBytes, Message, OrderResult, Signable, Stampable};

use crate::router::OrderRouter;
use crate::tunnel::OrderRecord;

impl OrderRouter {
    /// Stamp the retained request with the order's acceptance time,
    /// countersign it, and send the [`OrderResult`] to the client.
    ///
    /// Runs after `submit_order_async`: the order is already accepted,
    /// so an envelope failure here is logged and dropped — the client
    /// times out and retries against an order that is already in the
    /// epoch queue.
    pub(crate) fn respond_order(&self, mut record: OrderRecord) {
        let stamp = record.order.time();
        record.req.stamp(stamp);
        let order_id = record.order.id();
        self.auth.sign(&mut record.req);

        let result = OrderResult {
            sig: HexBytes::from(record.req.sig_bytes()),
            server_time: stamp,
            order_id: HexBytes(order_id.as_bytes().to_vec()),
        };
        match Message::response(record.msg_id, &result) {
            Ok(resp) => {
                debug!(%order_id, msg_id = record.msg_id, "order accepted");
                self.auth.send(record.order.user(), resp);
            }
            Err(err) => {
                error!(%err, %order_id, "failed to build order response envelope");
            }
        }
    }
}
