//! End-to-end route tests: the full admission pipeline driven through
//! the auth manager's dispatch surface, with every collaborator
//! mocked.
//!
//! Each accepted order must produce exactly one tunnel submission and
//! exactly one signed reply; each rejection must produce the right wire
//! code and no side effect at all.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use tidegate_router::mock::{MockAuthManager, MockBackend, MockTunnel, MockUtxo, MOCK_SERVER_SIG};
use tidegate_router::{MarketDef, OrderRouter, RouterConfig};
use tidegate_types::constants::{
    BUY_ORDER_NUM, CANCEL_ORDER_NUM, CANCEL_ROUTE, LIMIT_ORDER_NUM, LIMIT_ROUTE,
    MARKET_ORDER_NUM, MARKET_ROUTE, MAX_CLOCK_OFFSET_S, SELL_ORDER_NUM, STANDING_TIF_NUM,
};
use tidegate_types::error::codes;
use tidegate_types::{
    AccountId, AssetId, AssetInfo, CancelPayload, HexBytes, LimitPayload, MarketPayload, Message,
    MessageKind, Order, OrderId, OrderResult, OrderType, PrefixFields, TidegateError,
    TimeInForce, TradeFields, UtxoEntry,
};

const BASE: AssetId = AssetId(42);
const QUOTE: AssetId = AssetId(0);
const MSG_ID: u64 = 7;

/// Market shape knobs for one test harness.
struct MarketParams {
    base_lot: u64,
    quote_rate_step: u64,
    fund_conf: u32,
    mid_gap: u64,
    market_buy_buffer: f64,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            base_lot: 1_000_000,
            quote_rate_step: 1,
            fund_conf: 2,
            mid_gap: 10_000,
            market_buy_buffer: 1.25,
        }
    }
}

/// One router wired to one base/quote market over mock collaborators.
struct Harness {
    auth: Arc<MockAuthManager>,
    tunnel: Arc<MockTunnel>,
    base_backend: Arc<MockBackend>,
    quote_backend: Arc<MockBackend>,
    user: AccountId,
    _router: Arc<OrderRouter>,
}

fn harness(params: MarketParams) -> Harness {
    let auth = Arc::new(MockAuthManager::new());
    let tunnel = Arc::new(MockTunnel::new(params.mid_gap));
    let base_backend = Arc::new(MockBackend::default());
    let quote_backend = Arc::new(MockBackend::default());

    let mut assets: HashMap<AssetId, Arc<AssetInfo>> = HashMap::new();
    assets.insert(
        BASE,
        Arc::new(AssetInfo {
            id: BASE,
            symbol: "dcr".to_string(),
            lot_size: params.base_lot,
            rate_step: 1,
            fee_rate: 10,
            swap_size: 200,
            fund_conf: params.fund_conf,
            backend: Arc::clone(&base_backend) as Arc<dyn tidegate_types::AssetBackend>,
        }),
    );
    assets.insert(
        QUOTE,
        Arc::new(AssetInfo {
            id: QUOTE,
            symbol: "btc".to_string(),
            lot_size: 1_000_000,
            rate_step: params.quote_rate_step,
            fee_rate: 10,
            swap_size: 200,
            fund_conf: params.fund_conf,
            backend: Arc::clone(&quote_backend) as Arc<dyn tidegate_types::AssetBackend>,
        }),
    );

    let router = OrderRouter::new(RouterConfig {
        auth: Arc::clone(&auth) as Arc<dyn tidegate_router::AuthManager>,
        assets,
        markets: vec![MarketDef {
            base: BASE,
            quote: QUOTE,
            tunnel: Arc::clone(&tunnel) as Arc<dyn tidegate_router::MarketTunnel>,
        }],
        market_buy_buffer: params.market_buy_buffer,
    })
    .expect("valid test configuration");

    Harness {
        auth,
        tunnel,
        base_backend,
        quote_backend,
        user: AccountId(rand::random()),
        _router: router,
    }
}

/// Register a scripted UTXO with `backend` and return the wire entry
/// that spends it.
fn fund(
    backend: &MockBackend,
    txid_byte: u8,
    vout: u32,
    value: u64,
    spend_size: u32,
    confs: i64,
) -> UtxoEntry {
    let entry = UtxoEntry {
        txid: HexBytes(vec![txid_byte; 32]),
        vout,
        pubkeys: vec![HexBytes(vec![2u8; 33])],
        sigs: vec![HexBytes(vec![3u8; 64])],
        redeem: HexBytes::default(),
    };
    backend.add_utxo(
        &entry.txid_hex(),
        vout,
        MockUtxo {
            value,
            spend_size,
            confs,
            ..MockUtxo::default()
        },
    );
    entry
}

fn now_secs() -> u64 {
    Utc::now().timestamp() as u64
}

impl Harness {
    fn prefix(&self, order_type: u8) -> PrefixFields {
        PrefixFields {
            account_id: HexBytes(self.user.as_bytes().to_vec()),
            base: BASE,
            quote: QUOTE,
            order_type,
            client_time: now_secs(),
            server_time: 0,
        }
    }

    fn limit_sell(&self, quantity: u64, rate: u64, utxos: Vec<UtxoEntry>) -> LimitPayload {
        LimitPayload {
            prefix: self.prefix(LIMIT_ORDER_NUM),
            trade: TradeFields {
                side: SELL_ORDER_NUM,
                quantity,
                utxos,
                address: "receiving-address".to_string(),
            },
            rate,
            tif: STANDING_TIF_NUM,
            sig: HexBytes(vec![9u8; 64]),
        }
    }

    fn market_order(&self, side: u8, quantity: u64, utxos: Vec<UtxoEntry>) -> MarketPayload {
        MarketPayload {
            prefix: self.prefix(MARKET_ORDER_NUM),
            trade: TradeFields {
                side,
                quantity,
                utxos,
                address: "receiving-address".to_string(),
            },
            sig: HexBytes(vec![9u8; 64]),
        }
    }

    fn cancel(&self, target: Vec<u8>) -> CancelPayload {
        CancelPayload {
            prefix: self.prefix(CANCEL_ORDER_NUM),
            target_order_id: HexBytes(target),
            sig: HexBytes(vec![9u8; 64]),
        }
    }

    fn send_limit(&self, payload: &LimitPayload) -> Result<(), TidegateError> {
        let msg = Message::request(MSG_ID, LIMIT_ROUTE, payload).unwrap();
        self.auth.dispatch(LIMIT_ROUTE, self.user, &msg)
    }

    fn send_market(&self, payload: &MarketPayload) -> Result<(), TidegateError> {
        let msg = Message::request(MSG_ID, MARKET_ROUTE, payload).unwrap();
        self.auth.dispatch(MARKET_ROUTE, self.user, &msg)
    }

    fn send_cancel(&self, payload: &CancelPayload) -> Result<(), TidegateError> {
        let msg = Message::request(MSG_ID, CANCEL_ROUTE, payload).unwrap();
        self.auth.dispatch(CANCEL_ROUTE, self.user, &msg)
    }

    /// A rejection must leave no trace: nothing submitted, nothing sent.
    fn assert_no_side_effects(&self) {
        assert_eq!(self.tunnel.submitted_count(), 0, "rejected order reached the tunnel");
        assert_eq!(self.auth.sent_count(), 0, "rejected order produced a reply");
    }

    /// An acceptance must leave exactly one submission and one signed
    /// reply; returns both for further inspection.
    fn assert_accepted(&self) -> (Order, OrderResult) {
        assert_eq!(self.tunnel.submitted_count(), 1);
        assert_eq!(self.auth.sent_count(), 1);

        let record = self.tunnel.last_submitted().unwrap();
        let (to, reply) = self.auth.last_sent().unwrap();
        assert_eq!(to, self.user);
        assert_eq!(reply.kind, MessageKind::Response);
        assert_eq!(reply.id, MSG_ID);

        let result: OrderResult = reply.parse_payload().unwrap();
        assert_eq!(result.sig.0, MOCK_SERVER_SIG.to_vec());
        assert_eq!(result.order_id.0, record.order.id().as_bytes().to_vec());
        assert_eq!(result.server_time, record.order.time());
        (record.order, result)
    }
}

// =============================================================================
// Accepted orders
// =============================================================================

#[test]
fn limit_sell_happy_path() {
    let h = harness(MarketParams::default());
    let utxos = vec![
        fund(&h.base_backend, 0xaa, 0, 2_000_000, 150, 5),
        fund(&h.base_backend, 0xbb, 1, 2_000_000, 150, 5),
    ];
    let payload = h.limit_sell(2_000_000, 50, utxos);

    h.send_limit(&payload).unwrap();
    let (order, result) = h.assert_accepted();

    let Order::Limit(lo) = order else {
        panic!("expected a limit order")
    };
    assert!(lo.market.sell);
    assert_eq!(lo.market.quantity, 2_000_000);
    assert_eq!(lo.rate, 50);
    assert_eq!(lo.force, TimeInForce::Standing);
    assert_eq!(lo.market.prefix.order_type, OrderType::Limit);
    assert_eq!(lo.market.prefix.account_id, h.user);

    // Accepted outpoints mirror the submitted entries, in order.
    assert_eq!(lo.market.utxos.len(), 2);
    assert_eq!(lo.market.utxos[0].txid, vec![0xaa; 32]);
    assert_eq!(lo.market.utxos[0].vout, 0);
    assert_eq!(lo.market.utxos[1].txid, vec![0xbb; 32]);
    assert_eq!(lo.market.utxos[1].vout, 1);

    // Timestamp invariants of every accepted order.
    let prefix = &lo.market.prefix;
    assert!(prefix.server_time > 0);
    assert!(prefix.client_time > 0);
    let offset = prefix.server_time as i64 - prefix.client_time as i64;
    assert!(offset.abs() < MAX_CLOCK_OFFSET_S);
    assert_eq!(result.server_time, prefix.server_time);
}

#[test]
fn market_sell_happy_path() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    let payload = h.market_order(SELL_ORDER_NUM, 2_000_000, utxos);

    h.send_market(&payload).unwrap();
    let (order, _) = h.assert_accepted();

    let Order::Market(mo) = order else {
        panic!("expected a market order")
    };
    assert!(mo.sell);
    assert_eq!(mo.prefix.order_type, OrderType::Market);
    assert_eq!(mo.quantity, 2_000_000);
}

#[test]
fn market_buy_happy_path() {
    // Base lot 1e8, mid-gap 1e4: a 1e11 quote-unit buy converts to a
    // 1e7 funding requirement, well past the 1.25e4 buffered-lot floor.
    let h = harness(MarketParams {
        base_lot: 100_000_000,
        ..MarketParams::default()
    });
    let utxos = vec![fund(&h.quote_backend, 0xcc, 0, 20_000_000, 150, 5)];
    let payload = h.market_order(BUY_ORDER_NUM, 100_000_000_000, utxos);

    h.send_market(&payload).unwrap();
    let (order, _) = h.assert_accepted();

    let Order::Market(mo) = order else {
        panic!("expected a market order")
    };
    assert!(!mo.sell);
}

#[test]
fn market_buy_skips_lot_alignment() {
    // Buys are quote-denominated, so the base lot gate must not apply.
    let h = harness(MarketParams {
        base_lot: 100_000_000,
        ..MarketParams::default()
    });
    let utxos = vec![fund(&h.quote_backend, 0xcc, 0, 20_000_000, 150, 5)];
    let quantity = 10_000_000_100; // not a lot multiple
    assert_ne!(quantity % 100_000_000, 0);

    h.send_market(&h.market_order(BUY_ORDER_NUM, quantity, utxos))
        .unwrap();
    h.assert_accepted();
}

#[test]
fn cancel_happy_path() {
    let h = harness(MarketParams::default());
    let target = OrderId([0x11; 32]);
    h.tunnel.allow_cancel(target);

    h.send_cancel(&h.cancel(target.as_bytes().to_vec())).unwrap();
    let (order, _) = h.assert_accepted();

    let Order::Cancel(co) = order else {
        panic!("expected a cancel order")
    };
    assert_eq!(co.target_order_id, target);
    assert_eq!(co.prefix.order_type, OrderType::Market);
    assert!(co.prefix.server_time > 0);
}

#[test]
fn monitored_change_bypasses_confirmation_gate() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 0)];
    h.tunnel.monitor_tx(h.user, &utxos[0].txid_hex());

    h.send_limit(&h.limit_sell(2_000_000, 50, utxos)).unwrap();
    h.assert_accepted();
}

// =============================================================================
// Parameter rejections
// =============================================================================

#[test]
fn rate_step_violation_is_rejected() {
    let h = harness(MarketParams {
        quote_rate_step: 2,
        ..MarketParams::default()
    });
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];

    let err = h.send_limit(&h.limit_sell(2_000_000, 51, utxos)).unwrap_err();
    assert_eq!(err, TidegateError::RateStepViolation);
    assert_eq!(err.code(), codes::ORDER_PARAMETER);
    h.assert_no_side_effects();
}

#[test]
fn zero_rate_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];

    let err = h.send_limit(&h.limit_sell(2_000_000, 0, utxos)).unwrap_err();
    assert_eq!(err, TidegateError::ZeroRate);
    h.assert_no_side_effects();
}

#[test]
fn unknown_time_in_force_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    let mut payload = h.limit_sell(2_000_000, 50, utxos);
    payload.tif = 9;

    let err = h.send_limit(&payload).unwrap_err();
    assert_eq!(err, TidegateError::UnknownTimeInForce);
    h.assert_no_side_effects();
}

#[test]
fn wrong_order_type_tag_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    let mut payload = h.limit_sell(2_000_000, 50, utxos);
    payload.prefix.order_type = MARKET_ORDER_NUM;

    let err = h.send_limit(&payload).unwrap_err();
    assert_eq!(err, TidegateError::WrongOrderType("limit"));
    h.assert_no_side_effects();
}

#[test]
fn invalid_side_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    let mut payload = h.limit_sell(2_000_000, 50, utxos);
    payload.trade.side = 3;

    let err = h.send_limit(&payload).unwrap_err();
    assert_eq!(err, TidegateError::InvalidSide(3));
    h.assert_no_side_effects();
}

#[test]
fn zero_quantity_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];

    let err = h.send_limit(&h.limit_sell(0, 50, utxos)).unwrap_err();
    assert_eq!(err, TidegateError::ZeroQuantity);
    h.assert_no_side_effects();
}

#[test]
fn lot_misalignment_is_rejected_for_sells() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];

    let err = h
        .send_market(&h.market_order(SELL_ORDER_NUM, 1_500_000, utxos))
        .unwrap_err();
    assert_eq!(err, TidegateError::LotSizeViolation);
    h.assert_no_side_effects();
}

#[test]
fn bad_receiving_address_is_rejected() {
    let h = harness(MarketParams::default());
    // A limit sell receives the quote asset.
    h.quote_backend.reject_address("receiving-address");
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, utxos)).unwrap_err();
    assert_eq!(err, TidegateError::BadAddress);
    h.assert_no_side_effects();
}

#[test]
fn malformed_payload_is_rejected() {
    let h = harness(MarketParams::default());
    let msg = Message::request(MSG_ID, LIMIT_ROUTE, &"not an order").unwrap();

    let err = h.auth.dispatch(LIMIT_ROUTE, h.user, &msg).unwrap_err();
    assert_eq!(err, TidegateError::PayloadDecode("limit"));
    assert_eq!(err.code(), codes::RPC_PARSE);
    h.assert_no_side_effects();
}

// =============================================================================
// Identity and signature rejections
// =============================================================================

#[test]
fn account_mismatch_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    let mut payload = h.limit_sell(2_000_000, 50, utxos);
    payload.prefix.account_id = HexBytes(vec![0xee; 32]);

    let err = h.send_limit(&payload).unwrap_err();
    assert_eq!(err, TidegateError::AccountMismatch);
    h.assert_no_side_effects();
}

#[test]
fn bad_client_signature_is_rejected() {
    let h = harness(MarketParams::default());
    h.auth.reject_sigs(true);
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, utxos)).unwrap_err();
    assert!(matches!(err, TidegateError::Signature(_)));
    assert_eq!(err.code(), codes::SIGNATURE);
    h.assert_no_side_effects();
}

#[test]
fn missing_utxo_signature_is_rejected() {
    let h = harness(MarketParams::default());
    let mut utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    utxos[0].sigs.clear();

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, utxos)).unwrap_err();
    assert_eq!(err, TidegateError::MissingUtxoSig(0));
    assert_eq!(err.code(), codes::SIGNATURE);
    h.assert_no_side_effects();
}

#[test]
fn pubkey_signature_count_mismatch_is_rejected() {
    let h = harness(MarketParams::default());
    let mut utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    utxos[0].pubkeys.push(HexBytes(vec![4u8; 33]));

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, utxos)).unwrap_err();
    assert_eq!(
        err,
        TidegateError::PubkeySigCountMismatch {
            pubkeys: 2,
            sigs: 1,
            index: 0
        }
    );
    h.assert_no_side_effects();
}

// =============================================================================
// Market resolution and clock rejections
// =============================================================================

#[test]
fn unknown_asset_is_an_unknown_market() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    let mut payload = h.limit_sell(2_000_000, 50, utxos);
    payload.prefix.quote = AssetId(99);

    let err = h.send_limit(&payload).unwrap_err();
    assert_eq!(err, TidegateError::UnknownAsset(99));
    assert_eq!(err.code(), codes::UNKNOWN_MARKET);
    h.assert_no_side_effects();
}

#[test]
fn clock_skew_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    let mut payload = h.limit_sell(2_000_000, 50, utxos);
    payload.prefix.client_time = now_secs() - 11;

    let err = h.send_limit(&payload).unwrap_err();
    assert!(matches!(err, TidegateError::ClockRange { .. }));
    assert_eq!(err.code(), codes::CLOCK_RANGE);
    h.assert_no_side_effects();
}

#[test]
fn preset_server_time_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    let mut payload = h.limit_sell(2_000_000, 50, utxos);
    payload.prefix.server_time = 12345;

    let err = h.send_limit(&payload).unwrap_err();
    assert_eq!(err, TidegateError::NonZeroServerTime);
    h.assert_no_side_effects();
}

// =============================================================================
// Funding rejections
// =============================================================================

#[test]
fn empty_utxo_set_is_rejected() {
    let h = harness(MarketParams::default());

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, vec![])).unwrap_err();
    assert_eq!(err, TidegateError::NoUtxos);
    assert_eq!(err.code(), codes::FUNDING);
    h.assert_no_side_effects();
}

#[test]
fn locked_outpoint_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5)];
    h.tunnel.lock_outpoint(&utxos[0].txid_hex(), 0);

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, utxos)).unwrap_err();
    let TidegateError::OutpointLocked(outpoint) = &err else {
        panic!("expected a locked-outpoint error, got {err:?}")
    };
    assert_eq!(outpoint, &format!("{}:0", "aa".repeat(32)));
    assert_eq!(err.code(), codes::FUNDING);
    h.assert_no_side_effects();
}

#[test]
fn unresolvable_utxo_is_rejected() {
    let h = harness(MarketParams::default());
    // A wire entry with no backing UTXO in the backend table.
    let utxos = vec![UtxoEntry {
        txid: HexBytes(vec![0xaa; 32]),
        vout: 0,
        pubkeys: vec![HexBytes(vec![2u8; 33])],
        sigs: vec![HexBytes(vec![3u8; 64])],
        redeem: HexBytes::default(),
    }];

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, utxos)).unwrap_err();
    assert!(matches!(err, TidegateError::UtxoUnavailable(_)));
    h.assert_no_side_effects();
}

#[test]
fn shallow_utxo_is_rejected() {
    let h = harness(MarketParams::default());
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 1)];

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, utxos)).unwrap_err();
    assert_eq!(
        err,
        TidegateError::InsufficientConfs {
            outpoint: format!("{}:0", "aa".repeat(32)),
            required: 2,
            have: 1
        }
    );
    h.assert_no_side_effects();
}

#[test]
fn confirmation_lookup_failure_is_rejected() {
    let h = harness(MarketParams::default());
    let entry = fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5);
    h.base_backend.add_utxo(
        &entry.txid_hex(),
        0,
        MockUtxo {
            value: 4_000_000,
            spend_size: 150,
            confs_err: true,
            ..MockUtxo::default()
        },
    );

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, vec![entry])).unwrap_err();
    assert!(matches!(err, TidegateError::ConfirmationsUnavailable { .. }));
    assert_eq!(err.code(), codes::FUNDING);
    h.assert_no_side_effects();
}

#[test]
fn utxo_authorization_failure_is_rejected() {
    let h = harness(MarketParams::default());
    let entry = fund(&h.base_backend, 0xaa, 0, 4_000_000, 150, 5);
    h.base_backend.add_utxo(
        &entry.txid_hex(),
        0,
        MockUtxo {
            value: 4_000_000,
            spend_size: 150,
            confs: 5,
            auth_ok: false,
            ..MockUtxo::default()
        },
    );

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, vec![entry])).unwrap_err();
    assert!(matches!(err, TidegateError::UtxoAuth(_)));
    assert_eq!(err.code(), codes::UTXO_AUTH);
    h.assert_no_side_effects();
}

#[test]
fn underfunded_limit_sell_is_rejected() {
    let h = harness(MarketParams::default());
    // One input: fees are floor(2e6 * 2e-3) + 150 * 10 = 4000 + 1500.
    let utxos = vec![fund(&h.base_backend, 0xaa, 0, 1_000_000, 150, 5)];

    let err = h.send_limit(&h.limit_sell(2_000_000, 50, utxos)).unwrap_err();
    assert_eq!(
        err,
        TidegateError::InsufficientFunds {
            needed: 2_005_500,
            have: 1_000_000
        }
    );
    h.assert_no_side_effects();
}

#[test]
fn market_buy_below_buffer_is_rejected() {
    // req = quote_to_base(1e4, 1e3) = 0, floor = quote_to_base(1e4,
    // floor(1e8 * 1.25)) = 12_500.
    let h = harness(MarketParams {
        base_lot: 100_000_000,
        ..MarketParams::default()
    });
    let utxos = vec![fund(&h.quote_backend, 0xcc, 0, 20_000_000, 150, 5)];

    let err = h
        .send_market(&h.market_order(BUY_ORDER_NUM, 1_000, utxos))
        .unwrap_err();
    assert_eq!(err, TidegateError::MarketBuyBuffer);
    assert_eq!(err.code(), codes::FUNDING);
    h.assert_no_side_effects();
}

// =============================================================================
// Cancel rejections
// =============================================================================

#[test]
fn cancel_of_unknown_target_is_rejected() {
    let h = harness(MarketParams::default());

    let err = h.send_cancel(&h.cancel(vec![0x11; 32])).unwrap_err();
    assert_eq!(err, TidegateError::UnknownCancelTarget);
    assert_eq!(err.code(), codes::ORDER_PARAMETER);
    h.assert_no_side_effects();
}

#[test]
fn cancel_with_malformed_target_is_rejected() {
    let h = harness(MarketParams::default());

    let err = h.send_cancel(&h.cancel(vec![0x11; 20])).unwrap_err();
    assert_eq!(err, TidegateError::BadTargetLength);
    h.assert_no_side_effects();
}

#[test]
fn cancel_clock_skew_is_rejected() {
    let h = harness(MarketParams::default());
    let target = OrderId([0x11; 32]);
    h.tunnel.allow_cancel(target);
    let mut payload = h.cancel(target.as_bytes().to_vec());
    payload.prefix.client_time = now_secs() + 30;

    let err = h.send_cancel(&payload).unwrap_err();
    assert!(matches!(err, TidegateError::ClockRange { .. }));
    h.assert_no_side_effects();
}
