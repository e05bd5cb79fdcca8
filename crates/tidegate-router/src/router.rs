//! The order router: authenticated admission for the `limit`, `market`,
//! and `cancel` routes.
//!
//! Each handler runs one short-lived, in-memory transaction: decode,
//! authenticate, resolve the market, validate, price, submit to the
//! epoch queue, respond. A failure at any step yields a single error
//! reply and no tunnel side effect. The router holds only read-only
//! state populated at construction; all mutability lives behind the
//! collaborator traits.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use tidegate_types::constants::{
    BUY_ORDER_NUM, CANCEL_ORDER_NUM, CANCEL_ROUTE, IMMEDIATE_TIF_NUM, LIMIT_ORDER_NUM,
    LIMIT_ROUTE, MARKET_ORDER_NUM, MARKET_ROUTE, SELL_ORDER_NUM, STANDING_TIF_NUM,
};
use tidegate_types::{
    market_name, AccountId, AssetId, AssetInfo, CancelOrder, CancelPayload, ConfigError,
    HexBytes, LimitOrder, LimitPayload, MarketOrder, MarketPayload, Message, Order, OrderId,
    OrderRequest, OrderType, Prefix, PrefixFields, Signable, TidegateError, TimeInForce,
    TradeFields,
};

use crate::auth::AuthManager;
use crate::coins::AssetSet;
use crate::funds::{base_to_quote, quote_to_base, required_funds};
use crate::tunnel::{MarketTunnel, OrderRecord};
use crate::validate::check_times;

/// One market to serve: its asset pair and the tunnel that owns its
/// epoch queue.
pub struct MarketDef {
    pub base: AssetId,
    pub quote: AssetId,
    pub tunnel: Arc<dyn MarketTunnel>,
}

/// Configuration for an [`OrderRouter`].
pub struct RouterConfig {
    pub auth: Arc<dyn AuthManager>,
    pub assets: HashMap<AssetId, Arc<AssetInfo>>,
    pub markets: Vec<MarketDef>,
    /// Multiplier (>1) of the base lot size a market buy must fund at
    /// the mid-gap rate.
    pub market_buy_buffer: f64,
}

/// Handles the `limit`, `market`, and `cancel` routes.
pub struct OrderRouter {
    pub(crate) auth: Arc<dyn AuthManager>,
    pub(crate) assets: HashMap<AssetId, Arc<AssetInfo>>,
    pub(crate) tunnels: HashMap<String, Arc<dyn MarketTunnel>>,
    pub(crate) mb_buffer: f64,
}

impl std::fmt::Debug for OrderRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderRouter")
            .field("assets", &self.assets)
            .field("tunnels", &self.tunnels.keys().collect::<Vec<_>>())
            .field("mb_buffer", &self.mb_buffer)
            .finish()
    }
}

impl OrderRouter {
    /// Validate the configuration, build the router, and register its
    /// handlers with the auth manager.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if any market names an unregistered
    /// asset, pairs an asset with itself, or collides with another
    /// market's canonical name. These indicate corrupted server
    /// configuration; no route is registered on failure.
    pub fn new(cfg: RouterConfig) -> Result<Arc<Self>, ConfigError> {
        let mut tunnels: HashMap<String, Arc<dyn MarketTunnel>> =
            HashMap::with_capacity(cfg.markets.len());
        for market in &cfg.markets {
            if market.base == market.quote {
                return Err(ConfigError::SameAssets(market.base.0));
            }
            let missing = |id: AssetId| ConfigError::UnknownAsset {
                base: market.base.0,
                quote: market.quote.0,
                missing: id.0,
            };
            let base = cfg.assets.get(&market.base).ok_or_else(|| missing(market.base))?;
            let quote = cfg
                .assets
                .get(&market.quote)
                .ok_or_else(|| missing(market.quote))?;
            let name = market_name(&base.symbol, &quote.symbol);
            if tunnels.insert(name.clone(), Arc::clone(&market.tunnel)).is_some() {
                return Err(ConfigError::DuplicateMarket(name));
            }
        }

        let router = Arc::new(Self {
            auth: cfg.auth,
            assets: cfg.assets,
            tunnels,
            mb_buffer: cfg.market_buy_buffer,
        });

        let r = Arc::clone(&router);
        router
            .auth
            .route(LIMIT_ROUTE, Box::new(move |user, msg| r.handle_limit(user, msg)));
        let r = Arc::clone(&router);
        router
            .auth
            .route(MARKET_ROUTE, Box::new(move |user, msg| r.handle_market(user, msg)));
        let r = Arc::clone(&router);
        router
            .auth
            .route(CANCEL_ROUTE, Box::new(move |user, msg| r.handle_cancel(user, msg)));

        info!(
            markets = router.tunnels.len(),
            assets = router.assets.len(),
            "order router registered"
        );
        Ok(router)
    }

    /// Handler for the `limit` route: decode a [`LimitPayload`],
    /// validate it, construct a limit order, and submit it to the epoch
    /// queue.
    pub fn handle_limit(&self, user: AccountId, msg: &Message) -> Result<(), TidegateError> {
        let limit: LimitPayload = msg
            .parse_payload()
            .map_err(|_| TidegateError::PayloadDecode("limit"))?;

        self.verify_account(user, &limit.prefix.account_id, &limit)?;

        let (tunnel, coins, sell) = self.extract_market_details(&limit.prefix, &limit.trade)?;

        if limit.prefix.order_type != LIMIT_ORDER_NUM {
            return Err(TidegateError::WrongOrderType("limit"));
        }

        let funding =
            self.check_prefix_trade(user, tunnel.as_ref(), &coins, &limit.prefix, &limit.trade, true)?;

        // The rate must be non-zero and obey the rate step interval.
        if limit.rate == 0 {
            return Err(TidegateError::ZeroRate);
        }
        if limit.rate % coins.quote.rate_step != 0 {
            return Err(TidegateError::RateStepViolation);
        }

        // A sell swaps the base quantity itself; a buy swaps its
        // quote-asset equivalent at the limit rate.
        let swap_val = if sell {
            limit.trade.quantity
        } else {
            base_to_quote(limit.rate, limit.trade.quantity)
        };
        let req_val = required_funds(swap_val, funding.spend_size, &coins.funding);
        if funding.value_sum < req_val {
            return Err(TidegateError::InsufficientFunds {
                needed: req_val,
                have: funding.value_sum,
            });
        }

        if limit.tif != STANDING_TIF_NUM && limit.tif != IMMEDIATE_TIF_NUM {
            return Err(TidegateError::UnknownTimeInForce);
        }

        let server_time = Utc::now().timestamp() as u64;
        let order = Order::Limit(LimitOrder {
            market: MarketOrder {
                prefix: Prefix {
                    account_id: user,
                    base_asset: limit.prefix.base,
                    quote_asset: limit.prefix.quote,
                    order_type: OrderType::Limit,
                    client_time: limit.prefix.client_time,
                    server_time,
                },
                utxos: funding.outpoints,
                sell,
                quantity: limit.trade.quantity,
                address: limit.trade.address.clone(),
            },
            rate: limit.rate,
            force: TimeInForce::Standing,
        });

        let record = OrderRecord::new(order, OrderRequest::Limit(limit), msg.id);
        tunnel.submit_order_async(&record);
        self.respond_order(record);
        Ok(())
    }

    /// Handler for the `market` route: decode a [`MarketPayload`],
    /// validate it, construct a market order, and submit it to the
    /// epoch queue.
    pub fn handle_market(&self, user: AccountId, msg: &Message) -> Result<(), TidegateError> {
        let market: MarketPayload = msg
            .parse_payload()
            .map_err(|_| TidegateError::PayloadDecode("market"))?;

        self.verify_account(user, &market.prefix.account_id, &market)?;

        let (tunnel, coins, sell) = self.extract_market_details(&market.prefix, &market.trade)?;

        if market.prefix.order_type != MARKET_ORDER_NUM {
            return Err(TidegateError::WrongOrderType("market"));
        }

        // Market buys are denominated in the quote asset, so the base
        // lot gate only applies to sells.
        let funding =
            self.check_prefix_trade(user, tunnel.as_ref(), &coins, &market.prefix, &market.trade, sell)?;

        let req_val = if sell {
            required_funds(market.trade.quantity, funding.spend_size, &coins.funding)
        } else {
            // Mid-gap is a stale estimate: require funding for at least
            // one buffered lot so slippage cannot leave the buy below a
            // single matchable lot.
            let mid_gap = tunnel.mid_gap();
            let req_val = quote_to_base(mid_gap, market.trade.quantity);
            let lot_with_buffer = (coins.base.lot_size as f64 * self.mb_buffer) as u64;
            let min_req = quote_to_base(mid_gap, lot_with_buffer);
            if req_val < min_req {
                return Err(TidegateError::MarketBuyBuffer);
            }
            req_val
        };
        if funding.value_sum < req_val {
            return Err(TidegateError::InsufficientFunds {
                needed: req_val,
                have: funding.value_sum,
            });
        }

        let server_time = Utc::now().timestamp() as u64;
        let order = Order::Market(MarketOrder {
            prefix: Prefix {
                account_id: user,
                base_asset: market.prefix.base,
                quote_asset: market.prefix.quote,
                order_type: OrderType::Market,
                client_time: market.prefix.client_time,
                server_time,
            },
            utxos: funding.outpoints,
            sell,
            quantity: market.trade.quantity,
            address: market.trade.address.clone(),
        });

        let record = OrderRecord::new(order, OrderRequest::Market(market), msg.id);
        tunnel.submit_order_async(&record);
        self.respond_order(record);
        Ok(())
    }

    /// Handler for the `cancel` route: decode a [`CancelPayload`],
    /// validate it, construct a cancel order, and submit it to the
    /// epoch queue.
    pub fn handle_cancel(&self, user: AccountId, msg: &Message) -> Result<(), TidegateError> {
        let cancel: CancelPayload = msg
            .parse_payload()
            .map_err(|_| TidegateError::PayloadDecode("cancel"))?;

        self.verify_account(user, &cancel.prefix.account_id, &cancel)?;

        let tunnel = self.extract_market(&cancel.prefix)?;

        let target = OrderId::from_slice(cancel.target_order_id.as_slice())
            .ok_or(TidegateError::BadTargetLength)?;

        if !tunnel.cancelable(target) {
            return Err(TidegateError::UnknownCancelTarget);
        }

        if cancel.prefix.order_type != CANCEL_ORDER_NUM {
            return Err(TidegateError::WrongOrderType("cancel"));
        }

        check_times(&cancel.prefix)?;

        let server_time = Utc::now().timestamp() as u64;
        let order = Order::Cancel(CancelOrder {
            prefix: Prefix {
                account_id: user,
                base_asset: cancel.prefix.base,
                quote_asset: cancel.prefix.quote,
                order_type: OrderType::Market,
                client_time: cancel.prefix.client_time,
                server_time,
            },
            target_order_id: target,
        });

        let record = OrderRecord::new(order, OrderRequest::Cancel(cancel), msg.id);
        tunnel.submit_order_async(&record);
        self.respond_order(record);
        Ok(())
    }

    /// Check that the payload's account is the authenticated submitter
    /// and that the submitter signed the payload.
    fn verify_account(
        &self,
        user: AccountId,
        msg_acct: &HexBytes,
        signable: &impl Signable,
    ) -> Result<(), TidegateError> {
        if msg_acct.as_slice() != user.as_bytes() {
            return Err(TidegateError::AccountMismatch);
        }
        let sig_msg = signable.serialize();
        self.auth
            .auth(user, &sig_msg, signable.sig_bytes())
            .map_err(|err| TidegateError::Signature(err.to_string()))
    }

    /// Resolve the canonical market name for the prefix's asset pair.
    fn market_name_for(&self, base: AssetId, quote: AssetId) -> Result<String, TidegateError> {
        let base_asset = self
            .assets
            .get(&base)
            .ok_or(TidegateError::UnknownAsset(base.0))?;
        let quote_asset = self
            .assets
            .get(&quote)
            .ok_or(TidegateError::UnknownAsset(quote.0))?;
        Ok(market_name(&base_asset.symbol, &quote_asset.symbol))
    }

    /// Find the tunnel serving the prefix's market.
    fn extract_market(
        &self,
        prefix: &PrefixFields,
    ) -> Result<&Arc<dyn MarketTunnel>, TidegateError> {
        let name = self.market_name_for(prefix.base, prefix.quote)?;
        self.tunnels
            .get(&name)
            .ok_or(TidegateError::UnknownMarket(name))
    }

    /// Find the tunnel, side, and asset set for a trade.
    fn extract_market_details(
        &self,
        prefix: &PrefixFields,
        trade: &TradeFields,
    ) -> Result<(&Arc<dyn MarketTunnel>, AssetSet, bool), TidegateError> {
        let tunnel = self.extract_market(prefix)?;

        let sell = match trade.side {
            BUY_ORDER_NUM => false,
            SELL_ORDER_NUM => true,
            other => return Err(TidegateError::InvalidSide(other)),
        };

        // Boot validation guarantees both assets of a registered market
        // resolve; a miss here is configuration corruption.
        let quote = self
            .assets
            .get(&prefix.quote)
            .expect("missing quote asset for known market should be impossible");
        let base = self
            .assets
            .get(&prefix.base)
            .expect("missing base asset for known market should be impossible");

        Ok((
            tunnel,
            AssetSet::new(Arc::clone(base), Arc::clone(quote), sell),
            sell,
        ))
    }
}
