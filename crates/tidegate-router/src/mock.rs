//! Mock collaborators for tests.
//!
//! Every collaborator the router consumes has a double here that
//! records its calls and returns configurable answers. **Never use in
//! production.**

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tidegate_types::{
    AccountId, AssetBackend, BackendError, Message, OrderId, Signable, UtxoHandle,
};

use crate::auth::{AuthError, AuthManager, RouteHandler};
use crate::tunnel::{MarketTunnel, OrderRecord};

// ---------------------------------------------------------------------------
// Asset backend
// ---------------------------------------------------------------------------

/// A scripted UTXO answer.
#[derive(Debug, Clone)]
pub struct MockUtxo {
    pub value: u64,
    pub spend_size: u32,
    pub confs: i64,
    /// Fail the confirmations lookup instead of answering.
    pub confs_err: bool,
    /// Whether `auth` accepts the ownership proof.
    pub auth_ok: bool,
}

impl Default for MockUtxo {
    fn default() -> Self {
        Self {
            value: 0,
            spend_size: 0,
            confs: 0,
            confs_err: false,
            auth_ok: true,
        }
    }
}

impl UtxoHandle for MockUtxo {
    fn confirmations(&self) -> Result<i64, BackendError> {
        if self.confs_err {
            return Err(BackendError::Node("confirmations unavailable".to_string()));
        }
        Ok(self.confs)
    }

    fn value(&self) -> u64 {
        self.value
    }

    fn spend_size(&self) -> u32 {
        self.spend_size
    }

    fn auth(&self, _pubkeys: &[Vec<u8>], _sigs: &[Vec<u8>], _msg: &[u8]) -> Result<(), BackendError> {
        if self.auth_ok {
            Ok(())
        } else {
            Err(BackendError::Auth("script rejected".to_string()))
        }
    }
}

/// Asset backend double: a table of scripted UTXOs plus an address
/// denylist. Unlisted addresses check out; unlisted outpoints do not
/// resolve.
#[derive(Debug, Default)]
pub struct MockBackend {
    utxos: Mutex<HashMap<(String, u32), MockUtxo>>,
    bad_addresses: Mutex<HashSet<String>>,
}

impl MockBackend {
    pub fn add_utxo(&self, txid: &str, vout: u32, utxo: MockUtxo) {
        self.utxos
            .lock()
            .unwrap()
            .insert((txid.to_string(), vout), utxo);
    }

    pub fn reject_address(&self, address: &str) {
        self.bad_addresses
            .lock()
            .unwrap()
            .insert(address.to_string());
    }
}

impl AssetBackend for MockBackend {
    fn check_address(&self, address: &str) -> bool {
        !self.bad_addresses.lock().unwrap().contains(address)
    }

    fn utxo(
        &self,
        txid: &str,
        vout: u32,
        _redeem: &[u8],
    ) -> Result<Box<dyn UtxoHandle>, BackendError> {
        self.utxos
            .lock()
            .unwrap()
            .get(&(txid.to_string(), vout))
            .cloned()
            .map(|utxo| Box::new(utxo) as Box<dyn UtxoHandle>)
            .ok_or(BackendError::CoinNotFound)
    }
}

// ---------------------------------------------------------------------------
// Market tunnel
// ---------------------------------------------------------------------------

/// Market tunnel double: records submissions, answers lock/cancel/
/// monitor queries from in-memory sets.
#[derive(Default)]
pub struct MockTunnel {
    mid_gap: u64,
    submitted: Mutex<Vec<OrderRecord>>,
    locked: Mutex<HashSet<(String, u32)>>,
    cancelable: Mutex<HashSet<OrderId>>,
    monitored: Mutex<HashSet<(AccountId, String)>>,
}

impl MockTunnel {
    #[must_use]
    pub fn new(mid_gap: u64) -> Self {
        Self {
            mid_gap,
            ..Self::default()
        }
    }

    pub fn lock_outpoint(&self, txid: &str, vout: u32) {
        self.locked.lock().unwrap().insert((txid.to_string(), vout));
    }

    pub fn allow_cancel(&self, order_id: OrderId) {
        self.cancelable.lock().unwrap().insert(order_id);
    }

    pub fn monitor_tx(&self, user: AccountId, txid: &str) {
        self.monitored
            .lock()
            .unwrap()
            .insert((user, txid.to_string()));
    }

    #[must_use]
    pub fn submitted_count(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    #[must_use]
    pub fn last_submitted(&self) -> Option<OrderRecord> {
        self.submitted.lock().unwrap().last().cloned()
    }
}

impl MarketTunnel for MockTunnel {
    fn submit_order_async(&self, record: &OrderRecord) {
        self.submitted.lock().unwrap().push(record.clone());
    }

    fn mid_gap(&self) -> u64 {
        self.mid_gap
    }

    fn outpoint_locked(&self, txid: &str, vout: u32) -> bool {
        self.locked
            .lock()
            .unwrap()
            .contains(&(txid.to_string(), vout))
    }

    fn cancelable(&self, order_id: OrderId) -> bool {
        self.cancelable.lock().unwrap().contains(&order_id)
    }

    fn tx_monitored(&self, user: AccountId, txid: &str) -> bool {
        self.monitored
            .lock()
            .unwrap()
            .contains(&(user, txid.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Auth manager
// ---------------------------------------------------------------------------

/// Auth manager double: stores registered handlers for test dispatch,
/// verifies every signature unless told otherwise, countersigns with a
/// fixed byte pattern, and records outbound sends.
#[derive(Default)]
pub struct MockAuthManager {
    routes: Mutex<HashMap<&'static str, RouteHandler>>,
    reject_sigs: Mutex<bool>,
    sent: Mutex<Vec<(AccountId, Message)>>,
}

/// The signature `MockAuthManager::sign` stamps on every signable.
pub const MOCK_SERVER_SIG: [u8; 64] = [0x5a; 64];

impl MockAuthManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `auth` fail every verification.
    pub fn reject_sigs(&self, reject: bool) {
        *self.reject_sigs.lock().unwrap() = reject;
    }

    /// Invoke the handler registered for `route`, as the dispatch layer
    /// would.
    ///
    /// # Panics
    /// Panics if no handler is registered for the route.
    pub fn dispatch(
        &self,
        route: &str,
        user: AccountId,
        msg: &Message,
    ) -> Result<(), tidegate_types::TidegateError> {
        let routes = self.routes.lock().unwrap();
        let handler = routes
            .get(route)
            .unwrap_or_else(|| panic!("no handler registered for route {route}"));
        handler(user, msg)
    }

    #[must_use]
    pub fn registered_routes(&self) -> Vec<&'static str> {
        let mut routes: Vec<_> = self.routes.lock().unwrap().keys().copied().collect();
        routes.sort_unstable();
        routes
    }

    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    #[must_use]
    pub fn last_sent(&self) -> Option<(AccountId, Message)> {
        self.sent.lock().unwrap().last().cloned()
    }
}

impl AuthManager for MockAuthManager {
    fn route(&self, route: &'static str, handler: RouteHandler) {
        self.routes.lock().unwrap().insert(route, handler);
    }

    fn auth(&self, _user: AccountId, _msg: &[u8], _sig: &[u8]) -> Result<(), AuthError> {
        if *self.reject_sigs.lock().unwrap() {
            return Err(AuthError::BadSignature);
        }
        Ok(())
    }

    fn sign(&self, signable: &mut dyn Signable) {
        signable.set_sig(MOCK_SERVER_SIG.to_vec());
    }

    fn send(&self, user: AccountId, msg: Message) {
        self.sent.lock().unwrap().push((user, msg));
    }
}
