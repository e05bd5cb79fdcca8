//! Shared prefix and trade validation.
//!
//! Every check here is a hard gate: the first failure rejects the
//! request, and the check order is part of the observable contract
//! because each step maps to a distinct wire error the client switches
//! on.

use chrono::Utc;

use tidegate_types::constants::MAX_CLOCK_OFFSET_S;
use tidegate_types::{
    AccountId, HexBytes, Outpoint, PrefixFields, TidegateError, TradeFields,
};

use crate::coins::AssetSet;
use crate::router::OrderRouter;
use crate::tunnel::MarketTunnel;

/// Funding facts accumulated over an accepted trade's UTXO set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeFunding {
    /// Summed value of the accepted UTXOs, in funding-asset atoms.
    pub value_sum: u64,
    /// Summed serialized size of the inputs that will spend them.
    pub spend_size: u32,
    /// The accepted outpoints, in submission order.
    pub outpoints: Vec<Outpoint>,
}

/// Validate the timestamps in an order prefix: the client clock must be
/// within the allowed window, and the server timestamp must be unset.
pub(crate) fn check_times(prefix: &PrefixFields) -> Result<(), TidegateError> {
    check_times_at(prefix, Utc::now().timestamp())
}

fn check_times_at(prefix: &PrefixFields, now: i64) -> Result<(), TidegateError> {
    let mut offset = now - prefix.client_time as i64;
    if offset < 0 {
        offset = -offset;
    }
    if offset >= MAX_CLOCK_OFFSET_S {
        return Err(TidegateError::ClockRange {
            offset,
            max: MAX_CLOCK_OFFSET_S,
        });
    }
    if prefix.server_time != 0 {
        return Err(TidegateError::NonZeroServerTime);
    }
    Ok(())
}

fn sig_blobs(blobs: &[HexBytes]) -> Vec<Vec<u8>> {
    blobs.iter().map(|b| b.0.clone()).collect()
}

impl OrderRouter {
    /// Validate the prefix and trade portions of an order and resolve
    /// its funding.
    ///
    /// Checks, in contract order: clock window, receiving address,
    /// quantity (with the lot gate when `check_lot` is set), then per
    /// UTXO: ownership signature presence, pubkey/signature pairing,
    /// non-lock, backend resolution, confirmation depth (waived for
    /// monitored change), and script authorization.
    pub(crate) fn check_prefix_trade(
        &self,
        user: AccountId,
        tunnel: &dyn MarketTunnel,
        coins: &AssetSet,
        prefix: &PrefixFields,
        trade: &TradeFields,
        check_lot: bool,
    ) -> Result<TradeFunding, TidegateError> {
        check_times(prefix)?;

        if !coins.receiving.backend.check_address(&trade.address) {
            return Err(TidegateError::BadAddress);
        }

        if trade.quantity == 0 {
            return Err(TidegateError::ZeroQuantity);
        }
        if check_lot && trade.quantity % coins.base.lot_size != 0 {
            return Err(TidegateError::LotSizeViolation);
        }

        if trade.utxos.is_empty() {
            return Err(TidegateError::NoUtxos);
        }

        let mut funding = TradeFunding::default();
        for (i, utxo) in trade.utxos.iter().enumerate() {
            let sig_count = utxo.sigs.len();
            if sig_count == 0 {
                return Err(TidegateError::MissingUtxoSig(i));
            }
            if utxo.pubkeys.len() != sig_count {
                return Err(TidegateError::PubkeySigCountMismatch {
                    pubkeys: utxo.pubkeys.len(),
                    sigs: sig_count,
                    index: i,
                });
            }

            let txid = utxo.txid_hex();
            let outpoint = format!("{txid}:{}", utxo.vout);
            if tunnel.outpoint_locked(&txid, utxo.vout) {
                return Err(TidegateError::OutpointLocked(outpoint));
            }

            let handle = coins
                .funding
                .backend
                .utxo(&txid, utxo.vout, utxo.redeem.as_slice())
                .map_err(|_| TidegateError::UtxoUnavailable(outpoint.clone()))?;

            let confs = handle.confirmations().map_err(|err| {
                TidegateError::ConfirmationsUnavailable {
                    outpoint: outpoint.clone(),
                    detail: err.to_string(),
                }
            })?;
            if confs < i64::from(coins.funding.fund_conf) && !tunnel.tx_monitored(user, &txid) {
                return Err(TidegateError::InsufficientConfs {
                    outpoint,
                    required: coins.funding.fund_conf,
                    have: confs,
                });
            }

            let sig_msg = utxo.serialize();
            handle
                .auth(&sig_blobs(&utxo.pubkeys), &sig_blobs(&utxo.sigs), &sig_msg)
                .map_err(|_| TidegateError::UtxoAuth(outpoint))?;

            funding.value_sum += handle.value();
            funding.spend_size += handle.spend_size();
            funding
                .outpoints
                .push(Outpoint::new(utxo.txid.0.clone(), utxo.vout));
        }
        Ok(funding)
    }
}
