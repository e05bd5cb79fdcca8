//! Client-visible error taxonomy for the Tidegate order router.
//!
//! All errors use the `TG_ERR_` prefix convention for easy grepping in
//! logs. The number after the prefix is the numeric wire code of the
//! error *kind*; clients switch on the code, not the message. Codes are
//! part of the wire contract and must never be renumbered:
//!
//! - 1: payload parse failure
//! - 2: order parameter violation
//! - 3: signature failure
//! - 4: unknown market
//! - 5: client clock out of range
//! - 6: funding failure
//! - 7: UTXO authorization refused

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Numeric wire codes, one per error kind.
pub mod codes {
    /// Payload decode failure.
    pub const RPC_PARSE: u16 = 1;
    /// Malformed or out-of-bounds order parameter.
    pub const ORDER_PARAMETER: u16 = 2;
    /// Signature verification failure.
    pub const SIGNATURE: u16 = 3;
    /// Asset pair does not name a registered market.
    pub const UNKNOWN_MARKET: u16 = 4;
    /// Client clock offset out of range.
    pub const CLOCK_RANGE: u16 = 5;
    /// Insufficient or unusable funding.
    pub const FUNDING: u16 = 6;
    /// Backend refused the UTXO pubkey/signature/script combination.
    pub const UTXO_AUTH: u16 = 7;
}

/// Central error enum for order admission. One variant per trigger, one
/// wire code per kind (see [`TidegateError::code`]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TidegateError {
    // =================================================================
    // Parse (1)
    // =================================================================
    /// The request payload did not decode as the route's message type.
    #[error("TG_ERR_1: error decoding '{0}' payload")]
    PayloadDecode(&'static str),

    // =================================================================
    // Order parameters (2)
    // =================================================================
    /// The payload's account ID is not the authenticated submitter.
    #[error("TG_ERR_2: account ID mismatch")]
    AccountMismatch,

    /// The payload's order-type tag does not match the route.
    #[error("TG_ERR_2: wrong order type set for {0} order")]
    WrongOrderType(&'static str),

    /// The side code is neither buy nor sell.
    #[error("TG_ERR_2: invalid side value {0}")]
    InvalidSide(u8),

    /// Zero-quantity orders are meaningless.
    #[error("TG_ERR_2: zero quantity not allowed")]
    ZeroQuantity,

    /// The quantity is not an integral multiple of the base asset's lot
    /// size.
    #[error("TG_ERR_2: order quantity not a multiple of lot size")]
    LotSizeViolation,

    /// Zero-rate limit orders are meaningless.
    #[error("TG_ERR_2: rate = 0 not allowed")]
    ZeroRate,

    /// The rate is not an integral multiple of the quote asset's rate
    /// step.
    #[error("TG_ERR_2: rate not a multiple of ratestep")]
    RateStepViolation,

    /// The time-in-force code is neither standing nor immediate.
    #[error("TG_ERR_2: unknown time-in-force")]
    UnknownTimeInForce,

    /// The client must leave the server timestamp unset.
    #[error("TG_ERR_2: non-zero server time not allowed")]
    NonZeroServerTime,

    /// The receiving address failed the receiving asset's backend check.
    #[error("TG_ERR_2: address doesn't check")]
    BadAddress,

    /// A UTXO entry supplied different numbers of pubkeys and signatures.
    #[error(
        "TG_ERR_2: pubkey count {pubkeys} not equal to signature count {sigs} for utxo {index}"
    )]
    PubkeySigCountMismatch {
        pubkeys: usize,
        sigs: usize,
        index: usize,
    },

    /// The cancel target is not a well-formed order ID.
    #[error("TG_ERR_2: invalid target ID format")]
    BadTargetLength,

    /// The cancel target is not a cancelable order on this market.
    #[error("TG_ERR_2: target order not known")]
    UnknownCancelTarget,

    // =================================================================
    // Signatures (3)
    // =================================================================
    /// The client's signature over the request did not verify.
    #[error("TG_ERR_3: signature error: {0}")]
    Signature(String),

    /// A UTXO entry carried no ownership signatures.
    #[error("TG_ERR_3: no signature for utxo {0}")]
    MissingUtxoSig(usize),

    // =================================================================
    // Markets (4)
    // =================================================================
    /// One of the pair's asset IDs is not registered, so no market name
    /// can be formed.
    #[error("TG_ERR_4: asset lookup error: unknown asset ID {0}")]
    UnknownAsset(u32),

    /// The pair names a market this server does not run.
    #[error("TG_ERR_4: unknown market {0}")]
    UnknownMarket(String),

    // =================================================================
    // Clock (5)
    // =================================================================
    /// The client's order timestamp is too far from server time.
    #[error(
        "TG_ERR_5: clock offset of {offset} seconds is larger than maximum allowed, {max} seconds"
    )]
    ClockRange { offset: i64, max: i64 },

    // =================================================================
    // Funding (6)
    // =================================================================
    /// Trade orders must name at least one funding UTXO.
    #[error("TG_ERR_6: order must specify utxos")]
    NoUtxos,

    /// The outpoint already funds another active order.
    #[error("TG_ERR_6: utxo {0} is locked")]
    OutpointLocked(String),

    /// The backend could not resolve the outpoint to an unspent output.
    #[error("TG_ERR_6: error retrieving utxo {0}")]
    UtxoUnavailable(String),

    /// The backend failed while counting confirmations.
    #[error("TG_ERR_6: utxo confirmations error for {outpoint}: {detail}")]
    ConfirmationsUnavailable { outpoint: String, detail: String },

    /// The UTXO is too shallow and not a monitored change output.
    #[error("TG_ERR_6: not enough confirmations for {outpoint}. require {required}, have {have}")]
    InsufficientConfs {
        outpoint: String,
        required: u32,
        have: i64,
    },

    /// The summed UTXO value does not cover the swap plus fees.
    #[error("TG_ERR_6: not enough funds. need at least {needed}, got {have}")]
    InsufficientFunds { needed: u64, have: u64 },

    /// A market buy must fund at least one buffered lot at the mid-gap
    /// rate.
    #[error("TG_ERR_6: order quantity does not satisfy market buy buffer")]
    MarketBuyBuffer,

    // =================================================================
    // UTXO authorization (7)
    // =================================================================
    /// The backend refused the pubkey/signature/script combination.
    #[error("TG_ERR_7: failed to authorize utxo {0}")]
    UtxoAuth(String),
}

impl TidegateError {
    /// The numeric wire code of this error's kind.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::PayloadDecode(_) => codes::RPC_PARSE,
            Self::AccountMismatch
            | Self::WrongOrderType(_)
            | Self::InvalidSide(_)
            | Self::ZeroQuantity
            | Self::LotSizeViolation
            | Self::ZeroRate
            | Self::RateStepViolation
            | Self::UnknownTimeInForce
            | Self::NonZeroServerTime
            | Self::BadAddress
            | Self::PubkeySigCountMismatch { .. }
            | Self::BadTargetLength
            | Self::UnknownCancelTarget => codes::ORDER_PARAMETER,
            Self::Signature(_) | Self::MissingUtxoSig(_) => codes::SIGNATURE,
            Self::UnknownAsset(_) | Self::UnknownMarket(_) => codes::UNKNOWN_MARKET,
            Self::ClockRange { .. } => codes::CLOCK_RANGE,
            Self::NoUtxos
            | Self::OutpointLocked(_)
            | Self::UtxoUnavailable(_)
            | Self::ConfirmationsUnavailable { .. }
            | Self::InsufficientConfs { .. }
            | Self::InsufficientFunds { .. }
            | Self::MarketBuyBuffer => codes::FUNDING,
            Self::UtxoAuth(_) => codes::UTXO_AUTH,
        }
    }

    /// Build the `{ code, message }` envelope the auth manager ships to
    /// the client as the reply to the failed request.
    #[must_use]
    pub fn to_wire(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Wire form of a rejected request: the numeric kind code plus a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: u16,
    pub message: String,
}

/// Crate-wide `Result` alias for client-visible failures.
pub type Result<T> = std::result::Result<T, TidegateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefix_matches_code() {
        let errors = vec![
            TidegateError::PayloadDecode("limit"),
            TidegateError::AccountMismatch,
            TidegateError::WrongOrderType("market"),
            TidegateError::InvalidSide(9),
            TidegateError::ZeroQuantity,
            TidegateError::LotSizeViolation,
            TidegateError::ZeroRate,
            TidegateError::RateStepViolation,
            TidegateError::UnknownTimeInForce,
            TidegateError::NonZeroServerTime,
            TidegateError::BadAddress,
            TidegateError::PubkeySigCountMismatch {
                pubkeys: 2,
                sigs: 1,
                index: 0,
            },
            TidegateError::BadTargetLength,
            TidegateError::UnknownCancelTarget,
            TidegateError::Signature("bad sig".into()),
            TidegateError::MissingUtxoSig(3),
            TidegateError::UnknownAsset(141),
            TidegateError::UnknownMarket("dcr_btc".into()),
            TidegateError::ClockRange { offset: 11, max: 10 },
            TidegateError::NoUtxos,
            TidegateError::OutpointLocked("ab:0".into()),
            TidegateError::UtxoUnavailable("ab:0".into()),
            TidegateError::ConfirmationsUnavailable {
                outpoint: "ab:0".into(),
                detail: "node down".into(),
            },
            TidegateError::InsufficientConfs {
                outpoint: "ab:0".into(),
                required: 2,
                have: 1,
            },
            TidegateError::InsufficientFunds {
                needed: 100,
                have: 50,
            },
            TidegateError::MarketBuyBuffer,
            TidegateError::UtxoAuth("ab:0".into()),
        ];
        for err in errors {
            let msg = err.to_string();
            let expected = format!("TG_ERR_{}:", err.code());
            assert!(
                msg.starts_with(&expected),
                "{msg:?} does not start with {expected:?}"
            );
        }
    }

    #[test]
    fn kind_codes_are_stable() {
        assert_eq!(codes::RPC_PARSE, 1);
        assert_eq!(codes::ORDER_PARAMETER, 2);
        assert_eq!(codes::SIGNATURE, 3);
        assert_eq!(codes::UNKNOWN_MARKET, 4);
        assert_eq!(codes::CLOCK_RANGE, 5);
        assert_eq!(codes::FUNDING, 6);
        assert_eq!(codes::UTXO_AUTH, 7);
    }

    #[test]
    fn envelope_carries_code_and_message() {
        let err = TidegateError::InsufficientFunds {
            needed: 2_007_000,
            have: 1_000_000,
        };
        let env = err.to_wire();
        assert_eq!(env.code, codes::FUNDING);
        assert!(env.message.contains("2007000"));
        assert!(env.message.contains("1000000"));
    }

    #[test]
    fn envelope_serde_roundtrip() {
        let env = TidegateError::BadAddress.to_wire();
        let json = serde_json::to_string(&env).unwrap();
        let back: ErrorEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(env, back);
    }
}
