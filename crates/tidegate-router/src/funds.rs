//! Funding arithmetic for swap admission.
//!
//! The fee formula and the rate conversions are part of the wire
//! contract: clients compute the same numbers to pick their funding
//! UTXOs, so every quantity here must reproduce bit-for-bit across
//! implementations.

use tidegate_types::constants::RATE_ENCODING_FACTOR;
use tidegate_types::AssetInfo;

/// Convert a base-asset quantity to quote-asset units at the given
/// encoded rate. Truncating integer math.
#[must_use]
pub fn base_to_quote(rate: u64, base_qty: u64) -> u64 {
    (u128::from(base_qty) * u128::from(RATE_ENCODING_FACTOR) / u128::from(rate)) as u64
}

/// Convert a quote-asset quantity to base-asset units at the given
/// encoded rate. Truncating integer math.
#[must_use]
pub fn quote_to_base(rate: u64, quote_qty: u64) -> u64 {
    (u128::from(quote_qty) * u128::from(rate) / u128::from(RATE_ENCODING_FACTOR)) as u64
}

/// The minimum funding value that fulfills a swap of `swap_val` atoms
/// plus transaction fees. `spend_size` is the summed serialized size of
/// the inputs that will spend the funding UTXOs.
///
/// The per-value fee rate is computed in floating point and the product
/// truncates toward zero; both are contractual.
#[must_use]
pub fn required_funds(swap_val: u64, spend_size: u32, funding: &AssetInfo) -> u64 {
    let r = f64::from(funding.swap_size) * funding.fee_rate as f64 / funding.lot_size as f64;
    let fee_base = (swap_val as f64 * r) as u64;
    let fee_input = u64::from(spend_size) * funding.fee_rate;
    swap_val + fee_base + fee_input
}
