//! Four-way view of a market's two assets.

use std::sync::Arc;

use tidegate_types::AssetInfo;

/// The two assets of a market, addressable by all four of their roles
/// for one side of a trade. Producing every role together removes any
/// chance of mixing up "base" and "funding" at a use site.
#[derive(Debug, Clone)]
pub struct AssetSet {
    /// The asset the client pays with.
    pub funding: Arc<AssetInfo>,
    /// The asset the client receives.
    pub receiving: Arc<AssetInfo>,
    pub base: Arc<AssetInfo>,
    pub quote: Arc<AssetInfo>,
}

impl AssetSet {
    /// Derive the four roles from the side bit: a sell funds with base
    /// and receives quote, a buy the reverse.
    #[must_use]
    pub fn new(base: Arc<AssetInfo>, quote: Arc<AssetInfo>, sell: bool) -> Self {
        assert!(base.id != quote.id);
        let (funding, receiving) = if sell {
            (Arc::clone(&base), Arc::clone(&quote))
        } else {
            (Arc::clone(&quote), Arc::clone(&base))
        };
        Self {
            funding,
            receiving,
            base,
            quote,
        }
    }
}
