//! Price comparison results produced by the normalizer.

use serde::{Deserialize, Serialize};

/// One store's offer for a product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceOffer {
    pub store: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Which result array of the search payload the offers came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum OfferSource {
    Shopping,
    VisualMatches,
    None,
}

/// Outcome of normalizing a single image lookup.
///
/// An empty `prices` list is a normal outcome and always comes with a `message`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparisonResult {
    pub product_name: String,
    pub prices: Vec<PriceOffer>,
    pub best_price: Option<PriceOffer>,
    pub message: Option<String>,
    pub source: OfferSource,
}

impl PriceComparisonResult {
    /// True when no usable price could be extracted.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
