//! Price lookup normalizer.
//!
//! Reduces a raw reverse-image search payload to at most five offers, cheapest
//! first. Shopping results are preferred; visual matches are the fallback.

use std::cmp::Ordering;

use serde_json::Value;

use crate::models::{OfferSource, PriceComparisonResult, PriceOffer};

/// Offers kept after sorting.
pub const MAX_OFFERS: usize = 5;

pub const DEFAULT_PRODUCT_NAME: &str = "Unidentified product";
pub const UNKNOWN_STORE: &str = "Unknown store";
pub const NO_PRICES_MESSAGE: &str =
    "No prices were found for this product. Try again with a clearer photo.";

/// Result of reading one candidate price field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedPrice {
    Parsed(f64),
    Unparseable,
}

impl ParsedPrice {
    fn or_else(self, next: impl FnOnce() -> ParsedPrice) -> ParsedPrice {
        match self {
            ParsedPrice::Parsed(_) => self,
            ParsedPrice::Unparseable => next(),
        }
    }

    /// The price, if it is usable as an offer.
    pub fn positive(self) -> Option<f64> {
        match self {
            ParsedPrice::Parsed(price) if price > 0.0 => Some(price),
            _ => None,
        }
    }

    fn from_number(value: Option<&Value>) -> ParsedPrice {
        match value.and_then(Value::as_f64) {
            Some(price) if price.is_finite() => ParsedPrice::Parsed(price),
            _ => ParsedPrice::Unparseable,
        }
    }

    fn from_text(value: Option<&Value>) -> ParsedPrice {
        value
            .and_then(Value::as_str)
            .map(parse_price_text)
            .unwrap_or(ParsedPrice::Unparseable)
    }
}

/// Parse a display price such as `"19,95 €"`, `"$1,299.00"` or `"1.299,99 €"`.
///
/// Everything except digits and separators is dropped. A lone comma is a
/// decimal comma; with both separators present the last one is the decimal point.
pub fn parse_price_text(text: &str) -> ParsedPrice {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    match normalized.parse::<f64>() {
        Ok(price) if price.is_finite() => ParsedPrice::Parsed(price),
        _ => ParsedPrice::Unparseable,
    }
}

/// Read an entry's price from the first candidate field that parses.
fn entry_price(entry: &Value) -> ParsedPrice {
    let price = entry.get("price");
    ParsedPrice::from_text(price.and_then(|p| p.get("value")))
        .or_else(|| ParsedPrice::from_number(price.and_then(|p| p.get("extracted_value"))))
        .or_else(|| ParsedPrice::from_text(price))
        .or_else(|| ParsedPrice::from_number(price))
        .or_else(|| ParsedPrice::from_number(entry.get("extracted_price")))
}

fn text_field<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

fn offers_from(results: Option<&Value>) -> Vec<PriceOffer> {
    let Some(entries) = results.and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let price = entry_price(entry).positive()?;
            Some(PriceOffer {
                store: text_field(entry, &["source", "title"])
                    .unwrap_or(UNKNOWN_STORE)
                    .to_string(),
                price,
                url: text_field(entry, &["link", "product_link"]).map(str::to_string),
            })
        })
        .collect()
}

/// Normalize a raw lookup payload into a price comparison.
pub fn normalize(raw: &Value) -> PriceComparisonResult {
    let product_name = raw
        .get("visual_matches")
        .and_then(Value::as_array)
        .and_then(|matches| matches.first())
        .and_then(|first| text_field(first, &["title"]))
        .unwrap_or(DEFAULT_PRODUCT_NAME)
        .to_string();

    let shopping = offers_from(raw.get("shopping_results"));
    let (source, mut offers) = if !shopping.is_empty() {
        (OfferSource::Shopping, shopping)
    } else {
        (
            OfferSource::VisualMatches,
            offers_from(raw.get("visual_matches")),
        )
    };

    if offers.is_empty() {
        return PriceComparisonResult {
            product_name,
            prices: Vec::new(),
            best_price: None,
            message: Some(NO_PRICES_MESSAGE.to_string()),
            source: OfferSource::None,
        };
    }

    offers.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));
    offers.truncate(MAX_OFFERS);

    PriceComparisonResult {
        product_name,
        best_price: offers.first().cloned(),
        prices: offers,
        message: None,
        source,
    }
}
