//! Price normalization for product cards

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)").expect("valid price pattern"));

/// Parse the first numeric-looking substring of a price label.
///
/// Thousands separators are dropped before matching, so `"$1,250.00"`
/// yields `1250.0`. Text without digits yields `None`.
pub fn parse_price(text: &str) -> Option<f64> {
    let normalized = text.replace(',', "");
    NUMBER
        .captures(&normalized)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
