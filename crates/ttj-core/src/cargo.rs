//! Decomposition of free-text cargo manifests into itemized entries.
//!
//! A cargo field like `—1,300 staves, Nickols & Colven; 41,500 staves,
//! H. & R. Fowler` carries no reliable delimiter discipline. Segments are
//! split on semicolons, then two quantity passes run per segment: explicit
//! unit abbreviations (`102 bgs. wood pulp`) first, bare quantities
//! (`1,300 staves`) second. The merchant clause is extracted once per
//! segment, independent of the quantity matches.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::{CargoConfig, CargoItem};

lazy_static! {
    /// Quantity, short unit abbreviation with its period, commodity phrase.
    static ref EXPLICIT_UNIT: Regex = Regex::new(
        r"(\d[\d,]*)\s+([A-Za-z]{1,6})\.\s+([a-z][a-z\s&-]*)"
    ).unwrap();

    /// Quantity directly followed by a lowercase commodity phrase. The
    /// terminator (punctuation, a capitalized word, or end of segment) is
    /// consumed rather than looked ahead at; only the captures matter.
    static ref BARE_QUANTITY: Regex = Regex::new(
        r"(\d[\d,]*)\s+([a-z][a-z\s&-]{1,24}?)(?:[,;.]|\s+[A-Z]|$)"
    ).unwrap();

    /// Trailing `", Capitalized name"` clause of a segment.
    static ref MERCHANT_CLAUSE: Regex = Regex::new(
        r",\s*([A-Z][A-Za-z\s.&'-]+?)\s*$"
    ).unwrap();
}

/// Maximum stored length of a raw segment.
const RAW_SEGMENT_CAP: usize = 100;

/// Segments one cargo free-text field into [`CargoItem`]s.
#[derive(Debug, Clone, Default)]
pub struct CargoSegmenter {
    config: CargoConfig,
}

impl CargoSegmenter {
    pub fn new(config: CargoConfig) -> Self {
        Self { config }
    }

    /// Decompose a cargo field. Unparseable text yields an empty list,
    /// never an error.
    pub fn segment(&self, cargo_raw: &str) -> Vec<CargoItem> {
        let cargo = cargo_raw.trim_start_matches(['—', '–', '-']).trim();
        if cargo.len() < 3 {
            return Vec::new();
        }

        let mut items = Vec::new();

        for segment in cargo.split(';') {
            let segment = segment.trim();
            if segment.len() < 5 {
                continue;
            }
            self.segment_one(segment, &mut items);
        }

        debug!(items = items.len(), "segmented cargo field");
        items
    }

    fn segment_one(&self, segment: &str, items: &mut Vec<CargoItem>) {
        let raw_segment: String = segment.chars().take(RAW_SEGMENT_CAP).collect();

        // Explicit-unit matches take precedence.
        let mut matches: Vec<(String, Option<String>, String)> = Vec::new();
        for caps in EXPLICIT_UNIT.captures_iter(segment) {
            matches.push((
                normalize_quantity(&caps[1]),
                Some(caps[2].to_lowercase()),
                normalize_commodity(&caps[3]),
            ));
        }

        // A bare-quantity match duplicating an explicit-unit quantity in the
        // same segment is an overlapping view of the same entry; drop it.
        for caps in BARE_QUANTITY.captures_iter(segment) {
            let quantity = normalize_quantity(&caps[1]);
            let duplicate = matches
                .iter()
                .any(|(q, unit, _)| unit.is_some() && *q == quantity);
            if !duplicate {
                matches.push((quantity, None, normalize_commodity(&caps[2])));
            }
        }

        if matches.is_empty() {
            // Keyword-only fallback: descriptive text such as
            // "deals and battens" still names a commodity.
            let lower = segment.to_lowercase();
            if let Some(keyword) = self
                .config
                .commodity_keywords
                .iter()
                .find(|k| lower.contains(k.as_str()))
            {
                items.push(CargoItem {
                    quantity: None,
                    unit: None,
                    commodity: keyword.clone(),
                    merchant: None,
                    raw_segment,
                });
            }
            return;
        }

        let merchant = self.extract_merchant(segment);

        for (quantity, unit, commodity) in matches {
            items.push(CargoItem {
                quantity: Some(quantity),
                unit: unit.clone(),
                commodity,
                merchant: merchant.clone(),
                raw_segment: raw_segment.clone(),
            });
        }
    }

    /// Locate the segment's trailing merchant clause, rejecting consignee
    /// placeholders and clauses made up entirely of commodity words.
    fn extract_merchant(&self, segment: &str) -> Option<String> {
        let caps = MERCHANT_CLAUSE.captures(segment)?;
        let candidate = caps[1].trim().trim_end_matches('.').to_string();
        let lower = candidate.to_lowercase();

        if self
            .config
            .merchant_placeholders
            .iter()
            .any(|p| lower.contains(p.as_str()))
        {
            return None;
        }

        let all_commodity = candidate.split_whitespace().all(|word| {
            self.config
                .merchant_commodity_words
                .iter()
                .any(|c| c == &word.to_lowercase())
        });
        if all_commodity {
            return None;
        }

        Some(candidate)
    }
}

fn normalize_quantity(raw: &str) -> String {
    raw.replace(',', "")
}

fn normalize_commodity(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn segmenter() -> CargoSegmenter {
        CargoSegmenter::new(CargoConfig::default())
    }

    #[test]
    fn test_cargo_conservation() {
        let items =
            segmenter().segment("1,300 staves, Nickols & Colven; 41,500 staves, H. & R. Fowler");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity.as_deref(), Some("1300"));
        assert_eq!(items[0].commodity, "staves");
        assert_eq!(items[0].merchant.as_deref(), Some("Nickols & Colven"));
        assert_eq!(items[1].quantity.as_deref(), Some("41500"));
        assert_eq!(items[1].commodity, "staves");
        assert_eq!(items[1].merchant.as_deref(), Some("H. & R. Fowler"));
    }

    #[test]
    fn test_explicit_unit() {
        let items = segmenter().segment("102 bgs. wood pulp, J. Spicer & Co.");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity.as_deref(), Some("102"));
        assert_eq!(items[0].unit.as_deref(), Some("bgs"));
        assert_eq!(items[0].commodity, "wood pulp");
        assert_eq!(items[0].merchant.as_deref(), Some("J. Spicer & Co"));
    }

    #[test]
    fn test_order_placeholder_is_not_a_merchant() {
        let items = segmenter().segment("115 pcs. timber, Order.");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit.as_deref(), Some("pcs"));
        assert_eq!(items[0].commodity, "timber");
        assert_eq!(items[0].merchant, None);
    }

    #[test]
    fn test_multiple_quantities_in_one_segment() {
        let items = segmenter().segment("68 logs wood, 6 logs mahogany, 104 doz. deals, Order.");

        let quantities: Vec<_> = items.iter().filter_map(|i| i.quantity.as_deref()).collect();
        assert!(quantities.contains(&"68"));
        assert!(quantities.contains(&"6"));
        assert!(quantities.contains(&"104"));
        // The doz. entry carries its unit, the bare ones do not.
        assert!(items
            .iter()
            .any(|i| i.unit.as_deref() == Some("doz") && i.commodity == "deals"));
        assert!(items.iter().all(|i| i.merchant.is_none()));
    }

    #[test]
    fn test_leading_em_dash_stripped() {
        let items = segmenter().segment("—54,266 boards, Nil.");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity.as_deref(), Some("54266"));
        assert_eq!(items[0].commodity, "boards");
        assert_eq!(items[0].merchant, None);
    }

    #[test]
    fn test_keyword_fallback() {
        let items = segmenter().segment("deals and battens");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, None);
        assert_eq!(items[0].commodity, "deals");
    }

    #[test]
    fn test_empty_and_unrecognizable_yield_nothing() {
        assert!(segmenter().segment("").is_empty());
        assert!(segmenter().segment("—").is_empty());
        assert!(segmenter().segment("entirely garbled rubbish").is_empty());
    }
}
