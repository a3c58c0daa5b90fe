//! Configuration for the extraction pipeline.
//!
//! The deny-lists and thresholds here are hand-curated and empirically tuned
//! against the 1874-1899 journal run. They are kept as data with defaults
//! rather than fixed enumerations so callers can extend them without a
//! rebuild.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TtjError};

/// Main configuration for the extraction pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Record parser configuration.
    pub parser: ParserConfig,

    /// Cargo field segmentation configuration.
    pub cargo: CargoConfig,

    /// Entity normalization configuration.
    pub normalizer: NormalizerConfig,
}

impl ExtractionConfig {
    /// Validate threshold ordering and window sizes.
    pub fn validate(&self) -> Result<()> {
        let n = &self.normalizer;
        if !(n.fuzzy_low < n.fuzzy_medium && n.fuzzy_medium < n.fuzzy_high) {
            return Err(TtjError::Config(format!(
                "fuzzy thresholds must be ordered low < medium < high, got {} / {} / {}",
                n.fuzzy_low, n.fuzzy_medium, n.fuzzy_high
            )));
        }
        if !(0.0..=1.0).contains(&n.fuzzy_high) {
            return Err(TtjError::Config(format!(
                "fuzzy_high threshold out of range: {}",
                n.fuzzy_high
            )));
        }
        if self.parser.lookback_lines == 0 {
            return Err(TtjError::Config(
                "lookback_lines must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the context-aware record parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// How many preceding lines count as "immediate" context when scoring
    /// a record's destination-port confidence.
    pub lookback_lines: usize,

    /// All-caps headers that are never destination ports: journal titles,
    /// commodity words, advertisement boilerplate, company names. Short
    /// entries match a candidate header exactly; entries of six characters
    /// or more also reject candidates containing them.
    pub skip_headers: Vec<String>,

    /// Top-level port cities that appear as their own headers. A city header
    /// does not set the destination by itself; it waits for a possible
    /// dock-level header beneath it.
    pub port_cities: Vec<String>,

    /// Keywords marking a dock/wharf/pier sub-location header.
    pub dock_keywords: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            lookback_lines: 4,
            skip_headers: default_skip_headers(),
            port_cities: [
                "LONDON",
                "LIVERPOOL",
                "GLASGOW",
                "GREENOCK",
                "GRANGEMOUTH",
                "LEITH",
                "DUNDEE",
                "ABERDEEN",
                "BRISTOL",
                "CARDIFF",
                "HULL",
                "NEWCASTLE",
                "SUNDERLAND",
                "MIDDLESBROUGH",
                "HARTLEPOOL",
                "MANCHESTER",
                "GOOLE",
                "GRIMSBY",
                "SOUTHAMPTON",
                "PLYMOUTH",
                "BELFAST",
                "DUBLIN",
                "CORK",
                "BARROW",
                "PRESTON",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            dock_keywords: ["DOCK", "DOCKS", "WHARF", "WHARVES", "PIER", "QUAY"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Configuration for cargo field segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CargoConfig {
    /// Commodity keywords for the fallback scan when no quantity pattern
    /// matches a segment.
    pub commodity_keywords: Vec<String>,

    /// Trailing-clause words that mark a consignee placeholder rather than
    /// a merchant name.
    pub merchant_placeholders: Vec<String>,

    /// Commodity words that disqualify a merchant candidate when the
    /// candidate consists of nothing else.
    pub merchant_commodity_words: Vec<String>,
}

impl Default for CargoConfig {
    fn default() -> Self {
        Self {
            commodity_keywords: [
                "deals", "timber", "boards", "battens", "staves", "mahogany", "cedar", "oak",
                "pine", "firewood", "laths", "planks",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            merchant_placeholders: ["order", "nil", "ditto"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            merchant_commodity_words: [
                "deals", "timber", "boards", "staves", "battens", "planks", "logs",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Configuration for tiered entity normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Similarity at or above this is auto-accepted.
    pub fuzzy_high: f64,

    /// Similarity at or above this (but below high) is flagged for review.
    pub fuzzy_medium: f64,

    /// Similarity at or above this (but below medium) is reported as an
    /// unresolved best candidate.
    pub fuzzy_low: f64,

    /// Raw values longer than this are treated as transcription garbage.
    pub max_raw_len: usize,

    /// Non-entity artifacts rejected outright (case-insensitive substrings).
    pub artifact_markers: Vec<String>,

    /// Commodity words that are never origin ports.
    pub origin_commodity_words: Vec<String>,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            fuzzy_high: 0.92,
            fuzzy_medium: 0.85,
            fuzzy_low: 0.70,
            max_raw_len: 150,
            artifact_markers: [
                "TIMBER TRADES JOURNAL",
                "JOURNAL",
                "IMPORTS",
                "EXPORTS",
                "FREIGHTS",
                "FAILURES",
                "LIQUIDATIONS",
                "DIVIDENDS",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            origin_commodity_words: [
                "deals", "timber", "staves", "lathwood", "pitwood", "props", "battens", "boards",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

fn default_skip_headers() -> Vec<String> {
    [
        // Journal section headers
        "TIMBER TRADES JOURNAL",
        "TIMBER TRADES' JOURNAL",
        "ADES JOURNAL",
        "ENGLAND AND WALES",
        "SCOTLAND",
        "IRELAND",
        "SCOTCH SUPPLEMENT",
        "IMPORTS",
        "REVIEWS",
        "FREIGHTS",
        "FAILURES AND ARRANGEMENTS",
        "LIQUIDATIONS",
        "ERRATUM",
        "TRADE ITEMS",
        "CREDITOR PARTLY SECURED",
        "ACCEPTED TENDERS",
        "LONDON DOCK DELIVERIES",
        "ARRIVALS",
        // Commodities set as headers above price tables
        "PINE",
        "SPRUCE",
        "PITCH PINE",
        "OAK",
        "OAK TIMBER",
        "MAHOGANY",
        "ASH",
        "LATHWOOD",
        "WEATHERBOARDS",
        "SLATING BATTENS",
        "MOULDING",
        "MOULDINGS",
        "VENEERS",
        "SLAB BOARDS",
        "POLES",
        "SPARS",
        "DECK DEALS",
        "LATHS",
        "PLASTERERS' LATHS",
        "BEAD",
        "TORUS SKIRTING",
        "DEAL",
        "ERABLE",
        "HEWN BALK",
        "AHOGANY",
        // Advertisement boilerplate
        "CONTRACTS OPEN",
        "TRADE MARK",
        "ILLUSTRATED CATALOGUES FREE ON APPLICATION",
        "POST FREE ON APPLICATION",
        "EXPORT ORDERS PROMPTLY EXECUTED",
        "WRITE FOR CATALOGUE",
        "DETAILED SPECIFICATION ON APPLICATION",
        "COUNTRY ORDERS RECEIVE PROMPT ATTENTION",
        "SEND FOR REFERENCES TO USERS",
        "REGISTERED BRAND",
        "SILVER MEDAL",
        "CIRCULAR SAWS",
        "IN THE WORLD",
        "SPECIFICATIONS OF THE FOLLOWING HAVE BEEN PUBLISHED",
        "EVERY DESCRIPTION OF BALTIC AND AMERICAN TIMBER",
        "VENEERS OF ALL KINDS",
        "AND ALL VARIETIES OF FANCY WOODS",
        "EVERY DESCRIPTION OF WOOD ALWAYS IN STOCK",
        "PREPARED FROM THE DIMENSIONS STATED",
        "EXPORTERS AMERICAN HARDWOOD LUMBER",
        "AUSTRALIAN TIMBER TRADE",
        "TIMBER FROM CORSICA",
        "SEEDLING AND TRANSPLANTED FOREST TREES",
        "HORTICULTURAL TIMBER MERCHANT",
        "THE STANDARD TIMBER MEASURER",
        "GANDY'S PATENT COTTON BELTING",
        "THE GANDY BELT",
        // Company names
        "MAURICE GANDY",
        "THOMAS ROEBUCK & COMPANY (LIMITED)",
        "JOSEPH GARDNER & SONS",
        "ROBERT PARKER & CO",
        "LAVY BROS",
        // Location phrases that are not headers for arrivals
        "AT NEW ORLEANS",
        "THE MISSISSIPPI VALLEY",
        "THE HAWAIIAN ISLANDS",
        "BRANCH YARD AT NEWBURGH",
        "AT THE MILLWALL DOCKS",
        "AT AVONMOUTH",
        "BY SURREY COMMERCIAL DOCKS",
        // Transcription fragments
        "R. M",
        "R & CO",
        "ONE",
        "EST",
        "TONE",
        "BURGH",
        "J. H. ROW... AU",
        "B. & F. S. WHARF",
        "B. & F. WHARF",
        "Y COMMERCIAL DOCKS",
        "COLUMBIA",
        "MILWALL",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unordered_thresholds_rejected() {
        let mut config = ExtractionConfig::default();
        config.normalizer.fuzzy_medium = 0.95;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_lookback_rejected() {
        let mut config = ExtractionConfig::default();
        config.parser.lookback_lines = 0;
        assert!(config.validate().is_err());
    }
}
