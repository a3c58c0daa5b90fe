//! Format-family classification across the journal's 1874-1899 run.
//!
//! The record-line grammar drifted over the years: early issues delimit the
//! origin with `@`, later ones with dashes, and from the mid-1880s London
//! arrivals are subdivided by dock. Classification only biases the order in
//! which grammars are tried; the parser still attempts every grammar on
//! every line.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::GrammarTag;

/// Grammar family a document likely follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatFamily {
    /// Through 1878: `Ship @ Origin,—cargo`.
    EarlyAt,
    /// 1879-1880: both delimiters appear.
    Transition,
    /// 1881-1884: `Date Ship-Origin-Cargo-Merchant`.
    StandardDash,
    /// 1885 onward: dash records under dock subdivision headers.
    LateDock,
    /// Could not be resolved.
    Unknown,
}

lazy_static! {
    /// A month-abbreviation date prefix at the start of a line.
    static ref MONTH_DAY_PREFIX: Regex =
        Regex::new(r"(?m)^[A-Za-z]{3,4}\.\s+\d{1,2}\s+").unwrap();

    /// Dash used as a field delimiter between words.
    static ref DASH_DELIMITED: Regex = Regex::new(r"\s+-\s+").unwrap();

    /// Dash butted against a capitalized field, the condensed delimiter shape.
    static ref DASH_BEFORE_FIELD: Regex = Regex::new(r"-[A-Z]").unwrap();
}

/// London dock subdivision headers that only occur in the late format.
const LONDON_DOCKS: &[&str] = &[
    "SURREY COMMERCIAL DOCKS",
    "MILLWALL DOCKS",
    "ROYAL ALBERT DOCKS",
    "VICTORIA DOCKS",
    "TILBURY DOCKS",
    "WEST INDIA DOCKS",
    "REGENT'S CANAL DOCK",
    "SHADWELL BASIN",
    "BREWER'S QUAY",
    "BURT'S WHARF",
    "GALLEON'S BUOYS",
    "HANOVER HOLE",
    "PRINCE REGENT'S WHARF",
    "OTHER DOCKS AND WHARVES",
];

/// Textual signals used when no year hint is available.
#[derive(Debug, Clone, Copy, Default)]
struct FormatSignals {
    at_count: usize,
    dash_count: usize,
    uses_dash_delimiter: bool,
    has_dock_subdivisions: bool,
    has_month_day_prefix: bool,
}

impl FormatSignals {
    fn detect(text: &str) -> Self {
        Self {
            at_count: text.matches('@').count(),
            dash_count: DASH_DELIMITED.find_iter(text).count(),
            uses_dash_delimiter: DASH_BEFORE_FIELD.is_match(text),
            has_dock_subdivisions: LONDON_DOCKS.iter().any(|dock| text.contains(dock)),
            has_month_day_prefix: MONTH_DAY_PREFIX.is_match(text),
        }
    }
}

/// Classify a document's format family from a year hint and/or sampled text.
///
/// A reliable year wins outright (the era boundaries are fixed empirically);
/// otherwise the majority textual signal decides.
pub fn classify(year: Option<i32>, text: Option<&str>) -> FormatFamily {
    if let Some(year) = year {
        let family = match year {
            y if y <= 1878 => FormatFamily::EarlyAt,
            y if y <= 1880 => FormatFamily::Transition,
            y if y <= 1884 => FormatFamily::StandardDash,
            _ => FormatFamily::LateDock,
        };
        debug!(year, ?family, "classified format from year hint");
        return family;
    }

    let Some(text) = text else {
        return FormatFamily::Unknown;
    };

    let signals = FormatSignals::detect(text);
    debug!(
        at_count = signals.at_count,
        dash_count = signals.dash_count,
        docks = signals.has_dock_subdivisions,
        "classifying format from text signals"
    );

    if signals.at_count > 0 && signals.at_count > signals.dash_count {
        return FormatFamily::EarlyAt;
    }
    if signals.has_dock_subdivisions {
        return FormatFamily::LateDock;
    }
    if signals.uses_dash_delimiter || (signals.dash_count > 0 && signals.has_month_day_prefix) {
        return FormatFamily::StandardDash;
    }
    if signals.at_count > 0 && signals.dash_count > 0 {
        return FormatFamily::Transition;
    }

    FormatFamily::Unknown
}

impl FormatFamily {
    /// Grammar trial order biased by family. All three grammars are always
    /// present; only their priority shifts.
    pub fn grammar_order(self) -> [GrammarTag; 3] {
        match self {
            FormatFamily::EarlyAt | FormatFamily::Transition => [
                GrammarTag::AtSign,
                GrammarTag::DatedDash,
                GrammarTag::CondensedDash,
            ],
            FormatFamily::StandardDash | FormatFamily::LateDock => [
                GrammarTag::DatedDash,
                GrammarTag::CondensedDash,
                GrammarTag::AtSign,
            ],
            FormatFamily::Unknown => [
                GrammarTag::AtSign,
                GrammarTag::DatedDash,
                GrammarTag::CondensedDash,
            ],
        }
    }
}
