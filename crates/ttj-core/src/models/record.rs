//! Record shapes produced by the extraction engine.

use serde::{Deserialize, Serialize};

/// One page (or ordered page group) of transcribed text with its
/// externally supplied publication metadata.
#[derive(Debug, Clone)]
pub struct Document {
    /// Transcription lines in page order.
    pub lines: Vec<String>,

    /// Publication metadata derived outside the core.
    pub meta: DocumentMeta,
}

impl Document {
    pub fn new(lines: Vec<String>, meta: DocumentMeta) -> Self {
        Self { lines, meta }
    }

    /// Build a document from raw text, splitting on newlines.
    pub fn from_text(text: &str, meta: DocumentMeta) -> Self {
        Self {
            lines: text.lines().map(|l| l.to_string()).collect(),
            meta,
        }
    }
}

/// Publication date of the issue a page came from, as far as it is known.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Publication year.
    pub year: Option<i32>,

    /// Publication month name (e.g. "April").
    pub month: Option<String>,

    /// Publication day of month.
    pub day: Option<u32>,
}

/// Which line grammar matched a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarTag {
    /// `Ship @ Origin,—cargo` (earliest era).
    AtSign,
    /// `Day Ship-Origin-Cargo-Merchant` with a leading date.
    DatedDash,
    /// `Ship-Origin-Cargo-Merchant` without a date.
    CondensedDash,
}

impl GrammarTag {
    pub fn as_str(self) -> &'static str {
        match self {
            GrammarTag::AtSign => "at_sign",
            GrammarTag::DatedDash => "dated_dash",
            GrammarTag::CondensedDash => "condensed_dash",
        }
    }
}

/// One interpreted vessel arrival.
///
/// `destination_port` is inherited from header context at emission time;
/// it is never parsed from the record's own line. Records are built once
/// and never revised by later lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipRecord {
    /// Vessel name with the steamer marker stripped.
    pub ship_name: String,

    /// Origin port exactly as transcribed (after encoding repair).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_port_raw: Option<String>,

    /// Destination port resolved from header context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<String>,

    /// Free-text cargo manifest, decomposable via the cargo segmenter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo_raw: Option<String>,

    /// Consignee merchant, when the grammar carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    /// Arrival day of month, from the line or inherited context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,

    /// Arrival month name, from the line or inherited context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,

    /// Arrival year (publication year in practice; the journal never
    /// restates it on record lines).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Publication date of the issue, from document metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_day: Option<u32>,

    /// Whether a steamer marker appeared anywhere on the line.
    pub is_steamship: bool,

    /// Which grammar matched.
    pub matched_grammar: GrammarTag,

    /// 1.0 when the destination header sits within the lookback window,
    /// 0.9 when inherited from longer-lived context, 0.7 when unresolved.
    pub confidence: f32,

    /// The matched line, verbatim.
    pub raw_line: String,

    /// 1-based line number within the document.
    pub line_number: usize,
}

/// One decomposed commodity entry from a cargo manifest field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoItem {
    /// Numeric quantity with thousands separators removed, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,

    /// Unit abbreviation (lowercased, period stripped), when explicit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Commodity phrase, lowercased.
    pub commodity: String,

    /// Merchant clause for the segment, when one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,

    /// Source segment, truncated for storage.
    pub raw_segment: String,
}
