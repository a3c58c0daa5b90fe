//! Context-aware record parsing.
//!
//! Each line of a document either updates the parse context (a header),
//! emits a record (a grammar match), or is skipped — mutually exclusive,
//! in that priority. Destination ports and dates frequently appear only on
//! header lines above a run of arrivals, so the context carries them
//! forward until a later header overwrites them. There is no backtracking:
//! an emitted record is never revised.

pub mod grammars;
pub mod headers;

use tracing::{debug, info};

use crate::encoding;
use crate::format::FormatFamily;
use crate::models::{Document, GrammarTag, ParserConfig, ShipRecord};

use grammars::{try_grammars, LineMatch};
use headers::Header;

/// Rolling interpretation state threaded through one or more documents.
///
/// Owned by the caller: a fresh context per document gives isolated
/// parsing, while reusing one context across an ordered page group lets a
/// header on page N govern continuation lines on page N+1. Fields persist
/// until overwritten; there is no rollback.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    /// Current destination port, composed from the latest port/dock header.
    pub destination_port: Option<String>,

    /// Pending top-level city, awaiting a possible dock-level header.
    pub city: Option<String>,

    /// Current arrival month name.
    pub month: Option<String>,

    /// Current arrival day of month.
    pub day: Option<u32>,

    /// Lines processed since `destination_port` was last set.
    port_age: usize,

    /// Lines processed since `city` was last set.
    city_age: usize,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&mut self) {
        self.port_age = self.port_age.saturating_add(1);
        self.city_age = self.city_age.saturating_add(1);
    }

    fn set_port(&mut self, port: String) {
        self.destination_port = Some(port);
        self.port_age = 0;
    }

    fn set_city(&mut self, city: String) {
        self.city = Some(city);
        self.city_age = 0;
    }

    /// The destination currently in force and its age in lines: the most
    /// recently set of the dock-composed port and the bare city header.
    fn resolved_destination(&self) -> Option<(&str, usize)> {
        match (&self.destination_port, &self.city) {
            (Some(port), Some(city)) => {
                if self.port_age <= self.city_age {
                    Some((port.as_str(), self.port_age))
                } else {
                    Some((city.as_str(), self.city_age))
                }
            }
            (Some(port), None) => Some((port.as_str(), self.port_age)),
            (None, Some(city)) => Some((city.as_str(), self.city_age)),
            (None, None) => None,
        }
    }
}

/// The context-aware record parser.
///
/// Construction fixes the grammar trial order (optionally biased by a
/// [`FormatFamily`]); per-document state lives entirely in the injected
/// [`ParseContext`], so one parser can serve many workers as long as each
/// owns its context.
#[derive(Debug, Clone)]
pub struct RecordParser {
    config: ParserConfig,
    grammar_order: [GrammarTag; 3],
}

impl RecordParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            grammar_order: FormatFamily::Unknown.grammar_order(),
        }
    }

    /// Bias the grammar trial order by a classified format family. Every
    /// grammar is still attempted; classification never suppresses one.
    pub fn with_format(mut self, family: FormatFamily) -> Self {
        self.grammar_order = family.grammar_order();
        self
    }

    /// Parse a document's lines in order, emitting records as grammar
    /// matches resolve against the rolling context.
    pub fn parse_document(&self, doc: &Document, ctx: &mut ParseContext) -> Vec<ShipRecord> {
        let mut records = Vec::new();

        for (i, raw_line) in doc.lines.iter().enumerate() {
            let line = raw_line.trim();
            ctx.tick();

            if line.is_empty() {
                continue;
            }

            if let Some(header) = headers::classify(line, &self.config) {
                self.apply_header(header, ctx);
                continue;
            }

            if let Some(m) = try_grammars(line, self.grammar_order) {
                let record = self.build_record(m, line, i + 1, doc, ctx);
                debug!(
                    line = i + 1,
                    ship = %record.ship_name,
                    grammar = ?record.matched_grammar,
                    confidence = record.confidence,
                    "emitted record"
                );
                records.push(record);
            } else {
                debug!(line = i + 1, "line matched no header or grammar, skipped");
            }
        }

        info!(
            records = records.len(),
            lines = doc.lines.len(),
            "parsed document"
        );
        records
    }

    fn apply_header(&self, header: Header, ctx: &mut ParseContext) {
        match header {
            Header::City(city) => {
                debug!(%city, "city header");
                // Destination stays untouched pending a dock-level header.
                ctx.set_city(city);
            }
            Header::Dock(dock) => {
                let port = match &ctx.city {
                    Some(city) => format!("{} ({})", city, dock),
                    None => dock,
                };
                debug!(%port, "dock header");
                // City persists so consecutive docks compose under it.
                ctx.set_port(port);
            }
            Header::Port(port) => {
                debug!(%port, "port header");
                ctx.set_port(port);
                // A plain port means we have left the previous city.
                ctx.city = None;
            }
            Header::Date { month, day } => {
                debug!(%month, day, "date header");
                ctx.month = Some(month);
                ctx.day = Some(day);
            }
            Header::Denied => {}
        }
    }

    fn build_record(
        &self,
        m: LineMatch,
        line: &str,
        line_number: usize,
        doc: &Document,
        ctx: &mut ParseContext,
    ) -> ShipRecord {
        let (destination, confidence) = match ctx.resolved_destination() {
            Some((port, age)) if age <= self.config.lookback_lines => {
                (Some(port.to_string()), 1.0)
            }
            Some((port, _)) => (Some(port.to_string()), 0.9),
            None => (None, 0.7),
        };

        let month = m.month.clone().or_else(|| ctx.month.clone());
        let day = m.day.or(ctx.day);

        // The journal states a date once for several following arrivals, so
        // a date on this line becomes context for the next ones.
        if let Some(month) = &m.month {
            ctx.month = Some(month.clone());
        }
        if let Some(day) = m.day {
            ctx.day = Some(day);
        }

        ShipRecord {
            ship_name: m.ship,
            origin_port_raw: encoding::repair_opt(m.origin),
            destination_port: encoding::repair_opt(destination),
            cargo_raw: m.cargo,
            merchant: m.merchant,
            day,
            month,
            year: doc.meta.year,
            publication_year: doc.meta.year,
            publication_month: doc.meta.month.clone(),
            publication_day: doc.meta.day,
            is_steamship: m.is_steamship,
            matched_grammar: m.tag,
            confidence,
            raw_line: line.to_string(),
            line_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentMeta;
    use pretty_assertions::assert_eq;

    fn parser() -> RecordParser {
        RecordParser::new(ParserConfig::default())
    }

    fn doc(lines: &[&str]) -> Document {
        Document::new(
            lines.iter().map(|l| l.to_string()).collect(),
            DocumentMeta::default(),
        )
    }

    #[test]
    fn test_at_sign_line_without_header_context() {
        let doc = doc(&["April 27. Andreas @ Fredrikstad,—54,266 boards, Nil."]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.ship_name, "Andreas");
        assert_eq!(r.origin_port_raw.as_deref(), Some("Fredrikstad"));
        assert_eq!(r.month.as_deref(), Some("April"));
        assert_eq!(r.day, Some(27));
        assert_eq!(r.destination_port, None);
        assert_eq!(r.confidence, 0.7);
    }

    #[test]
    fn test_city_header_then_dated_dash() {
        let doc = doc(&[
            "LIVERPOOL.",
            "Sept. 11 Essex (s)-Konigsberg-sleepers-Order",
        ]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.destination_port.as_deref(), Some("Liverpool"));
        assert_eq!(r.ship_name, "Essex");
        assert!(r.is_steamship);
        assert_eq!(r.origin_port_raw.as_deref(), Some("Konigsberg"));
        assert_eq!(r.cargo_raw.as_deref(), Some("sleepers"));
        assert_eq!(r.merchant.as_deref(), Some("Order"));
        assert!(r.confidence == 1.0 || r.confidence == 0.9);
    }

    #[test]
    fn test_context_monotonicity_under_one_header() {
        let doc = doc(&[
            "HULL.",
            "12 Mary-Drammen-deals-Order",
            "13 Beta-Riga-battens-J. Smith",
            "14 Gamma-Memel-staves-Order",
        ]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 3);
        for r in &records {
            assert_eq!(r.destination_port.as_deref(), Some("Hull"));
        }
    }

    #[test]
    fn test_new_port_header_overwrites_context() {
        let doc = doc(&[
            "GLOUCESTER.",
            "12 Mary-Drammen-deals-Order",
            "LIVERPOOL.",
            "13 Beta-Riga-battens-Order",
        ]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].destination_port.as_deref(), Some("Gloucester"));
        assert_eq!(records[1].destination_port.as_deref(), Some("Liverpool"));
    }

    #[test]
    fn test_dock_header_composes_with_pending_city() {
        let doc = doc(&[
            "LIVERPOOL.",
            "CANADA DOCK.",
            "12 Mary-Drammen-deals-Order",
            "HUSKISSON DOCK.",
            "13 Beta-Riga-battens-Order",
        ]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].destination_port.as_deref(),
            Some("Liverpool (Canada Dock)")
        );
        // The city persists across consecutive dock headers.
        assert_eq!(
            records[1].destination_port.as_deref(),
            Some("Liverpool (Huskisson Dock)")
        );
    }

    #[test]
    fn test_dock_header_without_city() {
        let doc = doc(&[
            "SURREY COMMERCIAL DOCKS.",
            "12 Mary-Drammen-deals-Order",
        ]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(
            records[0].destination_port.as_deref(),
            Some("Surrey Commercial Docks")
        );
    }

    #[test]
    fn test_date_header_sets_date_without_touching_port() {
        let doc = doc(&[
            "HULL.",
            "April 16.",
            "Mary-Drammen-deals-Order",
        ]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.destination_port.as_deref(), Some("Hull"));
        assert_eq!(r.month.as_deref(), Some("April"));
        assert_eq!(r.day, Some(16));
        assert_eq!(r.matched_grammar, GrammarTag::CondensedDash);
    }

    #[test]
    fn test_record_date_becomes_context_for_following_lines() {
        let doc = doc(&[
            "HULL.",
            "Sept. 11 Essex (s)-Konigsberg-sleepers-Order",
            "Mary-Drammen-deals-Order",
        ]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].month.as_deref(), Some("Sept"));
        assert_eq!(records[1].day, Some(11));
    }

    #[test]
    fn test_persistent_context_degrades_confidence() {
        let mut lines = vec!["HULL."];
        let fillers = vec![
            "The market remained quiet.",
            "Prices held steady on deals.",
            "Freight rates were unchanged.",
            "Arrivals were light all week.",
            "Charters remain scarce.",
            "Stocks continue ample.",
        ];
        lines.extend(fillers);
        lines.push("12 Mary-Drammen-deals-Order");

        let doc = doc(&lines);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].destination_port.as_deref(), Some("Hull"));
        assert_eq!(records[0].confidence, 0.9);
    }

    #[test]
    fn test_denied_header_leaves_context_alone() {
        let doc = doc(&[
            "HULL.",
            "IMPORTS.",
            "12 Mary-Drammen-deals-Order",
        ]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].destination_port.as_deref(), Some("Hull"));
    }

    #[test]
    fn test_threaded_context_across_page_boundary() {
        let parser = parser();
        let mut ctx = ParseContext::new();

        let page1 = doc(&["LIVERPOOL.", "CANADA DOCK."]);
        assert!(parser.parse_document(&page1, &mut ctx).is_empty());

        let page2 = doc(&["12 Mary-Drammen-deals-Order"]);
        let records = parser.parse_document(&page2, &mut ctx);

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].destination_port.as_deref(),
            Some("Liverpool (Canada Dock)")
        );
    }

    #[test]
    fn test_isolated_context_does_not_leak() {
        let parser = parser();

        let page1 = doc(&["LIVERPOOL."]);
        let mut ctx1 = ParseContext::new();
        parser.parse_document(&page1, &mut ctx1);

        let page2 = doc(&["12 Mary-Drammen-deals-Order"]);
        let mut ctx2 = ParseContext::new();
        let records = parser.parse_document(&page2, &mut ctx2);

        assert_eq!(records[0].destination_port, None);
        assert_eq!(records[0].confidence, 0.7);
    }

    #[test]
    fn test_unrecognized_lines_skipped_silently() {
        let doc = doc(&[
            "completely garbled #### text",
            "12 Mary-Drammen-deals-Order",
        ]);
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&doc, &mut ctx);

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_publication_metadata_copied_onto_records() {
        let document = Document::new(
            vec!["12 Mary-Drammen-deals-Order".to_string()],
            DocumentMeta {
                year: Some(1882),
                month: Some("May".to_string()),
                day: Some(6),
            },
        );
        let mut ctx = ParseContext::new();
        let records = parser().parse_document(&document, &mut ctx);

        let r = &records[0];
        assert_eq!(r.year, Some(1882));
        assert_eq!(r.publication_year, Some(1882));
        assert_eq!(r.publication_month.as_deref(), Some("May"));
        assert_eq!(r.publication_day, Some(6));
    }
}
