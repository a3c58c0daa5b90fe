//! Recognition of structural header lines.
//!
//! Port and date headers update parse context without themselves being
//! arrival records. An all-caps line with a trailing period is a header
//! shape even when the deny-list rejects it as a destination; such a line
//! is consumed without touching context.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::ParserConfig;

lazy_static! {
    /// All-caps line with a trailing period, possibly a port name.
    static ref PORT_HEADER: Regex = Regex::new(r"^([A-Z][A-Z\s&.'()]*)\.\s*$").unwrap();

    /// Standalone `{Month}. {Day}` line.
    static ref DATE_HEADER: Regex =
        Regex::new(r"^(?P<month>[A-Za-z]{3,9})\.\s+(?P<day>\d{1,2})\.?\s*$").unwrap();
}

/// What a header line means for the parse context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// Top-level port city; waits for a possible dock-level header.
    City(String),
    /// Dock/wharf/pier sub-location under the pending city.
    Dock(String),
    /// Plain destination port.
    Port(String),
    /// Header-shaped line rejected by the deny-list; consumed, no effect.
    Denied,
    /// Date header carrying month name and day.
    Date { month: String, day: u32 },
}

/// Classify a line as a header, or `None` if it is not header-shaped.
/// Port recognition takes priority over date recognition.
pub fn classify(line: &str, config: &ParserConfig) -> Option<Header> {
    if let Some(caps) = PORT_HEADER.captures(line) {
        let candidate = caps[1].trim_end_matches('.').trim();

        if candidate.len() <= 2 || is_denied_exact(candidate, config) {
            return Some(Header::Denied);
        }

        if config.port_cities.iter().any(|c| c == candidate) {
            return Some(Header::City(title_case(candidate)));
        }

        if config
            .dock_keywords
            .iter()
            .any(|k| candidate.contains(k.as_str()))
        {
            return Some(Header::Dock(title_case(candidate)));
        }

        if is_denied_substring(candidate, config) {
            return Some(Header::Denied);
        }

        return Some(Header::Port(title_case(candidate)));
    }

    if let Some(caps) = DATE_HEADER.captures(line) {
        let day: u32 = caps["day"].parse().ok()?;
        return Some(Header::Date {
            month: caps["month"].to_string(),
            day,
        });
    }

    None
}

/// Whole-candidate deny check; runs before city/dock recognition so
/// entries like `LONDON DOCK DELIVERIES` beat the dock keyword.
fn is_denied_exact(candidate: &str, config: &ParserConfig) -> bool {
    config.skip_headers.iter().any(|entry| candidate == entry)
}

/// Substring deny check for the remaining port-shaped candidates. Only
/// longer entries (journal titles, boilerplate phrases) participate, so a
/// short fragment like `EST` cannot reject a real port containing it.
fn is_denied_substring(candidate: &str, config: &ParserConfig) -> bool {
    config
        .skip_headers
        .iter()
        .any(|entry| entry.len() >= 6 && candidate.contains(entry.as_str()))
}

/// Recase an all-caps header for record emission: `LIVERPOOL` becomes
/// `Liverpool`, `CANADA DOCK` becomes `Canada Dock`.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            // An apostrophe stays inside its word: ST. JOHN'S -> St. John's.
            at_word_start = c != '\'';
        }
    }
    out
}
