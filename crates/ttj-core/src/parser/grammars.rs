//! The era-specific record-line grammars.
//!
//! Three grammar families cover the journal's run. Each is a fallible
//! matcher returning a partially built record; the parser tries them in a
//! fixed priority order and takes the first success. Grammars are mutually
//! exclusive per line, never combined.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::GrammarTag;

lazy_static! {
    /// Earliest era: optional leading date, ship, optional steamer marker,
    /// `@`, origin, separator, cargo remainder. The cargo text starts at an
    /// em-dash or digit, which keeps abbreviated origins like
    /// `St. John, N.B.` intact.
    static ref AT_SIGN: Regex = Regex::new(concat!(
        r"^(?:(?P<month>[A-Za-z]{3,9})\.?\s+(?P<day>\d{1,2})\.?\s+)?",
        r"(?P<ship>[A-Za-z][A-Za-z\s.&'-]*?)\s*(?:\(s\))?\s*@\s*",
        r"(?P<origin>[A-Za-z][A-Za-z\s.,&-]*?)[,.]?\s*",
        r"(?P<cargo>[—–\d].*)$",
    )).unwrap();

    /// Standard era: leading day (month optional), ship, optional steamer
    /// marker, then origin, cargo, merchant as dash-separated fields.
    static ref DATED_DASH: Regex = Regex::new(concat!(
        r"^(?:(?P<month>[A-Za-z]{3,9})\.\s+)?(?P<day>\d{1,2})\s+",
        r"(?P<ship>[A-Za-z][A-Za-z\s.&'-]*?)\s*(?:\(s\))?\s*-\s*",
        r"(?P<origin>[A-Za-z][A-Za-z\s.,'-]*?)\s*-\s*",
        r"(?P<cargo>[^-]+?)\s*-\s*(?P<merchant>.+)$",
    )).unwrap();

    /// Dateless variant of the dash form. The ship token must start with a
    /// capital letter so continuation lines do not match.
    static ref CONDENSED_DASH: Regex = Regex::new(concat!(
        r"^(?P<ship>[A-Z][A-Za-z\s.&'-]*?)\s*(?:\(s\))?\s*-\s*",
        r"(?P<origin>[A-Za-z][A-Za-z\s.,'-]*?)\s*-\s*",
        r"(?P<cargo>[^-]+?)\s*-\s*(?P<merchant>.+)$",
    )).unwrap();
}

/// Steamer marker as it appears on record lines.
const STEAMER_MARKER: &str = "(s)";

/// A grammar match before context resolution.
#[derive(Debug, Clone)]
pub struct LineMatch {
    pub tag: GrammarTag,
    pub ship: String,
    pub origin: Option<String>,
    pub cargo: Option<String>,
    pub merchant: Option<String>,
    pub month: Option<String>,
    pub day: Option<u32>,
    pub is_steamship: bool,
}

/// Try the grammars in the given priority order; first success wins.
pub fn try_grammars(line: &str, order: [GrammarTag; 3]) -> Option<LineMatch> {
    order.iter().find_map(|tag| match tag {
        GrammarTag::AtSign => try_at_sign(line),
        GrammarTag::DatedDash => try_dated_dash(line),
        GrammarTag::CondensedDash => try_condensed_dash(line),
    })
}

fn try_at_sign(line: &str) -> Option<LineMatch> {
    if !line.contains('@') {
        return None;
    }
    let caps = AT_SIGN.captures(line)?;
    Some(build_match(GrammarTag::AtSign, line, &caps))
}

fn try_dated_dash(line: &str) -> Option<LineMatch> {
    let caps = DATED_DASH.captures(line)?;
    Some(build_match(GrammarTag::DatedDash, line, &caps))
}

fn try_condensed_dash(line: &str) -> Option<LineMatch> {
    if !line.contains('-') {
        return None;
    }
    let caps = CONDENSED_DASH.captures(line)?;
    Some(build_match(GrammarTag::CondensedDash, line, &caps))
}

fn build_match(tag: GrammarTag, line: &str, caps: &regex::Captures<'_>) -> LineMatch {
    LineMatch {
        tag,
        ship: clean_ship_name(&caps["ship"]),
        origin: caps.name("origin").map(|m| m.as_str().trim().to_string()),
        cargo: caps
            .name("cargo")
            .map(|m| m.as_str().trim().to_string())
            .filter(|c| !c.is_empty()),
        merchant: caps
            .name("merchant")
            .map(|m| m.as_str().trim().to_string())
            .filter(|m| !m.is_empty()),
        month: caps.name("month").map(|m| m.as_str().to_string()),
        day: caps.name("day").and_then(|m| m.as_str().parse().ok()),
        is_steamship: line.contains(STEAMER_MARKER),
    }
}

fn clean_ship_name(raw: &str) -> String {
    raw.replace(STEAMER_MARKER, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ORDER: [GrammarTag; 3] = [
        GrammarTag::AtSign,
        GrammarTag::DatedDash,
        GrammarTag::CondensedDash,
    ];

    #[test]
    fn test_at_sign_with_date() {
        let m = try_grammars("April 27. Andreas @ Fredrikstad,—54,266 boards, Nil.", ORDER)
            .expect("should match");

        assert_eq!(m.tag, GrammarTag::AtSign);
        assert_eq!(m.ship, "Andreas");
        assert_eq!(m.origin.as_deref(), Some("Fredrikstad"));
        assert_eq!(m.month.as_deref(), Some("April"));
        assert_eq!(m.day, Some(27));
        assert!(!m.is_steamship);
        assert!(m.cargo.as_deref().unwrap().contains("54,266 boards"));
    }

    #[test]
    fn test_at_sign_without_date() {
        let m = try_grammars("Solid @ Drammen,—1,100 deals, Order.", ORDER).expect("should match");

        assert_eq!(m.tag, GrammarTag::AtSign);
        assert_eq!(m.ship, "Solid");
        assert_eq!(m.origin.as_deref(), Some("Drammen"));
        assert_eq!(m.month, None);
        assert_eq!(m.day, None);
    }

    #[test]
    fn test_at_sign_keeps_abbreviated_origin() {
        let m = try_grammars("May 2. Brodrene @ St. John, N.B.,—2,452 deals.", ORDER)
            .expect("should match");

        assert_eq!(m.origin.as_deref(), Some("St. John, N.B."));
    }

    #[test]
    fn test_dated_dash_with_steamer_marker() {
        let m = try_grammars("Sept. 11 Essex (s)-Konigsberg-sleepers-Order", ORDER)
            .expect("should match");

        assert_eq!(m.tag, GrammarTag::DatedDash);
        assert_eq!(m.ship, "Essex");
        assert!(m.is_steamship);
        assert_eq!(m.origin.as_deref(), Some("Konigsberg"));
        assert_eq!(m.cargo.as_deref(), Some("sleepers"));
        assert_eq!(m.merchant.as_deref(), Some("Order"));
        assert_eq!(m.month.as_deref(), Some("Sept"));
        assert_eq!(m.day, Some(11));
    }

    #[test]
    fn test_dated_dash_bare_day_wins_over_condensed() {
        let m = try_grammars("27 Alpha-Christiania-deals-Order", ORDER).expect("should match");

        assert_eq!(m.tag, GrammarTag::DatedDash);
        assert_eq!(m.day, Some(27));
        assert_eq!(m.month, None);
        assert_eq!(m.ship, "Alpha");
    }

    #[test]
    fn test_condensed_dash() {
        let m = try_grammars("Fiery Cross-Pensacola-timber-J. S. Surtees & Co.", ORDER)
            .expect("should match");

        assert_eq!(m.tag, GrammarTag::CondensedDash);
        assert_eq!(m.ship, "Fiery Cross");
        assert_eq!(m.origin.as_deref(), Some("Pensacola"));
        assert_eq!(m.merchant.as_deref(), Some("J. S. Surtees & Co."));
    }

    #[test]
    fn test_continuation_line_does_not_match_condensed() {
        assert!(try_grammars("and 200 further deals-for-order", ORDER).is_none());
        assert!(try_grammars("1,238 bdls. laths, Tagart & Co.", ORDER).is_none());
    }

    #[test]
    fn test_prose_line_matches_nothing() {
        assert!(try_grammars("The market remained quiet this week.", ORDER).is_none());
        assert!(try_grammars("", ORDER).is_none());
    }
}
