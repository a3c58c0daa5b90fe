//! Publication metadata and multipage grouping derived from filenames.
//!
//! Transcription files carry their issue date in the filename, either as a
//! compact `YYYYMMDD` stamp or spelled out (`..._April_4_1874_...`). Pages
//! of one issue share a stem and differ only in a `_pNNN` suffix.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use ttj_core::DocumentMeta;

lazy_static! {
    /// Compact date stamp anywhere in the stem.
    static ref COMPACT_DATE: Regex = Regex::new(r"(18\d{2})(\d{2})(\d{2})").unwrap();

    /// Spelled-out `Month Day Year` with underscore/dot/space separators.
    static ref WORDY_DATE: Regex =
        Regex::new(r"([A-Za-z]{3,9})[\s._-]+(\d{1,2})[\s._-]+(18\d{2})").unwrap();

    /// `_pNNN` page suffix marking one page of a multipage issue.
    static ref PAGE_SUFFIX: Regex = Regex::new(r"^(.+?)_p(\d{3})$").unwrap();
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// The journal's publication run; compact stamps outside it are OCR noise.
const FIRST_YEAR: i32 = 1874;
const LAST_YEAR: i32 = 1899;

/// Derive publication metadata from a transcription filename. Fields that
/// cannot be derived stay `None`; a record is still extractable without
/// its publication date.
pub fn derive_meta(path: &Path) -> DocumentMeta {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");

    if let Some(caps) = COMPACT_DATE.captures(stem) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: usize = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);

        if (FIRST_YEAR..=LAST_YEAR).contains(&year)
            && (1..=12).contains(&month)
            && (1..=31).contains(&day)
        {
            return DocumentMeta {
                year: Some(year),
                month: Some(MONTHS[month - 1].to_string()),
                day: Some(day),
            };
        }
    }

    // Spelled-out dates: take the first candidate whose leading token
    // resolves to a month name.
    for caps in WORDY_DATE.captures_iter(stem) {
        if let Some(month) = month_from_token(&caps[1]) {
            let day: u32 = match caps[2].parse() {
                Ok(d) if (1..=31).contains(&d) => d,
                _ => continue,
            };
            let year: i32 = caps[3].parse().unwrap_or(0);
            return DocumentMeta {
                year: Some(year),
                month: Some(month.to_string()),
                day: Some(day),
            };
        }
    }

    debug!(%stem, "no publication date derivable from filename");
    DocumentMeta::default()
}

/// Resolve a token to a month name on its first three letters, which
/// tolerates OCR damage further into the word and abbreviated forms
/// like `Sept`.
fn month_from_token(token: &str) -> Option<&'static str> {
    let prefix = token.to_lowercase();
    MONTHS
        .iter()
        .find(|m| {
            let m = m.to_lowercase();
            prefix.len() >= 3 && m.starts_with(&prefix[..3])
        })
        .copied()
}

/// Group page files into ordered multipage issues. Files without a page
/// suffix form singleton groups under their own stem. Groups come back in
/// stable stem order, pages in page-number order.
pub fn group_pages(paths: Vec<PathBuf>) -> Vec<(String, Vec<PathBuf>)> {
    let mut groups: BTreeMap<String, Vec<(u32, PathBuf)>> = BTreeMap::new();

    for path in paths {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        match PAGE_SUFFIX.captures(&stem) {
            Some(caps) => {
                let base = caps[1].to_string();
                let page: u32 = caps[2].parse().unwrap_or(0);
                groups.entry(base).or_default().push((page, path));
            }
            None => {
                groups.entry(stem).or_default().push((0, path));
            }
        }
    }

    groups
        .into_iter()
        .map(|(base, mut pages)| {
            pages.sort_by_key(|(n, _)| *n);
            (base, pages.into_iter().map(|(_, p)| p).collect())
        })
        .collect()
}
