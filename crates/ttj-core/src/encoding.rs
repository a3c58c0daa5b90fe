//! Repair of mis-decoded multi-byte characters in extracted text.
//!
//! The transcription pipeline occasionally emits UTF-8 that was decoded as
//! Latin-1 somewhere upstream, so `Gävle` arrives as `GÃ¤vle`. The fix is
//! table-driven: known complete names are replaced exactly, then short byte
//! sequences are substituted pattern-wise.

/// Complete names replaced verbatim. Tried before pattern substitution so a
/// name with several corrupted characters is restored in one step.
const EXACT_FIXES: &[(&str, &str)] = &[
    ("GÃ¤vle", "Gävle"),
    ("VÃ¤stervik", "Västervik"),
    ("MÃ¶nsterÃ¥s", "Mönsterås"),
    ("TimrÃ¥", "Timrå"),
    ("VilagarcÃ\u{ad}a de Arousa", "Vilagarcía de Arousa"),
    ("A CoruÃ±a", "A Coruña"),
    ("TÃ¸nsberg", "Tønsberg"),
    ("Trois-RiviÃ¨res", "Trois-Rivières"),
    ("Â\u{a0}Saint-Brieuc", "Saint-Brieuc"),
    ("Â Saint-Brieuc", "Saint-Brieuc"),
];

/// Two-byte mojibake sequences and their intended characters.
const PATTERN_FIXES: &[(&str, &str)] = &[
    ("Ã¤", "ä"),
    ("Ã¶", "ö"),
    ("Ã¥", "å"),
    ("Ã¸", "ø"),
    ("Ã±", "ñ"),
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ã\u{ad}", "í"),
];

/// Repair mis-decoded text. Clean input passes through unchanged, so the
/// operation is idempotent.
pub fn repair(text: &str) -> String {
    for (corrupted, correct) in EXACT_FIXES {
        if text == *corrupted {
            return (*correct).to_string();
        }
    }

    let mut fixed = text.to_string();
    for (corrupted, correct) in PATTERN_FIXES {
        if fixed.contains(corrupted) {
            fixed = fixed.replace(corrupted, correct);
        }
    }
    fixed
}

/// Repair an optional field in place, preserving `None`.
pub fn repair_opt(text: Option<String>) -> Option<String> {
    text.map(|t| repair(&t))
}
