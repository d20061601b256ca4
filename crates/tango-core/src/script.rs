//! Query script classification.

use serde::Serialize;

/// Which script a free-text query is written in. Decides nothing about which
/// index fields are searched (see [`crate::query::QueryPlan::build`]) but is
/// carried on the plan for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Kanji,
    Kana,
    Latin,
}

fn is_han(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'   // CJK Unified Ideographs
        | '\u{3400}'..='\u{4DBF}' // Extension A
        | '\u{F900}'..='\u{FAFF}' // Compatibility Ideographs
    )
}

fn is_kana(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'   // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{FF66}'..='\u{FF9D}' // Halfwidth Katakana
    )
}

impl Script {
    /// A single Han character anywhere forces `Kanji`. Otherwise any kana
    /// character makes the whole query `Kana`, so romaji mixed with a kana
    /// particle still searches as kana. Punctuation, whitespace and digits
    /// never affect the outcome. Everything else is `Latin`.
    pub fn classify(text: &str) -> Script {
        let mut has_kana = false;

        for c in text.chars() {
            if is_han(c) {
                return Script::Kanji;
            }
            if is_kana(c) {
                has_kana = true;
            }
        }

        if has_kana { Script::Kana } else { Script::Latin }
    }
}
