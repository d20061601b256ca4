//! Data model for the jmdict-simplified JSON distribution.
//!
//! Shapes follow <https://scriptin.github.io/jmdict-simplified/> field for
//! field, so a dictionary file deserializes without any preprocessing.

use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::xref::Xref;

/// Marker inside `applies_to_kanji` meaning "this reading applies to every
/// kanji spelling of the word".
pub const APPLIES_TO_ALL: &str = "*";

/// Kanji/kana tag marking a spelling as search-only. Search-only forms are
/// indexed but never shown as a display form.
pub const TAG_SEARCH_ONLY: &str = "sK";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmdictMetadata {
    pub version: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub dict_date: String,
    #[serde(default)]
    pub common_only: bool,
    #[serde(default)]
    pub dict_revisions: Vec<String>,
    /// Tag name -> human readable description, e.g. "sK" -> "search-only kanji".
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// A full dictionary file: metadata plus every word entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jmdict {
    #[serde(flatten)]
    pub metadata: JmdictMetadata,
    pub words: Vec<JmdictWord>,
}

impl Jmdict {
    /// Decode a whole dictionary from a JSON reader in one pass.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }
}

/// One dictionary entry. Invariant: at least one kanji or one kana spelling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JmdictWord {
    pub id: String,
    #[serde(default)]
    pub kanji: Vec<JmdictKanji>,
    #[serde(default)]
    pub kana: Vec<JmdictKana>,
    #[serde(default)]
    pub sense: Vec<JmdictSense>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JmdictKanji {
    #[serde(default)]
    pub common: bool,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JmdictKanji {
    pub fn is_search_only(&self) -> bool {
        self.tags.iter().any(|t| t == TAG_SEARCH_ONLY)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmdictKana {
    #[serde(default)]
    pub common: bool,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Kanji spellings this reading applies to; [`APPLIES_TO_ALL`] means all.
    #[serde(default)]
    pub applies_to_kanji: Vec<String>,
}

impl JmdictKana {
    pub fn is_search_only(&self) -> bool {
        self.tags.iter().any(|t| t == TAG_SEARCH_ONLY)
    }

    /// Whether this reading applies to the given kanji spelling.
    pub fn applies_to(&self, kanji_text: &str) -> bool {
        self.applies_to_kanji
            .iter()
            .any(|applied| applied == kanji_text || applied == APPLIES_TO_ALL)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JmdictSense {
    #[serde(default)]
    pub part_of_speech: Vec<String>,
    #[serde(default)]
    pub applies_to_kanji: Vec<String>,
    #[serde(default)]
    pub applies_to_kana: Vec<String>,
    #[serde(default)]
    pub related: Vec<Xref>,
    #[serde(default)]
    pub antonym: Vec<Xref>,
    #[serde(default)]
    pub field: Vec<String>,
    #[serde(default)]
    pub dialect: Vec<String>,
    #[serde(default)]
    pub misc: Vec<String>,
    #[serde(default)]
    pub info: Vec<String>,
    #[serde(default)]
    pub gloss: Vec<JmdictGloss>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JmdictGloss {
    pub lang: String,
    pub text: String,
}

impl JmdictGloss {
    pub fn is_english(&self) -> bool {
        self.lang == "eng"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_minimal_dictionary() {
        let raw = r#"{
            "version": "3.5.0",
            "languages": ["eng"],
            "dictDate": "2024-01-01",
            "commonOnly": false,
            "dictRevisions": ["1.09"],
            "tags": {"sK": "search-only kanji form"},
            "words": [
                {
                    "id": "1000001",
                    "kanji": [{"common": true, "text": "暖かい", "tags": []}],
                    "kana": [{"common": true, "text": "あたたかい", "tags": [], "appliesToKanji": ["*"]}],
                    "sense": [{"partOfSpeech": ["adj-i"], "gloss": [{"lang": "eng", "text": "warm"}]}]
                }
            ]
        }"#;

        let dict = Jmdict::from_reader(raw.as_bytes()).expect("decode failed");
        assert_eq!(dict.metadata.version, "3.5.0");
        assert_eq!(dict.metadata.tags.get("sK").unwrap(), "search-only kanji form");
        assert_eq!(dict.words.len(), 1);

        let word = &dict.words[0];
        assert_eq!(word.id, "1000001");
        assert_eq!(word.kanji[0].text, "暖かい");
        assert!(word.kana[0].applies_to("暖かい"));
        assert!(word.sense[0].gloss[0].is_english());
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let raw = r#"{"version": "3.5.0", "words": [{"id": 42}]}"#;
        assert!(Jmdict::from_reader(raw.as_bytes()).is_err());
    }

    #[test]
    fn test_search_only_tags() {
        let kanji = JmdictKanji {
            text: "飽く迄".to_string(),
            tags: vec!["sK".to_string()],
            ..Default::default()
        };
        assert!(kanji.is_search_only());

        let kana = JmdictKana {
            text: "あくまで".to_string(),
            ..Default::default()
        };
        assert!(!kana.is_search_only());
    }

    #[test]
    fn test_applies_to_wildcard_and_exact() {
        let kana = JmdictKana {
            text: "あたたかい".to_string(),
            applies_to_kanji: vec!["*".to_string()],
            ..Default::default()
        };
        assert!(kana.applies_to("暖かい"));
        assert!(kana.applies_to("温かい"));

        let scoped = JmdictKana {
            text: "あったかい".to_string(),
            applies_to_kanji: vec!["暖かい".to_string()],
            ..Default::default()
        };
        assert!(scoped.applies_to("暖かい"));
        assert!(!scoped.applies_to("温かい"));
    }
}
