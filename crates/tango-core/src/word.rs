//! The two projections of a dictionary entry.
//!
//! [`SearchableWord`] is what the index sees; [`Word`] is what gets stored
//! and displayed. They share nothing but the ID.

use serde::{Deserialize, Serialize};

/// Index-time projection. Each spelling appears twice: once in an exact
/// field (whole spelling as one token) and once in a char-gram field for
/// substring and fuzzy matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchableWord {
    /// Stored for retrieval, never tokenized.
    pub id: String,
    pub kanji_exact: Vec<String>,
    pub kanji_char: Vec<String>,
    pub kana_exact: Vec<String>,
    pub kana_char: Vec<String>,
    /// One entry per English gloss (not per sense).
    pub meanings: Vec<String>,
}

/// Storage/display projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    /// Primary spelling+reading pairing, first discovered.
    pub main_word: Furigana,
    /// Remaining pairings in discovery order.
    pub other_forms: Vec<Furigana>,
    #[serde(rename = "isCommon")]
    pub common: bool,
    /// One string per sense, that sense's glosses joined with "; ".
    pub meanings: Vec<String>,
}

/// A spelling with its reading. For kana-only words the reading is empty and
/// the kana itself stands as the word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Furigana {
    pub word: String,
    pub reading: String,
}

impl Furigana {
    pub fn new(word: impl Into<String>, reading: impl Into<String>) -> Self {
        Furigana {
            word: word.into(),
            reading: reading.into(),
        }
    }
}
