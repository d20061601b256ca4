//! Cross-references between dictionary entries.
//!
//! The source format encodes a cross-reference as a positional array of up to
//! three slots whose meaning depends on which slots are present and whether
//! the second slot is a string or an integer:
//!
//! - `[kanji, kana, senseIndex]`
//! - `[kanji, kana]`
//! - `[word, senseIndex]`
//! - `[word]`
//!
//! Each shape gets its own named variant; the slot inspection happens once,
//! during deserialization.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Xref {
    /// `[kanji, kana, senseIndex]` — spelling, reading and a specific sense.
    WordReadingSense {
        kanji: String,
        kana: String,
        sense_index: u32,
    },
    /// `[kanji, kana]` — spelling and reading.
    WordReading { kanji: String, kana: String },
    /// `[word, senseIndex]` — kanji or kana spelling and a specific sense.
    WordSense { word: String, sense_index: u32 },
    /// `[word]` — kanji or kana spelling alone.
    Word { word: String },
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn as_sense_index(value: &Value) -> Option<u32> {
    value.as_u64().map(|n| n as u32)
}

impl<'de> Deserialize<'de> for Xref {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let slots = Vec::<Value>::deserialize(deserializer)?;
        if slots.is_empty() || slots.len() > 3 {
            return Err(de::Error::custom(format!(
                "cross-reference must have 1 to 3 slots, got {}",
                slots.len()
            )));
        }

        let slot = |i: usize| slots.get(i).cloned().unwrap_or(Value::Null);
        let (first, second, third) = (slot(0), slot(1), slot(2));

        if !third.is_null() {
            let kanji = as_string(&first);
            let kana = as_string(&second);
            let sense_index = as_sense_index(&third);
            return match (kanji, kana, sense_index) {
                (Some(kanji), Some(kana), Some(sense_index)) => Ok(Xref::WordReadingSense {
                    kanji,
                    kana,
                    sense_index,
                }),
                _ => Err(de::Error::custom("invalid [kanji, kana, senseIndex] slots")),
            };
        }

        if !second.is_null() {
            if let Some(kana) = as_string(&second) {
                let kanji = as_string(&first)
                    .ok_or_else(|| de::Error::custom("invalid [kanji, kana] slots"))?;
                return Ok(Xref::WordReading { kanji, kana });
            }
            if let Some(sense_index) = as_sense_index(&second) {
                let word = as_string(&first)
                    .ok_or_else(|| de::Error::custom("invalid [word, senseIndex] slots"))?;
                return Ok(Xref::WordSense { word, sense_index });
            }
            return Err(de::Error::custom(
                "second cross-reference slot must be a string or an integer",
            ));
        }

        match as_string(&first) {
            Some(word) => Ok(Xref::Word { word }),
            None => Err(de::Error::custom("invalid single-slot cross-reference")),
        }
    }
}

impl Serialize for Xref {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let slots = match self {
            Xref::WordReadingSense {
                kanji,
                kana,
                sense_index,
            } => vec![
                Value::from(kanji.clone()),
                Value::from(kana.clone()),
                Value::from(*sense_index),
            ],
            Xref::WordReading { kanji, kana } => {
                vec![Value::from(kanji.clone()), Value::from(kana.clone())]
            }
            Xref::WordSense { word, sense_index } => {
                vec![Value::from(word.clone()), Value::from(*sense_index)]
            }
            Xref::Word { word } => vec![Value::from(word.clone())],
        };
        slots.serialize(serializer)
    }
}
