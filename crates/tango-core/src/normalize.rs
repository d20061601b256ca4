//! Pure projections from a source dictionary record to the two forms the
//! pipeline writes: the index document and the display record.

use tango_jmdict::JmdictWord;

use crate::error::ImportError;
use crate::word::{Furigana, SearchableWord, Word};

const GLOSS_SEPARATOR: &str = "; ";

/// Project a record into its index document.
///
/// Every visited spelling and English gloss must be non-empty; an empty one
/// is a data-quality fault that aborts the import batch carrying it.
pub fn to_searchable(word: &JmdictWord) -> Result<SearchableWord, ImportError> {
    let mut entry = SearchableWord {
        id: word.id.clone(),
        ..Default::default()
    };

    for kanji in &word.kanji {
        if kanji.text.is_empty() {
            return Err(ImportError::EmptyField {
                id: word.id.clone(),
            });
        }
        entry.kanji_exact.push(kanji.text.clone());
        entry.kanji_char.push(kanji.text.clone());
    }

    for kana in &word.kana {
        if kana.text.is_empty() {
            return Err(ImportError::EmptyField {
                id: word.id.clone(),
            });
        }
        entry.kana_exact.push(kana.text.clone());
        entry.kana_char.push(kana.text.clone());
    }

    for sense in &word.sense {
        for gloss in &sense.gloss {
            if gloss.is_english() {
                if gloss.text.is_empty() {
                    return Err(ImportError::EmptyField {
                        id: word.id.clone(),
                    });
                }
                entry.meanings.push(gloss.text.clone());
            }
        }
    }

    Ok(entry)
}

/// Project a record into its display form.
pub fn to_word(word: &JmdictWord) -> Word {
    let mut entry = Word {
        id: word.id.clone(),
        ..Default::default()
    };

    if word.kanji.is_empty() {
        collect_kana_only_forms(&mut entry, word);
    } else {
        collect_kanji_forms(&mut entry, word);
    }

    collect_meanings(&mut entry, word);

    entry
}

/// Pair every applicable (kana, kanji) combination, kana-outer/kanji-inner.
/// The first pairing discovered becomes the main word; `common` comes from
/// the first kanji entry, not from the pairing that won.
fn collect_kanji_forms(entry: &mut Word, word: &JmdictWord) {
    for kana in &word.kana {
        if kana.is_search_only() {
            continue;
        }

        for kanji in &word.kanji {
            if kanji.is_search_only() {
                continue;
            }

            if !kana.applies_to(&kanji.text) {
                continue;
            }

            let furigana = Furigana::new(kanji.text.clone(), kana.text.clone());
            if entry.main_word.word.is_empty() {
                entry.common = word.kanji[0].common;
                entry.main_word = furigana;
            } else {
                entry.other_forms.push(furigana);
            }
        }
    }
}

/// Kana-only words: the kana itself is the word and the reading stays empty.
fn collect_kana_only_forms(entry: &mut Word, word: &JmdictWord) {
    for (i, kana) in word.kana.iter().enumerate() {
        let furigana = Furigana::new(kana.text.clone(), "");
        if i == 0 {
            entry.common = kana.common;
            entry.main_word = furigana;
        } else {
            entry.other_forms.push(furigana);
        }
    }
}

/// One meaning string per sense, glosses joined with "; ". This is coarser
/// than the index projection, which keeps one entry per English gloss.
fn collect_meanings(entry: &mut Word, word: &JmdictWord) {
    for sense in &word.sense {
        let joined = sense
            .gloss
            .iter()
            .map(|g| g.text.as_str())
            .collect::<Vec<_>>()
            .join(GLOSS_SEPARATOR);
        entry.meanings.push(joined);
    }
}

#[cfg(test)]
mod tests {
    use tango_jmdict::{JmdictGloss, JmdictKana, JmdictKanji, JmdictSense};

    use super::*;

    fn kanji(text: &str, common: bool) -> JmdictKanji {
        JmdictKanji {
            common,
            text: text.to_string(),
            tags: vec![],
        }
    }

    fn kana_all(text: &str, common: bool) -> JmdictKana {
        JmdictKana {
            common,
            text: text.to_string(),
            tags: vec![],
            applies_to_kanji: vec!["*".to_string()],
        }
    }

    fn sense(glosses: &[&str]) -> JmdictSense {
        JmdictSense {
            gloss: glosses
                .iter()
                .map(|text| JmdictGloss {
                    lang: "eng".to_string(),
                    text: text.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_kanji_word_pairing_order() {
        // The worked example: two kanji spellings sharing one reading,
        // two senses with one gloss each.
        let word = JmdictWord {
            id: "1000001".to_string(),
            kanji: vec![kanji("暖かい", true), kanji("温かい", false)],
            kana: vec![kana_all("あたたかい", true)],
            sense: vec![sense(&["warm"]), sense(&["mild"])],
        };

        let entry = to_word(&word);
        assert_eq!(entry.main_word, Furigana::new("暖かい", "あたたかい"));
        assert_eq!(
            entry.other_forms,
            vec![Furigana::new("温かい", "あたたかい")]
        );
        assert!(entry.common);
        assert_eq!(entry.meanings, vec!["warm".to_string(), "mild".to_string()]);
    }

    #[test]
    fn test_common_comes_from_first_kanji_entry() {
        // A reading scoped to the second kanji only: the winning pairing is
        // (second kanji, reading) but `common` is still the first kanji's.
        let mut scoped = kana_all("あったかい", true);
        scoped.applies_to_kanji = vec!["温かい".to_string()];

        let word = JmdictWord {
            id: "1000002".to_string(),
            kanji: vec![kanji("暖かい", false), kanji("温かい", true)],
            kana: vec![scoped],
            sense: vec![],
        };

        let entry = to_word(&word);
        assert_eq!(entry.main_word, Furigana::new("温かい", "あったかい"));
        assert!(!entry.common, "common must come from kanji[0]");
    }

    #[test]
    fn test_search_only_forms_are_skipped() {
        let mut hidden_kanji = kanji("飽く迄", false);
        hidden_kanji.tags = vec!["sK".to_string()];
        let mut hidden_kana = kana_all("あくまでも", false);
        hidden_kana.tags = vec!["sK".to_string()];

        let word = JmdictWord {
            id: "1000003".to_string(),
            kanji: vec![hidden_kanji, kanji("飽くまで", true)],
            kana: vec![hidden_kana, kana_all("あくまで", true)],
            sense: vec![],
        };

        let entry = to_word(&word);
        assert_eq!(entry.main_word, Furigana::new("飽くまで", "あくまで"));
        assert!(entry.other_forms.is_empty());
    }

    #[test]
    fn test_kana_only_word() {
        let word = JmdictWord {
            id: "1000004".to_string(),
            kanji: vec![],
            kana: vec![kana_all("よろしく", true), kana_all("よろしくね", false)],
            sense: vec![sense(&["best regards"])],
        };

        let entry = to_word(&word);
        assert_eq!(entry.main_word, Furigana::new("よろしく", ""));
        assert_eq!(entry.other_forms, vec![Furigana::new("よろしくね", "")]);
        assert!(entry.common);
        assert!(entry.other_forms.iter().all(|f| f.reading.is_empty()));
    }

    #[test]
    fn test_meanings_join_per_sense_not_per_gloss() {
        let word = JmdictWord {
            id: "1000005".to_string(),
            kanji: vec![],
            kana: vec![kana_all("いぬ", true)],
            sense: vec![sense(&["dog", "hound"]), sense(&["spy", "snitch"])],
        };

        let entry = to_word(&word);
        assert_eq!(
            entry.meanings,
            vec!["dog; hound".to_string(), "spy; snitch".to_string()]
        );
    }

    #[test]
    fn test_to_searchable_projects_all_fields() {
        let word = JmdictWord {
            id: "1000006".to_string(),
            kanji: vec![kanji("暖かい", true), kanji("温かい", false)],
            kana: vec![kana_all("あたたかい", true)],
            sense: vec![sense(&["warm"]), sense(&["mild"])],
        };

        let entry = to_searchable(&word).unwrap();
        assert_eq!(entry.id, "1000006");
        assert_eq!(entry.kanji_exact, entry.kanji_char);
        assert_eq!(entry.kanji_exact, vec!["暖かい", "温かい"]);
        assert_eq!(entry.kana_exact, vec!["あたたかい"]);
        assert_eq!(entry.meanings, vec!["warm", "mild"]);
    }

    #[test]
    fn test_to_searchable_keeps_english_glosses_only() {
        let mut mixed = sense(&["dog"]);
        mixed.gloss.push(JmdictGloss {
            lang: "ger".to_string(),
            text: "Hund".to_string(),
        });

        let word = JmdictWord {
            id: "1000007".to_string(),
            kanji: vec![],
            kana: vec![kana_all("いぬ", true)],
            sense: vec![mixed],
        };

        let entry = to_searchable(&word).unwrap();
        assert_eq!(entry.meanings, vec!["dog"]);
    }

    #[test]
    fn test_to_searchable_rejects_empty_texts() {
        let empty_kanji = JmdictWord {
            id: "bad1".to_string(),
            kanji: vec![kanji("", true)],
            kana: vec![],
            sense: vec![],
        };
        assert!(matches!(
            to_searchable(&empty_kanji),
            Err(ImportError::EmptyField { id }) if id == "bad1"
        ));

        let empty_kana = JmdictWord {
            id: "bad2".to_string(),
            kanji: vec![],
            kana: vec![kana_all("", true)],
            sense: vec![],
        };
        assert!(matches!(
            to_searchable(&empty_kana),
            Err(ImportError::EmptyField { .. })
        ));

        let empty_gloss = JmdictWord {
            id: "bad3".to_string(),
            kanji: vec![],
            kana: vec![kana_all("いぬ", true)],
            sense: vec![sense(&[""])],
        };
        assert!(matches!(
            to_searchable(&empty_gloss),
            Err(ImportError::EmptyField { .. })
        ));
    }

    #[test]
    fn test_to_searchable_ignores_empty_non_english_gloss() {
        // Only visited fields are checked; non-English glosses are never
        // visited by the index projection.
        let mut s = sense(&["dog"]);
        s.gloss.push(JmdictGloss {
            lang: "ger".to_string(),
            text: String::new(),
        });

        let word = JmdictWord {
            id: "1000008".to_string(),
            kanji: vec![],
            kana: vec![kana_all("いぬ", true)],
            sense: vec![s],
        };

        assert!(to_searchable(&word).is_ok());
    }
}
