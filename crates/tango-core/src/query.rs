//! Query planning.
//!
//! A [`QueryPlan`] is a pure description of the weighted boolean query the
//! index executes: three independent field groups (meanings, kana, kanji)
//! combined with logical OR. The index wrapper lowers the plan to concrete
//! engine queries; nothing here touches tantivy.

use crate::script::Script;

/// Boost for an exact whole-spelling match.
pub const EXACT_BOOST: f32 = 2.0;
/// Boost for a char-gram (substring/fuzzy) match.
pub const CHAR_BOOST: f32 = 0.5;
/// Boost for a meanings match.
pub const MEANINGS_BOOST: f32 = 1.0;

/// Named index fields a clause can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    KanjiExact,
    KanjiChar,
    KanaExact,
    KanaChar,
    Meanings,
}

/// How the clause matches its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The query is one whole-field token.
    Exact,
    /// The query is split into char-grams; at least one must match.
    CharGram,
    /// The query is tokenized/stemmed like regular text.
    Tokenized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldClause {
    pub field: SearchField,
    pub kind: MatchKind,
    pub boost: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub term: String,
    pub script: Script,
    /// Disjunctive clauses: a document matches if any clause matches.
    pub clauses: Vec<FieldClause>,
}

impl QueryPlan {
    /// Build the plan for a query term.
    ///
    /// Policy: all three field groups are always searched, whatever the
    /// classified script says. The classification rides along for logging
    /// and future per-script weighting only. Exact clauses outweigh
    /// char-gram clauses on the same text by construction
    /// ([`EXACT_BOOST`] > [`CHAR_BOOST`]).
    pub fn build(term: &str, script: Script) -> QueryPlan {
        let clauses = vec![
            FieldClause {
                field: SearchField::Meanings,
                kind: MatchKind::Tokenized,
                boost: MEANINGS_BOOST,
            },
            FieldClause {
                field: SearchField::KanaExact,
                kind: MatchKind::Exact,
                boost: EXACT_BOOST,
            },
            FieldClause {
                field: SearchField::KanaChar,
                kind: MatchKind::CharGram,
                boost: CHAR_BOOST,
            },
            FieldClause {
                field: SearchField::KanjiExact,
                kind: MatchKind::Exact,
                boost: EXACT_BOOST,
            },
            FieldClause {
                field: SearchField::KanjiChar,
                kind: MatchKind::CharGram,
                boost: CHAR_BOOST,
            },
        ];

        QueryPlan {
            term: term.to_string(),
            script,
            clauses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields_of(plan: &QueryPlan) -> Vec<SearchField> {
        plan.clauses.iter().map(|c| c.field).collect()
    }

    #[test]
    fn test_all_field_groups_regardless_of_script() {
        let kana_plan = QueryPlan::build("いや", Script::Kana);
        let latin_plan = QueryPlan::build("warm", Script::Latin);
        let kanji_plan = QueryPlan::build("暖", Script::Kanji);

        assert_eq!(fields_of(&kana_plan), fields_of(&latin_plan));
        assert_eq!(fields_of(&kana_plan), fields_of(&kanji_plan));
        assert_eq!(kana_plan.clauses.len(), 5);
    }

    #[test]
    fn test_exact_outranks_char_gram() {
        let plan = QueryPlan::build("いや", Script::Kana);
        let exact_boost = plan
            .clauses
            .iter()
            .find(|c| c.kind == MatchKind::Exact)
            .unwrap()
            .boost;
        let char_boost = plan
            .clauses
            .iter()
            .find(|c| c.kind == MatchKind::CharGram)
            .unwrap()
            .boost;
        assert!(exact_boost > char_boost);
    }

    #[test]
    fn test_plan_carries_term_and_script() {
        let plan = QueryPlan::build("taberu", Script::Latin);
        assert_eq!(plan.term, "taberu");
        assert_eq!(plan.script, Script::Latin);
    }
}
