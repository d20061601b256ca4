//! Two-phase read path: ranked IDs from the index, full records from the
//! store, then a stable re-sort to put the store's arbitrarily-ordered
//! results back into index rank order.

use std::sync::Arc;

use unicode_normalization::UnicodeNormalization;

use crate::error::SearchError;
use crate::index::SearchIndex;
use crate::query::QueryPlan;
use crate::script::Script;
use crate::store::WordStore;
use crate::word::Word;

/// What a search produced. `Empty` is a first-class outcome, not an error:
/// callers render "not found", never an error page.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Vec<Word>),
    Empty,
}

pub struct Searcher {
    index: Arc<SearchIndex>,
    store: Arc<WordStore>,
}

impl Searcher {
    pub fn new(index: Arc<SearchIndex>, store: Arc<WordStore>) -> Self {
        Searcher { index, store }
    }

    pub fn search(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let term = normalize_query(query);
        let script = Script::classify(&term);
        let plan = QueryPlan::build(&term, script);
        tracing::debug!(term = %term, script = ?script, "executing search");

        let ids = self.index.search(&plan)?;
        if ids.is_empty() {
            return Ok(SearchOutcome::Empty);
        }

        let words = self.store.get_many(&ids)?;
        let ordered = sort_by_rank(words, &ids);
        Ok(SearchOutcome::Found(ordered))
    }
}

/// Case folding plus NFKC, so full-width romaji and half-width katakana
/// match what the index was fed.
fn normalize_query(query: &str) -> String {
    query.trim().nfkc().collect::<String>().to_lowercase()
}

/// Stable re-sort of the store's results into the index's rank order.
/// A linear scan per comparison is fine at the capped page size.
fn sort_by_rank(mut words: Vec<Word>, target_order: &[String]) -> Vec<Word> {
    words.sort_by(|a, b| {
        for id in target_order {
            if a.id == *id {
                return std::cmp::Ordering::Less;
            }
            if b.id == *id {
                return std::cmp::Ordering::Greater;
            }
        }
        std::cmp::Ordering::Equal
    });
    words
}
