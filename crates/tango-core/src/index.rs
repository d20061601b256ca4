//! Tantivy-backed search index.
//!
//! Five indexed fields per document: the exact fields treat a whole spelling
//! as one lowercased token (keyword semantics), the char fields split
//! spellings into 2..3 char-grams for substring matching, and meanings get
//! the stock English stemmer. Only the ID is stored; hits resolve to full
//! records through the document store.

use std::path::Path;

use parking_lot::RwLock;
use serde::Deserialize;
use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, TermQuery};
use tantivy::schema::document::Document as _;
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions,
};
use tantivy::tokenizer::{LowerCaser, NgramTokenizer, RawTokenizer, TextAnalyzer};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use crate::error::IndexError;
use crate::query::{MatchKind, QueryPlan, SearchField};
use crate::word::SearchableWord;
use tango_jmdict::OneOrMany;

/// Results per query. No pagination surface exists, so offset is always 0.
pub const SEARCH_LIMIT: usize = 20;

const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// Whole spelling as a single lowercased token.
const TOKENIZER_EXACT: &str = "keyword_lower";
/// 2..3 char-grams, lowercased. Gives substring recall over kanji and kana.
const TOKENIZER_CHAR: &str = "jp_ngram";
/// Stock English tokenizer + stemmer, for glosses.
const TOKENIZER_MEANINGS: &str = "en_stem";

#[derive(Clone, Copy)]
struct IndexFields {
    id: Field,
    kanji_exact: Field,
    kanji_char: Field,
    kana_exact: Field,
    kana_char: Field,
    meanings: Field,
}

/// Stored fields of one search hit. Field values come back as lists but a
/// single-valued field may arrive as a bare scalar, so decoding goes through
/// [`OneOrMany`] once and the rest of the code sees plain values.
#[derive(Debug, Deserialize)]
struct IndexHit {
    id: OneOrMany<String>,
}

pub struct SearchIndex {
    index: Index,
    writer: RwLock<IndexWriter>,
    reader: IndexReader,
    fields: IndexFields,
}

impl SearchIndex {
    /// Open or create the index at `path`.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        std::fs::create_dir_all(path)?;
        let dir = MmapDirectory::open(path)?;
        let schema = Self::schema();
        let index = Index::open_or_create(dir, schema)?;
        Self::from_index(index)
    }

    /// In-RAM index for tests.
    pub fn in_memory() -> Result<Self, IndexError> {
        let index = Index::create_in_ram(Self::schema());
        Self::from_index(index)
    }

    fn from_index(index: Index) -> Result<Self, IndexError> {
        Self::register_tokenizers(&index);

        let writer = index.writer(WRITER_MEMORY_BYTES)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        let schema = index.schema();
        let field = |name: &str| {
            schema
                .get_field(name)
                .expect("schema field registered at build time")
        };
        let fields = IndexFields {
            id: field("id"),
            kanji_exact: field("kanji_exact"),
            kanji_char: field("kanji_char"),
            kana_exact: field("kana_exact"),
            kana_char: field("kana_char"),
            meanings: field("meanings"),
        };

        Ok(SearchIndex {
            index,
            writer: RwLock::new(writer),
            reader,
            fields,
        })
    }

    fn schema() -> Schema {
        let mut builder = Schema::builder();

        // ID is retrieval-only: raw-indexed so upserts can delete by term,
        // stored so hits can be resolved, never tokenized.
        builder.add_text_field("id", STRING | STORED);

        let exact = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(TOKENIZER_EXACT)
                .set_index_option(IndexRecordOption::Basic),
        );
        builder.add_text_field("kanji_exact", exact.clone());
        builder.add_text_field("kana_exact", exact);

        let char_gram = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(TOKENIZER_CHAR)
                .set_index_option(IndexRecordOption::WithFreqs),
        );
        builder.add_text_field("kanji_char", char_gram.clone());
        builder.add_text_field("kana_char", char_gram);

        let meanings = TextOptions::default().set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(TOKENIZER_MEANINGS)
                .set_index_option(IndexRecordOption::WithFreqsAndPositions),
        );
        builder.add_text_field("meanings", meanings);

        builder.build()
    }

    fn register_tokenizers(index: &Index) {
        let exact = TextAnalyzer::builder(RawTokenizer::default())
            .filter(LowerCaser)
            .build();
        index.tokenizers().register(TOKENIZER_EXACT, exact);

        let char_gram = TextAnalyzer::builder(
            NgramTokenizer::new(2, 3, false).expect("valid ngram bounds"),
        )
        .filter(LowerCaser)
        .build();
        index.tokenizers().register(TOKENIZER_CHAR, char_gram);
    }

    /// Add a batch of documents and commit them in one visible unit.
    ///
    /// Concurrent callers are fine: additions take the writer read lock,
    /// the commit serializes behind the write lock. Existing documents with
    /// the same ID are replaced.
    pub fn add_batch(&self, entries: &[SearchableWord]) -> Result<(), IndexError> {
        {
            let writer = self.writer.read();
            for entry in entries {
                writer.delete_term(Term::from_field_text(self.fields.id, &entry.id));

                let mut doc = TantivyDocument::default();
                doc.add_text(self.fields.id, &entry.id);
                for kanji in &entry.kanji_exact {
                    doc.add_text(self.fields.kanji_exact, kanji);
                }
                for kanji in &entry.kanji_char {
                    doc.add_text(self.fields.kanji_char, kanji);
                }
                for kana in &entry.kana_exact {
                    doc.add_text(self.fields.kana_exact, kana);
                }
                for kana in &entry.kana_char {
                    doc.add_text(self.fields.kana_char, kana);
                }
                for meaning in &entry.meanings {
                    doc.add_text(self.fields.meanings, meaning);
                }
                writer.add_document(doc)?;
            }
        }

        self.writer.write().commit()?;
        self.reader.reload()?;
        Ok(())
    }

    /// Delete every document. Used by rebuild before reimporting.
    pub fn delete_all(&self) -> Result<(), IndexError> {
        let mut writer = self.writer.write();
        writer.delete_all_documents()?;
        writer.commit()?;
        drop(writer);
        self.reader.reload()?;
        Ok(())
    }

    /// Execute a query plan and return hit IDs in rank order.
    ///
    /// A hit whose stored fields don't decode is logged and dropped; a bad
    /// document never fails the whole search.
    pub fn search(&self, plan: &QueryPlan) -> Result<Vec<String>, IndexError> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        for clause in &plan.clauses {
            if let Some(query) = self.lower_clause(clause.field, clause.kind, clause.boost, &plan.term) {
                clauses.push((Occur::Should, query));
            }
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let query = BooleanQuery::new(clauses);
        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(SEARCH_LIMIT))?;

        let schema = self.index.schema();
        let mut ids = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let named = doc.to_named_doc(&schema);
            let hit: IndexHit = match serde_json::to_value(&named)
                .and_then(serde_json::from_value)
            {
                Ok(hit) => hit,
                Err(err) => {
                    tracing::warn!(error = %err, "dropping undecodable search hit");
                    continue;
                }
            };
            match hit.id.first() {
                Some(id) => ids.push(id),
                None => tracing::warn!("dropping search hit without an id field"),
            }
        }

        Ok(ids)
    }

    /// Lower one plan clause to an engine query. Returns `None` when the
    /// term yields no tokens for the clause's analyzer (e.g. a single char
    /// against the 2..3 char-gram field).
    fn lower_clause(
        &self,
        field: SearchField,
        kind: MatchKind,
        boost: f32,
        term: &str,
    ) -> Option<Box<dyn Query>> {
        let field = self.resolve(field);
        let inner: Box<dyn Query> = match kind {
            MatchKind::Exact => Box::new(TermQuery::new(
                Term::from_field_text(field, term),
                IndexRecordOption::Basic,
            )),
            MatchKind::CharGram => self.token_disjunction(TOKENIZER_CHAR, field, term)?,
            MatchKind::Tokenized => self.token_disjunction(TOKENIZER_MEANINGS, field, term)?,
        };
        Some(Box::new(BoostQuery::new(inner, boost)))
    }

    /// OR of one term query per analyzer token; at least one token must
    /// match for the clause to contribute.
    fn token_disjunction(
        &self,
        tokenizer: &str,
        field: Field,
        text: &str,
    ) -> Option<Box<dyn Query>> {
        let mut analyzer = self
            .index
            .tokenizers()
            .get(tokenizer)
            .expect("tokenizer registered at open");
        let mut stream = analyzer.token_stream(text);
        let mut terms: Vec<(Occur, Box<dyn Query>)> = Vec::new();
        while stream.advance() {
            let term = Term::from_field_text(field, &stream.token().text);
            terms.push((
                Occur::Should,
                Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
            ));
        }
        if terms.is_empty() {
            return None;
        }
        Some(Box::new(BooleanQuery::new(terms)))
    }

    fn resolve(&self, field: SearchField) -> Field {
        match field {
            SearchField::KanjiExact => self.fields.kanji_exact,
            SearchField::KanjiChar => self.fields.kanji_char,
            SearchField::KanaExact => self.fields.kana_exact,
            SearchField::KanaChar => self.fields.kana_char,
            SearchField::Meanings => self.fields.meanings,
        }
    }

    /// Number of indexed documents, for import sanity checks.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}

#[cfg(test)]
mod tests {
    use crate::query::QueryPlan;
    use crate::script::Script;
    use crate::word::SearchableWord;

    use super::*;

    fn entry(id: &str, kana: &str, meanings: &[&str]) -> SearchableWord {
        SearchableWord {
            id: id.to_string(),
            kana_exact: vec![kana.to_string()],
            kana_char: vec![kana.to_string()],
            meanings: meanings.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let index = SearchIndex::in_memory().unwrap();
        index.add_batch(&[entry("1", "いや", &["no"])]).unwrap();
        index.add_batch(&[entry("1", "いや", &["disagreeable"])]).unwrap();
        assert_eq!(index.num_docs(), 1);
    }

    #[test]
    fn test_exact_kana_match_ranks_above_char_gram_match() {
        let index = SearchIndex::in_memory().unwrap();
        index
            .add_batch(&[
                entry("chargram", "いやいや", &["reluctantly"]),
                entry("exact", "いや", &["unpleasant"]),
            ])
            .unwrap();

        let plan = QueryPlan::build("いや", Script::Kana);
        let ids = index.search(&plan).unwrap();
        assert_eq!(ids.first().map(String::as_str), Some("exact"));
        assert!(ids.contains(&"chargram".to_string()));
    }

    #[test]
    fn test_meanings_field_matches_glosses() {
        let index = SearchIndex::in_memory().unwrap();
        index
            .add_batch(&[entry("1", "あたたかい", &["warm weather"])])
            .unwrap();

        let plan = QueryPlan::build("warm", Script::Latin);
        assert_eq!(index.search(&plan).unwrap(), vec!["1".to_string()]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let index = SearchIndex::in_memory().unwrap();
        index.add_batch(&[entry("1", "いや", &["no"])]).unwrap();

        let plan = QueryPlan::build("zzzz", Script::Latin);
        assert!(index.search(&plan).unwrap().is_empty());
    }

    #[test]
    fn test_delete_all_empties_the_index() {
        let index = SearchIndex::in_memory().unwrap();
        index.add_batch(&[entry("1", "いや", &["no"])]).unwrap();
        index.delete_all().unwrap();
        assert_eq!(index.num_docs(), 0);
    }
}
