//! LMDB-backed document store.
//!
//! Two named databases per dictionary version: `words_{version}` maps entry
//! ID to the bincode-encoded display record, `tags_{version}` maps tag name
//! to its human-readable description. Writes are idempotent upserts keyed by
//! ID, so batch replays and cross-worker interleaving are harmless.

use std::collections::HashMap;
use std::path::Path;

use bincode::config;
use bincode::serde::{decode_from_slice, encode_to_vec};
use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use crate::error::StoreError;
use crate::word::Word;

const ENV_MAP_SIZE_BYTES: usize = 1 << 30; // 1 GiB
const MAX_NAMED_DBS: u32 = 8;

pub struct WordStore {
    env: Env,
    words: Database<Str, Bytes>,
    tags: Database<Str, Str>,
}

impl WordStore {
    /// Open or create the store under `path`, scoped to one dictionary
    /// version.
    pub fn open(path: &Path, version: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;

        let mut options = EnvOpenOptions::new();
        options.max_dbs(MAX_NAMED_DBS);
        options.map_size(ENV_MAP_SIZE_BYTES);
        let env = unsafe {
            // SAFETY: LMDB requires callers to uphold environment lifetime invariants.
            options.open(path)?
        };

        let sanitized = version.replace('.', "_");
        let words_name = format!("words_{sanitized}");
        let tags_name = format!("tags_{sanitized}");

        let mut wtxn = env.write_txn()?;
        let words = env.create_database::<Str, Bytes>(&mut wtxn, Some(&words_name))?;
        let tags = env.create_database::<Str, Str>(&mut wtxn, Some(&tags_name))?;
        wtxn.commit()?;

        Ok(WordStore { env, words, tags })
    }

    /// Bulk upsert one batch of display records in a single transaction.
    pub fn put_batch(&self, words: &[Word]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn()?;
        for word in words {
            let encoded = encode_to_vec(word, config::standard())?;
            self.words.put(&mut wtxn, &word.id, encoded.as_slice())?;
        }
        wtxn.commit()?;
        Ok(())
    }

    /// Fetch every record whose ID is in `ids`, in one read transaction.
    /// Missing IDs are skipped; the return order is storage order, not
    /// request order — callers re-sort against their own ranking.
    pub fn get_many(&self, ids: &[String]) -> Result<Vec<Word>, StoreError> {
        let rtxn = self.env.read_txn()?;
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(raw) = self.words.get(&rtxn, id)? {
                let (word, _) = decode_from_slice::<Word, _>(raw, config::standard())?;
                results.push(word);
            }
        }
        Ok(results)
    }

    pub fn get(&self, id: &str) -> Result<Option<Word>, StoreError> {
        let rtxn = self.env.read_txn()?;
        match self.words.get(&rtxn, id)? {
            Some(raw) => {
                let (word, _) = decode_from_slice::<Word, _>(raw, config::standard())?;
                Ok(Some(word))
            }
            None => Ok(None),
        }
    }

    /// Persist the source's tag metadata (tag name -> description).
    pub fn put_tags(&self, tags: &HashMap<String, String>) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn()?;
        for (name, description) in tags {
            self.tags.put(&mut wtxn, name, description)?;
        }
        wtxn.commit()?;
        Ok(())
    }

    pub fn get_tag(&self, name: &str) -> Result<Option<String>, StoreError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.tags.get(&rtxn, name)?.map(str::to_owned))
    }

    /// Drop both databases' contents. Used by rebuild before reimporting.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn()?;
        self.words.clear(&mut wtxn)?;
        self.tags.clear(&mut wtxn)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn len(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.words.len(&rtxn)?)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::word::Furigana;

    use super::*;

    fn word(id: &str, main: &str) -> Word {
        Word {
            id: id.to_string(),
            main_word: Furigana::new(main, "よみ"),
            common: false,
            other_forms: vec![],
            meanings: vec!["meaning".to_string()],
        }
    }

    #[test]
    fn test_put_batch_and_get_many() {
        let dir = TempDir::new().unwrap();
        let store = WordStore::open(dir.path(), "3.5.0").unwrap();

        store
            .put_batch(&[word("1", "一"), word("2", "二"), word("3", "三")])
            .unwrap();
        assert_eq!(store.len().unwrap(), 3);

        let found = store.get_many(&["1".to_string(), "3".to_string(), "missing".to_string()])
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|w| w.id == "1"));
        assert!(found.iter().any(|w| w.id == "3"));
    }

    #[test]
    fn test_put_batch_upserts_by_id() {
        let dir = TempDir::new().unwrap();
        let store = WordStore::open(dir.path(), "3.5.0").unwrap();

        store.put_batch(&[word("1", "一")]).unwrap();
        store.put_batch(&[word("1", "壱")]).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get("1").unwrap().unwrap().main_word.word, "壱");
    }

    #[test]
    fn test_tags_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = WordStore::open(dir.path(), "3.5.0").unwrap();

        let mut tags = HashMap::new();
        tags.insert("sK".to_string(), "search-only kanji form".to_string());
        store.put_tags(&tags).unwrap();

        assert_eq!(
            store.get_tag("sK").unwrap().as_deref(),
            Some("search-only kanji form")
        );
        assert!(store.get_tag("unknown").unwrap().is_none());
    }

    #[test]
    fn test_clear_drops_everything() {
        let dir = TempDir::new().unwrap();
        let store = WordStore::open(dir.path(), "3.5.0").unwrap();

        store.put_batch(&[word("1", "一")]).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
        assert!(store.get("1").unwrap().is_none());
    }

    #[test]
    fn test_versions_are_isolated() {
        let dir = TempDir::new().unwrap();
        let old = WordStore::open(dir.path(), "3.5.0").unwrap();
        old.put_batch(&[word("1", "一")]).unwrap();
        drop(old);

        let new = WordStore::open(dir.path(), "3.6.0").unwrap();
        assert!(new.get("1").unwrap().is_none());
    }
}
