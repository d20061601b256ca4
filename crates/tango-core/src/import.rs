//! Concurrent batch importer.
//!
//! The whole source decodes up front; workers pull records from a bounded
//! channel (capacity = batch size, so the producer blocks when they fall
//! behind), accumulate disjoint local batches, and commit each batch with
//! two sequential bulk writes: document store first, then index. The first
//! failure anywhere cancels the shared token and aborts the run — batches
//! already committed stay committed, there is no rollback.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use kanal::AsyncReceiver;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use tango_jmdict::{Jmdict, JmdictWord};

use crate::error::ImportError;
use crate::index::SearchIndex;
use crate::normalize::{to_searchable, to_word};
use crate::store::WordStore;
use crate::word::{SearchableWord, Word};

const PROGRESS_EVERY: usize = 1000;

#[derive(Debug, Clone)]
pub struct ImportReport {
    pub words_imported: usize,
    pub elapsed: Duration,
}

pub struct Importer {
    index: Arc<SearchIndex>,
    store: Arc<WordStore>,
    batch_size: usize,
    workers: usize,
}

impl Importer {
    pub fn new(
        index: Arc<SearchIndex>,
        store: Arc<WordStore>,
        batch_size: usize,
        workers: usize,
    ) -> Self {
        Importer {
            index,
            store,
            batch_size: batch_size.max(1),
            workers: workers.max(1),
        }
    }

    /// Import a dictionary source file. With `rebuild`, any previously
    /// persisted documents and index entries are dropped first — the drop
    /// and the reimport are not atomic, so a crash in between leaves this
    /// version's state undefined.
    pub async fn run(&self, path: &Path, rebuild: bool) -> Result<ImportReport, ImportError> {
        let file = File::open(path)?;
        let source = Jmdict::from_reader(BufReader::new(file))?;
        tracing::info!(
            version = %source.metadata.version,
            words = source.words.len(),
            "dictionary source decoded"
        );

        if rebuild {
            tracing::warn!("rebuild requested, dropping existing store and index");
            self.store.clear()?;
            self.index.delete_all()?;
        }

        self.store.put_tags(&source.metadata.tags)?;

        let total = source.words.len();
        let (tx, rx) = kanal::bounded_async::<JmdictWord>(self.batch_size);
        let cancel = CancellationToken::new();
        let started = Instant::now();

        let mut workers: JoinSet<Result<(), ImportError>> = JoinSet::new();
        for _ in 0..self.workers {
            workers.spawn(import_worker(
                rx.clone(),
                Arc::clone(&self.index),
                Arc::clone(&self.store),
                self.batch_size,
                cancel.clone(),
            ));
        }
        drop(rx);

        let mut produced = 0usize;
        for word in source.words {
            if cancel.is_cancelled() {
                break;
            }
            // Send fails only once every worker is gone; the join below
            // surfaces whatever made them leave.
            if tx.send(word).await.is_err() {
                break;
            }
            produced += 1;
            if produced % PROGRESS_EVERY == 0 {
                let per_second = produced as f64 / started.elapsed().as_secs_f64();
                tracing::info!(produced, total, per_second, "importing");
            }
        }
        drop(tx);

        let mut first_error: Option<ImportError> = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
                Err(join_err) => {
                    if first_error.is_none() {
                        first_error = Some(ImportError::Worker(join_err.to_string()));
                    }
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        let report = ImportReport {
            words_imported: produced,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            words = report.words_imported,
            elapsed = ?report.elapsed,
            "import completed"
        );
        Ok(report)
    }
}

/// One pool worker: accumulate a local batch, flush at the threshold, flush
/// the remainder on channel close. Observes the cancellation token before
/// every pull so a sibling's failure stops the pool instead of letting it
/// drain the queue.
async fn import_worker(
    rx: AsyncReceiver<JmdictWord>,
    index: Arc<SearchIndex>,
    store: Arc<WordStore>,
    batch_size: usize,
    cancel: CancellationToken,
) -> Result<(), ImportError> {
    let mut staged_words: Vec<Word> = Vec::with_capacity(batch_size);
    let mut staged_entries: Vec<SearchableWord> = Vec::with_capacity(batch_size);

    loop {
        let word = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            received = rx.recv() => match received {
                Ok(word) => word,
                Err(_) => break, // channel closed and drained
            },
        };

        let entry = match to_searchable(&word) {
            Ok(entry) => entry,
            Err(err) => {
                cancel.cancel();
                return Err(err);
            }
        };
        staged_entries.push(entry);
        staged_words.push(to_word(&word));

        if staged_words.len() >= batch_size {
            if let Err(err) = flush(&index, &store, &mut staged_words, &mut staged_entries) {
                cancel.cancel();
                return Err(err);
            }
        }
    }

    if !staged_words.is_empty() {
        if let Err(err) = flush(&index, &store, &mut staged_words, &mut staged_entries) {
            cancel.cancel();
            return Err(err);
        }
    }

    Ok(())
}

/// Two sequential bulk writes: store first, index second. Order within the
/// batch is preserved; order across workers is not.
fn flush(
    index: &SearchIndex,
    store: &WordStore,
    words: &mut Vec<Word>,
    entries: &mut Vec<SearchableWord>,
) -> Result<(), ImportError> {
    store.put_batch(words)?;
    index.add_batch(entries)?;
    words.clear();
    entries.clear();
    Ok(())
}
