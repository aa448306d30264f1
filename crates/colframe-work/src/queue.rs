use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use crate::pool::run_workers;

/// Outcome of processing one column.
#[derive(Debug)]
pub struct ProcessedJob<T, E> {
    pub key: String,
    pub outcome: Result<T, E>,
}

impl<T, E> ProcessedJob<T, E> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_result(self) -> Result<(String, T), ColumnJobError<E>>
    where
        E: std::error::Error + 'static,
    {
        match self.outcome {
            Ok(value) => Ok((self.key, value)),
            Err(source) => Err(ColumnJobError {
                column: self.key,
                source,
            }),
        }
    }
}

/// A column-scoped failure reported by a queue worker.
#[derive(Debug, thiserror::Error)]
#[error("column `{column}` failed: {source}")]
pub struct ColumnJobError<E>
where
    E: std::error::Error + 'static,
{
    pub column: String,
    #[source]
    pub source: E,
}

/// Fail-fast scan over collected outcomes.
///
/// Returns every successful result keyed by column name, or the first error
/// in collection order. Collection order is arrival order, so "first" is only
/// deterministic when a single column fails.
pub fn first_error<T, E>(
    jobs: Vec<ProcessedJob<T, E>>,
) -> Result<HashMap<String, T>, ColumnJobError<E>>
where
    E: std::error::Error + 'static,
{
    let mut out = HashMap::with_capacity(jobs.len());
    for job in jobs {
        let (key, value) = job.into_result()?;
        out.insert(key, value);
    }
    Ok(out)
}

/// Hands column names out to a fixed number of workers.
///
/// Names are shuffled once at construction so that an expensive column
/// submitted last does not always end up alone on the tail worker. Workers
/// then pull one name at a time from a shared cursor, so faster workers
/// process more columns. Each name yields exactly one [`ProcessedJob`].
///
/// A failing column does not stop the other workers; inspect the outcomes
/// (e.g. with [`first_error`]) to decide whether to abort.
#[derive(Clone, Debug)]
pub struct ColumnQueue {
    keys: Vec<String>,
    workers: usize,
}

impl ColumnQueue {
    /// Builds a queue over `keys` with at most `max_workers` workers, shuffled
    /// with the thread-local RNG.
    pub fn new<I, S>(keys: I, max_workers: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_rng(keys, max_workers, &mut rand::thread_rng())
    }

    /// Same as [`ColumnQueue::new`] with an explicit shuffling source.
    pub fn with_rng<I, S, R>(keys: I, max_workers: usize, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: Rng + ?Sized,
    {
        let mut seen = HashSet::new();
        let mut keys: Vec<String> = keys
            .into_iter()
            .map(Into::into)
            .filter(|k| seen.insert(k.clone()))
            .collect();
        keys.shuffle(rng);

        let workers = if keys.is_empty() {
            1
        } else {
            max_workers.clamp(1, keys.len())
        };

        Self { keys, workers }
    }

    /// Number of workers the queue will run.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of distinct column names submitted.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Column names in the order workers will pull them.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Runs `work` over every column and collects one outcome per column.
    ///
    /// Outcomes arrive in completion order, not submission order.
    pub fn collect<T, E, F>(self, work: F) -> Vec<ProcessedJob<T, E>>
    where
        F: Fn(&str) -> Result<T, E> + Sync,
        T: Send,
        E: Send,
    {
        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();
        let keys = &self.keys;

        log::debug!(
            "column queue: {} columns on {} workers",
            keys.len(),
            self.workers
        );

        run_workers(self.workers, |worker| {
            let tx = tx.clone();
            let mut processed = 0usize;
            loop {
                let idx = next.fetch_add(1, Ordering::Relaxed);
                let Some(key) = keys.get(idx) else {
                    break;
                };
                let outcome = work(key);
                processed += 1;
                // The receiver outlives every worker, so the send cannot fail.
                let _ = tx.send(ProcessedJob {
                    key: key.clone(),
                    outcome,
                });
            }
            log::trace!("column queue worker {worker} processed {processed} columns");
        });
        drop(tx);

        let jobs: Vec<_> = rx.into_iter().collect();
        debug_assert_eq!(jobs.len(), self.keys.len());
        jobs
    }

    /// Runs `work` over every column, waits for all of them and discards the
    /// outcomes.
    pub fn wait<T, E, F>(self, work: F)
    where
        F: Fn(&str) -> Result<T, E> + Sync,
        T: Send,
        E: Send,
    {
        drop(self.collect(work));
    }
}
