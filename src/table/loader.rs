//! Row loading, optionally on a background thread
//!
//! A [`RowLoader`] owns the [`RowSource`] of one table. Synchronous sources
//! are fetched inline; asynchronous ones are fetched on a worker thread whose
//! result is picked up by [`RowLoader::poll`] once per frame.

use crate::error::LoadError;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

/// Provider of table rows
pub trait RowSource<R>: Send + Sync {
    /// Version of the underlying data. A load is skipped when the revision
    /// has not changed since the last successful load.
    fn revision(&self) -> u64 {
        0
    }

    /// Whether `fetch` is slow and must run off the UI thread
    fn is_async(&self) -> bool {
        false
    }

    fn fetch(&self) -> Result<Vec<R>, LoadError>;
}

/// Progress of the current load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    NotStarted,
    InFlight,
    Completed,
    Failed(LoadError),
}

impl LoadState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, LoadState::InFlight)
    }
}

type Fetched<R> = Result<Vec<R>, LoadError>;

pub struct RowLoader<R> {
    source: Arc<dyn RowSource<R>>,
    state: LoadState,
    receiver: Option<mpsc::Receiver<Fetched<R>>>,
    /// Revision of the in-flight or last completed load
    revision: Option<u64>,
}

impl<R: Send + 'static> RowLoader<R> {
    pub fn new(source: Arc<dyn RowSource<R>>) -> Self {
        RowLoader {
            source,
            state: LoadState::NotStarted,
            receiver: None,
            revision: None,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Start a load unless the source is unchanged since the last one.
    ///
    /// Returns the rows when the source is synchronous.
    pub fn load(&mut self) -> Option<Vec<R>> {
        let revision = self.source.revision();
        let current = matches!(self.state, LoadState::InFlight | LoadState::Completed);
        if current && self.revision == Some(revision) {
            return None;
        }
        self.start(revision)
    }

    /// Start a load even if the source is unchanged
    pub fn reload(&mut self) -> Option<Vec<R>> {
        let revision = self.source.revision();
        self.start(revision)
    }

    fn start(&mut self, revision: u64) -> Option<Vec<R>> {
        self.revision = Some(revision);
        // A newer load supersedes a pending one
        self.receiver = None;

        if !self.source.is_async() {
            return self.finish(self.source.fetch());
        }

        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let spawned = thread::Builder::new()
            .name("row-loader".to_string())
            .spawn(move || {
                let _ = tx.send(source.fetch());
            });
        match spawned {
            Ok(_) => {
                tracing::debug!(revision, "row load started");
                self.receiver = Some(rx);
                self.state = LoadState::InFlight;
                None
            }
            Err(e) => self.finish(Err(LoadError::Source(e.to_string()))),
        }
    }

    /// Pick up the result of a background load, if it arrived
    pub fn poll(&mut self) -> Option<Vec<R>> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(result) => {
                self.receiver = None;
                self.finish(result)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.receiver = None;
                self.finish(Err(LoadError::Disconnected))
            }
        }
    }

    fn finish(&mut self, result: Fetched<R>) -> Option<Vec<R>> {
        match result {
            Ok(rows) => {
                tracing::info!(rows = rows.len(), "rows loaded");
                self.state = LoadState::Completed;
                Some(rows)
            }
            Err(e) => {
                tracing::warn!(error = %e, "row load failed");
                self.state = LoadState::Failed(e);
                // A failed load is retried on the next request
                self.revision = None;
                None
            }
        }
    }
}
