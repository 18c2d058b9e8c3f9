//! The ingestion session: sole owner of the published dataset snapshot.
//!
//! Consumers read whatever snapshot is current; a reload builds the next
//! snapshot completely off to the side and swaps the reference in one step,
//! so a partially-built dataset is never visible. The reload lock serializes
//! concurrent refresh triggers (one interactive user is the norm, but an
//! embedding server must not race two reloads).

use crate::config::Config;
use crate::dataset::{Dataset, LabelEdit};
use crate::ingest;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::info;

pub struct Session {
    config: Config,
    snapshot: RwLock<Arc<Dataset>>,
    reload_lock: Mutex<()>,
}

impl Session {
    /// Creates a session with an empty snapshot. Call [`Session::reload`] to
    /// perform the first ingestion pass.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            snapshot: RwLock::new(Arc::new(Dataset::default())),
            reload_lock: Mutex::new(()),
        }
    }

    /// Creates a session and runs the first ingestion pass.
    pub fn open(config: Config) -> Self {
        let session = Self::new(config);
        session.reload();
        session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The currently published snapshot.
    pub fn current(&self) -> Arc<Dataset> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs a full ingestion pass over the data directory and publishes the
    /// result. Returns the new snapshot.
    pub fn reload(&self) -> Arc<Dataset> {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let next = Arc::new(ingest::load_all(&self.config));
        info!(
            "Publishing snapshot: {} months, {} transactions, {} errors",
            next.summary().len(),
            next.transactions().len(),
            next.errors().len()
        );
        self.publish(next.clone());
        next
    }

    /// Applies label edits to the current snapshot and publishes the edited
    /// copy. Returns the new snapshot and how many transactions changed.
    pub fn relabel(&self, edits: &[LabelEdit]) -> (Arc<Dataset>, usize) {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (next, updated) = self.current().with_label_edits(edits);
        let next = Arc::new(next);
        self.publish(next.clone());
        (next, updated)
    }

    fn publish(&self, next: Arc<Dataset>) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = next;
    }
}
