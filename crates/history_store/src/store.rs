use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use crate::backend::HistoryBackend;
use crate::persister::Persister;

/// Maximum number of retained entries.
pub const HISTORY_CAPACITY: usize = 100;

/// Bounded, deduplicated list of submitted lines, most-recent-first.
///
/// Index 0 is always the most recently recorded entry. Persistence is
/// fire-and-forget: `record` never waits on the backend and never fails.
pub struct HistoryStore {
    entries: Vec<String>,
    persister: Option<Persister>,
    pending_load: Option<Receiver<Vec<String>>>,
    dirty_before_load: bool,
}

impl HistoryStore {
    /// History that lives only for this process.
    pub fn in_memory() -> Self {
        Self {
            entries: Vec::new(),
            persister: None,
            pending_load: None,
            dirty_before_load: false,
        }
    }

    /// Load synchronously, failing soft to an empty history.
    pub fn load(backend: Arc<dyn HistoryBackend>) -> Self {
        let entries = load_entries(backend.as_ref());
        Self {
            entries,
            persister: Some(Persister::spawn(backend)),
            pending_load: None,
            dirty_before_load: false,
        }
    }

    /// Start loading on a background thread.
    ///
    /// Until [`HistoryStore::poll_loaded`] observes the result, only entries recorded in
    /// this session are visible.
    pub fn spawn_load(backend: Arc<dyn HistoryBackend>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let loader_backend = Arc::clone(&backend);
        thread::spawn(move || {
            let _ = sender.send(load_entries(loader_backend.as_ref()));
        });
        Self {
            entries: Vec::new(),
            persister: Some(Persister::spawn(backend)),
            pending_load: Some(receiver),
            dirty_before_load: false,
        }
    }

    /// Build from already-known entries (most-recent-first) without persistence.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = Self::in_memory();
        store.entries = normalize(entries.into_iter().map(Into::into));
        store
    }

    /// Merge a completed background load, if any. Returns true once loading is done.
    pub fn poll_loaded(&mut self) -> bool {
        let Some(receiver) = self.pending_load.as_ref() else {
            return true;
        };
        match receiver.try_recv() {
            Ok(loaded) => {
                self.finish_load(loaded);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!(target: "history_store", "history loader exited without a result");
                self.finish_load(Vec::new());
                true
            }
        }
    }

    /// Block until a background load completes.
    pub fn wait_loaded(&mut self) {
        let Some(receiver) = self.pending_load.as_ref() else {
            return;
        };
        let loaded = receiver.recv().unwrap_or_default();
        self.finish_load(loaded);
    }

    pub fn is_loaded(&self) -> bool {
        self.pending_load.is_none()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move `entry` to the front, dropping any earlier duplicate and anything past capacity.
    ///
    /// Whitespace-only entries are ignored. Returns whether the history changed.
    pub fn record(&mut self, entry: &str) -> bool {
        if entry.trim().is_empty() {
            return false;
        }

        self.entries.retain(|existing| existing != entry);
        self.entries.insert(0, entry.to_string());
        self.entries.truncate(HISTORY_CAPACITY);

        if self.pending_load.is_some() {
            // Persisting now would clobber entries that are still loading.
            self.dirty_before_load = true;
        } else {
            self.persist();
        }
        true
    }

    /// Drop every entry (and persist the empty list).
    pub fn clear(&mut self) {
        self.entries.clear();
        if self.pending_load.is_some() {
            self.dirty_before_load = true;
        } else {
            self.persist();
        }
    }

    /// Wait for queued writes to reach the backend.
    pub fn flush(&self) {
        if let Some(persister) = self.persister.as_ref() {
            persister.flush();
        }
    }

    fn finish_load(&mut self, loaded: Vec<String>) {
        self.pending_load = None;
        let session = std::mem::take(&mut self.entries);
        self.entries = normalize(session.into_iter().chain(loaded));
        tracing::debug!(target: "history_store", entries = self.entries.len(), "history loaded");
        if std::mem::take(&mut self.dirty_before_load) {
            self.persist();
        }
    }

    fn persist(&self) {
        if let Some(persister) = self.persister.as_ref() {
            persister.save(self.entries.clone());
        }
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("entries", &self.entries)
            .field("persistent", &self.persister.is_some())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

fn load_entries(backend: &dyn HistoryBackend) -> Vec<String> {
    match backend.load() {
        Ok(entries) => normalize(entries),
        Err(err) => {
            tracing::warn!(target: "history_store", error = %err, "ignoring unreadable history");
            Vec::new()
        }
    }
}

/// Keep first occurrences of non-blank entries, up to capacity.
fn normalize<I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for entry in entries {
        if out.len() == HISTORY_CAPACITY {
            break;
        }
        if entry.trim().is_empty() || out.contains(&entry) {
            continue;
        }
        out.push(entry);
    }
    out
}
