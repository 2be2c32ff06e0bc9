use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::HistoryStoreError;

/// Storage collaborator for persisted history.
///
/// `load` returns entries most-recent-first. A missing store is `Ok(vec![])`, not an error.
pub trait HistoryBackend: Send + Sync {
    fn load(&self) -> Result<Vec<String>, HistoryStoreError>;
    fn save(&self, entries: &[String]) -> Result<(), HistoryStoreError>;
}

/// History persisted as a single JSON array of strings.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HistoryBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<String>, HistoryStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(HistoryStoreError::io(
                    "reading history file",
                    &self.path,
                    source,
                ))
            }
        };

        serde_json::from_str::<Vec<String>>(&raw)
            .map_err(|source| HistoryStoreError::json_parse(&self.path, source))
    }

    fn save(&self, entries: &[String]) -> Result<(), HistoryStoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| {
                    HistoryStoreError::io("creating history directory", parent, source)
                })?;
            }
        }

        let body = serde_json::to_string_pretty(entries)
            .map_err(|source| HistoryStoreError::json_serialize(&self.path, source))?;

        // Readers must never observe a half-written array.
        let temp_path = self.temp_path();
        fs::write(&temp_path, body)
            .map_err(|source| HistoryStoreError::io("writing history file", &temp_path, source))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|source| HistoryStoreError::io("replacing history file", &self.path, source))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: Vec<String>,
    saves: usize,
}

/// In-process backend. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::default();
        backend.lock().entries = entries.into_iter().map(Into::into).collect();
        backend
    }

    /// Last persisted snapshot.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    /// Number of completed saves.
    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl HistoryBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<String>, HistoryStoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, entries: &[String]) -> Result<(), HistoryStoreError> {
        let mut state = self.lock();
        state.entries = entries.to_vec();
        state.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HistoryBackend, JsonFileBackend, MemoryBackend};
    use crate::error::HistoryStoreError;

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let backend = JsonFileBackend::new(dir.path().join("nope.json"));
        assert_eq!(backend.load().expect("missing file is not an error"), Vec::<String>::new());
    }

    #[test]
    fn save_creates_parent_directories_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("nested").join("history.json");
        let backend = JsonFileBackend::new(&path);

        backend
            .save(&["newest".to_string(), "older".to_string()])
            .expect("save should succeed");

        assert!(path.exists());
        assert!(!dir.path().join("nested").join("history.json.tmp").exists());
        assert_eq!(
            backend.load().expect("load should succeed"),
            vec!["newest".to_string(), "older".to_string()]
        );
    }

    #[test]
    fn non_array_json_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("history.json");
        std::fs::write(&path, r#"{"entries": []}"#).expect("fixture should be written");

        let error = JsonFileBackend::new(&path)
            .load()
            .expect_err("object must not parse as history");
        assert!(matches!(error, HistoryStoreError::JsonParse { .. }));
    }

    #[test]
    fn memory_backend_clones_share_storage() {
        let backend = MemoryBackend::new();
        let other = backend.clone();
        other.save(&["a".to_string()]).expect("memory save is infallible");
        assert_eq!(backend.snapshot(), vec!["a".to_string()]);
        assert_eq!(backend.saves(), 1);
    }
}
