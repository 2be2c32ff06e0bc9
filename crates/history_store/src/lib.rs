mod backend;
mod error;
mod paths;
mod persister;
mod store;

pub use backend::{HistoryBackend, JsonFileBackend, MemoryBackend};
pub use error::HistoryStoreError;
pub use paths::{default_history_path, history_path, history_root};
pub use store::{HistoryStore, HISTORY_CAPACITY};
