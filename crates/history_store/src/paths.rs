use std::env;
use std::path::{Path, PathBuf};

pub const HISTORY_DIR: &str = ".chatline";
pub const HISTORY_FILE_NAME: &str = "history.json";

#[must_use]
pub fn history_root(home: &Path) -> PathBuf {
    home.join(HISTORY_DIR)
}

#[must_use]
pub fn history_path(home: &Path) -> PathBuf {
    history_root(home).join(HISTORY_FILE_NAME)
}

/// Well-known history location under `$HOME`, if a home directory is known.
#[must_use]
pub fn default_history_path() -> Option<PathBuf> {
    env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| history_path(Path::new(&home)))
}
