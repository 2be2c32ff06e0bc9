//! Environment configuration.

use std::env;
use std::path::PathBuf;

use crate::render::RenderMode;

pub const DEFAULT_DEBUG_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub render_mode: RenderMode,
    pub history_file: Option<PathBuf>,
    pub debug: bool,
    pub debug_log_capacity: usize,
    pub write_log: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            render_mode: env_string_opt("CHATLINE_RENDER_MODE")
                .and_then(|value| RenderMode::parse(&value))
                .unwrap_or_default(),
            history_file: env_string_opt("CHATLINE_HISTORY_FILE")
                .map(PathBuf::from)
                .or_else(history_store::default_history_path),
            debug: env_flag("CHATLINE_DEBUG"),
            debug_log_capacity: env_string_opt("CHATLINE_DEBUG_LOG_CAPACITY")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(DEFAULT_DEBUG_LOG_CAPACITY),
            write_log: env_string_opt("CHATLINE_WRITE_LOG"),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            history_file: None,
            debug: false,
            debug_log_capacity: DEFAULT_DEBUG_LOG_CAPACITY,
            write_log: None,
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
