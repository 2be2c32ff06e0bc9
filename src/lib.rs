//! Single-line chat input for terminal programs.
//!
//! A [`ChatSession`] decodes raw terminal bytes into [`KeyEvent`]s, applies them to a
//! [`LineEditor`] with persistent [`HistoryStore`] recall, and renders a streamed transcript
//! ([`RenderBuffer`]) above the input row through one of two renderers:
//! - [`RenderMode::Reconciled`] diffs whole frames and redraws changed rows.
//! - [`RenderMode::Direct`] anchors on the cursor position reported at focus and writes
//!   only what changed there.
//!
//! Invariant: single output gate. Only `core::output::OutputGate::flush(..)` writes to the
//! terminal.

pub mod config;
pub mod logging;

pub mod core;
pub mod platform;
pub mod render;
pub mod runtime;

/// Key events, decoding and host hot keys.
pub use crate::core::hotkeys::{HotKeyFlow, HotKeys};
pub use crate::core::key::KeyEvent;
pub use crate::core::key_decoder::KeyDecoder;

/// Line editing.
pub use crate::core::input_line::InputLine;
pub use crate::core::line_editor::{EditOutcome, LineEditor};

/// Transcript storage.
pub use crate::core::render_buffer::{RenderBuffer, TailView};

/// Terminal interfaces and process-backed implementation.
pub use crate::core::output::{OutputGate, TerminalCmd};
pub use crate::core::terminal::Terminal;
pub use crate::platform::process_terminal::ProcessTerminal;

/// Renderers.
pub use crate::render::{
    Capabilities, DirectRenderer, LineView, ReconciledRenderer, RenderMode, Renderer,
    TerminalBridge, View,
};

/// Session runtime.
pub use crate::runtime::{ChatSession, SessionHandle, SessionOptions};

pub use crate::config::EnvConfig;
pub use crate::logging::{DebugLog, LogRecord};

/// Prompt history persistence.
pub use history_store::{
    default_history_path, HistoryBackend, HistoryStore, HistoryStoreError, JsonFileBackend,
    MemoryBackend,
};

/// ANSI-aware truncation helper.
pub use crate::core::text::utils::truncate_to_width;
/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
