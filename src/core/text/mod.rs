//! Text helpers (ANSI skipping, display width, truncation, word classes).
//!
//! Pure string-in/string-out functions shared by the editor and the renderers.

pub mod ansi;
pub mod utils;
pub mod width;
