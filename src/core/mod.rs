//! Input decoding, line editing and transcript storage.

pub mod hotkeys;
pub mod input_line;
pub mod key;
pub mod key_decoder;
pub mod line_editor;
pub mod output;
pub mod render_buffer;
pub mod terminal;
pub mod text;
