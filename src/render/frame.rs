//! Screen composition shared by both renderers.

use crate::core::input_line::InputLine;
use crate::core::render_buffer::RenderBuffer;
use crate::core::text::utils::{sanitize_for_display, truncate_to_width};

/// Appended to every transcript row so styles never bleed into the next row.
pub const SEGMENT_RESET: &str = "\x1b[0m";

/// Everything a renderer reads to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub transcript: &'a RenderBuffer,
    pub line: &'a InputLine,
    pub prompt: &'a str,
    pub placeholder: &'a str,
}

/// Transcript rows for a region `height` rows tall, oldest first.
///
/// Only the tail that fits is read from the buffer. When lines are hidden, the first row
/// becomes a header counting them. Rows are sanitized and clipped to `width` (no wrapping,
/// so one transcript line is always one row).
pub fn transcript_rows(buffer: &RenderBuffer, height: usize, width: usize) -> Vec<String> {
    if height == 0 || width == 0 || buffer.is_empty() {
        return Vec::new();
    }

    let total = buffer.total_lines();
    let (header, tail) = if total <= height || height == 1 {
        (None, buffer.get_tail(height))
    } else {
        let tail = buffer.get_tail(height - 1);
        (Some(hidden_lines_header(tail.hidden_lines_count)), tail)
    };

    let mut rows = Vec::with_capacity(height);
    if let Some(header) = header {
        rows.push(format!(
            "\x1b[2m{}\x1b[22m",
            truncate_to_width(&header, width, "…", false)
        ));
    }
    for line in tail.lines() {
        let mut row = truncate_to_width(&sanitize_for_display(line), width, "…", false);
        row.push_str(SEGMENT_RESET);
        rows.push(row);
    }
    rows
}

fn hidden_lines_header(hidden: usize) -> String {
    if hidden == 1 {
        "… 1 earlier line".to_string()
    } else {
        format!("… {hidden} earlier lines")
    }
}
