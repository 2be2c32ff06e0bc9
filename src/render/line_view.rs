//! Input line laid out for one terminal row.

use crate::core::input_line::InputLine;
use crate::core::text::utils::{grapheme_segments, sanitize_for_display, truncate_to_width};
use crate::core::text::width::{grapheme_width, visible_width};

const REVERSE_ON: &str = "\x1b[7m";
const REVERSE_OFF: &str = "\x1b[27m";
const DIM_ON: &str = "\x1b[2m";
const DIM_OFF: &str = "\x1b[22m";

/// Pre-cursor / at-cursor / post-cursor slices of the visible part of an input line.
///
/// When the line is wider than the row, the slices cover a window scrolled so the cursor
/// stays visible, kept near the middle while there is text on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineView {
    pub prompt: String,
    pub before: String,
    /// `None` when the cursor sits past the last character.
    pub at_cursor: Option<String>,
    pub after: String,
    /// Set instead of the slices when the line is empty.
    pub placeholder: Option<String>,
    /// Column of the cursor cell, counting the prompt.
    pub cursor_col: usize,
}

impl LineView {
    pub fn new(line: &InputLine, prompt: &str, placeholder: &str, width: usize) -> Self {
        let prompt = truncate_to_width(&sanitize_for_display(prompt), width, "", false);
        let prompt_width = visible_width(&prompt);
        let available = width.saturating_sub(prompt_width);

        if line.is_empty() {
            let placeholder = sanitize_for_display(placeholder);
            let placeholder = (!placeholder.is_empty() && available > 0)
                .then(|| truncate_to_width(&placeholder, available, "…", false));
            return Self {
                prompt,
                before: String::new(),
                at_cursor: None,
                after: String::new(),
                placeholder,
                cursor_col: prompt_width,
            };
        }

        // Clusters with their starting code-point offset and display width.
        let mut clusters: Vec<(usize, &str, usize)> = Vec::new();
        let mut offset = 0;
        for grapheme in grapheme_segments(line.text()) {
            clusters.push((offset, grapheme, grapheme_width(grapheme).max(1)));
            offset += grapheme.chars().count();
        }

        let cursor_index = clusters
            .iter()
            .position(|(start, _, _)| *start >= line.cursor())
            .unwrap_or(clusters.len());
        let (start, end) = visible_window(&clusters, cursor_index, available);

        let join = |range: std::ops::Range<usize>| -> String {
            clusters[range]
                .iter()
                .map(|(_, grapheme, _)| display_cluster(grapheme))
                .collect()
        };
        let before = join(start..cursor_index);
        let (at_cursor, after) = if cursor_index < clusters.len() {
            (
                Some(display_cluster(clusters[cursor_index].1)),
                join((cursor_index + 1).min(end)..end),
            )
        } else {
            (None, String::new())
        };
        let cursor_col = prompt_width + visible_width(&before);

        Self {
            prompt,
            before,
            at_cursor,
            after,
            placeholder: None,
            cursor_col,
        }
    }

    /// Row with a reverse-video software cursor.
    pub fn render_highlighted(&self) -> String {
        let mut out = String::with_capacity(self.prompt.len() + self.before.len() + 32);
        out.push_str(&self.prompt);
        if let Some(placeholder) = self.placeholder.as_deref() {
            let mut graphemes = grapheme_segments(placeholder);
            let first = graphemes.next().unwrap_or(" ");
            let rest: String = graphemes.collect();
            out.push_str(REVERSE_ON);
            out.push_str(first);
            out.push_str(REVERSE_OFF);
            out.push_str(DIM_ON);
            out.push_str(&rest);
            out.push_str(DIM_OFF);
            return out;
        }
        out.push_str(&self.before);
        out.push_str(REVERSE_ON);
        out.push_str(self.at_cursor.as_deref().unwrap_or(" "));
        out.push_str(REVERSE_OFF);
        out.push_str(&self.after);
        out
    }

    /// Row without cursor styling; the hardware cursor is placed at `cursor_col`.
    pub fn render_plain(&self) -> String {
        let mut out = String::with_capacity(self.prompt.len() + self.before.len() + 16);
        out.push_str(&self.prompt);
        if let Some(placeholder) = self.placeholder.as_deref() {
            out.push_str(DIM_ON);
            out.push_str(placeholder);
            out.push_str(DIM_OFF);
            return out;
        }
        out.push_str(&self.before);
        if let Some(at_cursor) = self.at_cursor.as_deref() {
            out.push_str(at_cursor);
        }
        out.push_str(&self.after);
        out
    }
}

fn display_cluster(grapheme: &str) -> String {
    if grapheme.chars().any(char::is_control) {
        // Control characters would move the real cursor; show a placeholder cell.
        "\u{fffd}".to_string()
    } else {
        grapheme.to_string()
    }
}

/// Cluster range `[start, end)` that fits `available` columns and contains the cursor cell.
fn visible_window(
    clusters: &[(usize, &str, usize)],
    cursor_index: usize,
    available: usize,
) -> (usize, usize) {
    let widths: Vec<usize> = clusters.iter().map(|(_, _, width)| *width).collect();
    let cursor_width = widths.get(cursor_index).copied().unwrap_or(1);
    let total: usize = widths.iter().sum::<usize>() + usize::from(cursor_index == clusters.len());
    if total <= available {
        return (0, clusters.len());
    }

    let half = available / 2;
    let mut start = cursor_index;
    let mut end = (cursor_index + 1).min(clusters.len());
    let mut used = cursor_width;

    while start > 0 && used + widths[start - 1] <= half {
        start -= 1;
        used += widths[start];
    }
    while end < clusters.len() && used + widths[end] <= available {
        used += widths[end];
        end += 1;
    }
    while start > 0 && used + widths[start - 1] <= available {
        start -= 1;
        used += widths[start];
    }
    (start, end)
}
