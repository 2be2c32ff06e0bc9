//! Word classes, truncation and sanitizing for display.

use unicode_segmentation::UnicodeSegmentation;

use super::ansi::{ansi_sequence_len, is_style_sequence};
use super::width::{grapheme_width, visible_width, TAB_WIDTH};

const ANSI_RESET: &str = "\x1b[0m";

pub fn grapheme_segments(text: &str) -> unicode_segmentation::Graphemes<'_> {
    UnicodeSegmentation::graphemes(text, true)
}

pub fn is_whitespace_char(ch: char) -> bool {
    ch.is_whitespace()
}

/// Characters that end a word for word-wise deletion.
const WORD_PUNCTUATION: &str = "(){}[]<>.,;:'\"!?+-=*/\\|&%^$#@~`";

pub fn is_punctuation_char(ch: char) -> bool {
    WORD_PUNCTUATION.contains(ch)
}

/// Expand tabs, drop control characters, and keep only styling escape sequences.
///
/// Transcript text is arbitrary upstream output; a stray `\r`, bell, cursor move or screen
/// erase must not move the real cursor away from where the renderer thinks it is.
pub fn sanitize_for_display(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut idx = 0;
    while idx < line.len() {
        if let Some(len) = ansi_sequence_len(line, idx) {
            let seq = &line[idx..idx + len];
            if is_style_sequence(seq) {
                out.push_str(seq);
            }
            idx += len;
            continue;
        }
        let Some(ch) = line[idx..].chars().next() else {
            break;
        };
        idx += ch.len_utf8();
        if ch == '\t' {
            out.extend(std::iter::repeat(' ').take(TAB_WIDTH));
        } else if !ch.is_control() {
            out.push(ch);
        }
    }
    out
}

/// Clip `text` to `max_width` columns, keeping escape sequences and appending `ellipsis`
/// when anything was cut. With `pad`, fills with spaces up to `max_width`.
pub fn truncate_to_width(text: &str, max_width: usize, ellipsis: &str, pad: bool) -> String {
    if max_width == 0 {
        return String::new();
    }

    let text_width = visible_width(text);
    if text_width <= max_width {
        if pad {
            return format!("{text}{}", " ".repeat(max_width - text_width));
        }
        return text.to_string();
    }

    let ellipsis_width = visible_width(ellipsis);
    let target_width = max_width.saturating_sub(ellipsis_width);
    if target_width == 0 {
        return ellipsis.chars().take(max_width).collect();
    }

    let mut truncated = String::with_capacity(text.len());
    let mut current_width = 0;
    let mut idx = 0;
    'outer: while idx < text.len() {
        if let Some(len) = ansi_sequence_len(text, idx) {
            truncated.push_str(&text[idx..idx + len]);
            idx += len;
            continue;
        }
        let run_end = next_escape_or_end(text, idx);
        for grapheme in grapheme_segments(&text[idx..run_end]) {
            let width = grapheme_width(grapheme);
            if current_width + width > target_width {
                break 'outer;
            }
            truncated.push_str(grapheme);
            current_width += width;
        }
        idx = run_end;
    }

    truncated.push_str(ANSI_RESET);
    truncated.push_str(ellipsis);
    if pad {
        let result_width = visible_width(&truncated);
        if result_width < max_width {
            truncated.push_str(&" ".repeat(max_width - result_width));
        }
    }
    truncated
}

fn next_escape_or_end(input: &str, from: usize) -> usize {
    let mut idx = from;
    while idx < input.len() {
        if ansi_sequence_len(input, idx).is_some() {
            break;
        }
        match input[idx..].chars().next() {
            Some(ch) => idx += ch.len_utf8(),
            None => break,
        }
    }
    idx
}
