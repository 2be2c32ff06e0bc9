//! Editable single-line text with a code-point cursor.
//!
//! Every operation is a pure transformation returning a new line; text and cursor are
//! only ever replaced together, and every constructor clamps the cursor into
//! `[0, len]`, so no sequence of operations can leave the cursor out of range.

use crate::core::text::utils::{is_punctuation_char, is_whitespace_char};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    text: String,
    /// Offset in code points, always within `[0, len]`.
    cursor: usize,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line holding `text` with the cursor at its end.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    /// Line holding `text` with the cursor clamped into range.
    pub fn with_cursor(text: impl Into<String>, cursor: usize) -> Self {
        let text = text.into();
        let cursor = cursor.min(text.chars().count());
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in code points.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn before_cursor(&self) -> &str {
        &self.text[..self.byte_offset(self.cursor)]
    }

    pub fn after_cursor(&self) -> &str {
        &self.text[self.byte_offset(self.cursor)..]
    }

    /// Splice `text` at the cursor and advance past it.
    #[must_use]
    pub fn insert(&self, text: &str) -> Self {
        if text.is_empty() {
            return self.clone();
        }
        let at = self.byte_offset(self.cursor);
        let mut next = String::with_capacity(self.text.len() + text.len());
        next.push_str(&self.text[..at]);
        next.push_str(text);
        next.push_str(&self.text[at..]);
        Self::with_cursor(next, self.cursor + text.chars().count())
    }

    /// Remove up to `count` code points before the cursor.
    #[must_use]
    pub fn backspace(&self, count: usize) -> Self {
        let removed = count.min(self.cursor);
        if removed == 0 {
            return self.clone();
        }
        self.remove_range(self.cursor - removed, self.cursor)
    }

    /// Remove up to `count` code points after the cursor.
    #[must_use]
    pub fn delete_forward(&self, count: usize) -> Self {
        let end = self.cursor.saturating_add(count).min(self.len());
        if end == self.cursor {
            return self.clone();
        }
        self.remove_range(self.cursor, end)
    }

    /// Move by `delta` code points, clamped into `[0, len]`.
    #[must_use]
    pub fn move_cursor(&self, delta: isize) -> Self {
        let target = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta.unsigned_abs())
        };
        Self::with_cursor(self.text.clone(), target)
    }

    #[must_use]
    pub fn move_to_start(&self) -> Self {
        Self::with_cursor(self.text.clone(), 0)
    }

    #[must_use]
    pub fn move_to_end(&self) -> Self {
        Self::from_text(self.text.clone())
    }

    #[must_use]
    pub fn delete_to_start(&self) -> Self {
        self.remove_range(0, self.cursor)
    }

    #[must_use]
    pub fn delete_to_end(&self) -> Self {
        self.remove_range(self.cursor, self.len())
    }

    /// Delete the word (or punctuation run) before the cursor, plus any whitespace
    /// between it and the cursor.
    #[must_use]
    pub fn delete_word_backward(&self) -> Self {
        let chars: Vec<char> = self.before_cursor().chars().collect();
        let mut start = chars.len();

        while start > 0 && is_whitespace_char(chars[start - 1]) {
            start -= 1;
        }

        if start > 0 && is_punctuation_char(chars[start - 1]) {
            while start > 0 && is_punctuation_char(chars[start - 1]) {
                start -= 1;
            }
        } else {
            while start > 0
                && !is_whitespace_char(chars[start - 1])
                && !is_punctuation_char(chars[start - 1])
            {
                start -= 1;
            }
        }

        self.remove_range(start, self.cursor)
    }

    /// Text with surrounding whitespace removed, as submitted.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    fn remove_range(&self, start: usize, end: usize) -> Self {
        let start_byte = self.byte_offset(start);
        let end_byte = self.byte_offset(end);
        let mut next = String::with_capacity(self.text.len() - (end_byte - start_byte));
        next.push_str(&self.text[..start_byte]);
        next.push_str(&self.text[end_byte..]);
        Self::with_cursor(next, start)
    }

    /// Byte offset of code point `index`, or the text length past the end.
    fn byte_offset(&self, index: usize) -> usize {
        self.text
            .char_indices()
            .nth(index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.text.len())
    }
}
