//! Append-only transcript text with a cheap tail view.

/// Accumulated transcript text and its line count.
///
/// `total_lines` is the number of newline characters plus one when the text does not end
/// in a newline (zero for empty text). It is maintained incrementally on append.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderBuffer {
    full_text: String,
    newlines: usize,
}

/// Last `max_lines` lines of a [`RenderBuffer`], borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailView<'a> {
    pub text: &'a str,
    pub hidden_lines_count: usize,
    pub total_lines: usize,
}

impl<'a> TailView<'a> {
    /// Visible lines, without a trailing empty segment.
    pub fn lines(&self) -> impl Iterator<Item = &'a str> {
        let text = self.text.strip_suffix('\n').unwrap_or(self.text);
        let empty = self.text.is_empty();
        text.split('\n').filter(move |_| !empty)
    }
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append streamed text; cost is proportional to `chunk`.
    pub fn append(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.newlines += count_newlines(chunk);
        self.full_text.push_str(chunk);
    }

    /// Replace the whole transcript.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.full_text = text.into();
        self.newlines = count_newlines(&self.full_text);
    }

    pub fn clear(&mut self) {
        self.full_text.clear();
        self.newlines = 0;
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn is_empty(&self) -> bool {
        self.full_text.is_empty()
    }

    pub fn total_lines(&self) -> usize {
        let unterminated = !self.full_text.is_empty() && !self.full_text.ends_with('\n');
        self.newlines + usize::from(unterminated)
    }

    /// The last `max_lines` lines. `0` means the whole buffer.
    ///
    /// Scans backwards from the end, so the cost depends on the tail, not on the transcript.
    pub fn get_tail(&self, max_lines: usize) -> TailView<'_> {
        let total_lines = self.total_lines();
        if max_lines == 0 || total_lines <= max_lines {
            return TailView {
                text: &self.full_text,
                hidden_lines_count: 0,
                total_lines,
            };
        }

        // A trailing newline closes the last line rather than opening a new one.
        let body = self
            .full_text
            .strip_suffix('\n')
            .unwrap_or(&self.full_text);
        let mut start = body.len();
        let mut seen = 0;
        for (offset, byte) in body.bytes().enumerate().rev() {
            if byte == b'\n' {
                seen += 1;
                if seen == max_lines {
                    start = offset + 1;
                    break;
                }
            }
        }

        TailView {
            text: &self.full_text[start..],
            hidden_lines_count: total_lines - max_lines,
            total_lines,
        }
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|byte| *byte == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::RenderBuffer;

    #[test]
    fn line_count_follows_trailing_newline_rule() {
        let mut buffer = RenderBuffer::new();
        assert_eq!(buffer.total_lines(), 0);

        buffer.append("Line 1\n");
        buffer.append("Line 2\n");
        assert_eq!(buffer.total_lines(), 2);
        assert_eq!(buffer.full_text(), "Line 1\nLine 2\n");

        buffer.append("partial");
        assert_eq!(buffer.total_lines(), 3);
        buffer.append(" line\n\n");
        assert_eq!(buffer.total_lines(), 4);
    }

    #[test]
    fn streamed_chunks_split_mid_line_count_once() {
        let mut buffer = RenderBuffer::new();
        for chunk in ["He", "llo\nwo", "rld", "\n"] {
            buffer.append(chunk);
        }
        assert_eq!(buffer.total_lines(), 2);
    }

    #[test]
    fn tail_returns_everything_when_it_fits() {
        let mut buffer = RenderBuffer::new();
        buffer.set_text("a\nb\nc\n");

        let tail = buffer.get_tail(3);
        assert_eq!(tail.text, "a\nb\nc\n");
        assert_eq!(tail.hidden_lines_count, 0);

        let tail = buffer.get_tail(0);
        assert_eq!(tail.text, "a\nb\nc\n");
        assert_eq!(tail.total_lines, 3);
    }

    #[test]
    fn tail_keeps_trailing_newline() {
        let mut buffer = RenderBuffer::new();
        buffer.set_text("a\nb\nc\n");

        let tail = buffer.get_tail(2);
        assert_eq!(tail.text, "b\nc\n");
        assert_eq!(tail.hidden_lines_count, 1);
        assert_eq!(tail.lines().collect::<Vec<_>>(), ["b", "c"]);
    }

    #[test]
    fn tail_without_trailing_newline() {
        let mut buffer = RenderBuffer::new();
        buffer.set_text("a\nb\nc");

        let tail = buffer.get_tail(1);
        assert_eq!(tail.text, "c");
        assert_eq!(tail.hidden_lines_count, 2);
    }

    #[test]
    fn tail_preserves_blank_lines() {
        let mut buffer = RenderBuffer::new();
        buffer.set_text("a\n\n\nb\n");

        let tail = buffer.get_tail(3);
        assert_eq!(tail.text, "\n\nb\n");
        assert_eq!(tail.lines().collect::<Vec<_>>(), ["", "", "b"]);
    }

    #[test]
    fn empty_tail_has_no_lines() {
        let buffer = RenderBuffer::new();
        assert_eq!(buffer.get_tail(5).lines().count(), 0);
    }

    #[test]
    fn clear_and_set_text_reset_counts() {
        let mut buffer = RenderBuffer::new();
        buffer.append("x\ny\n");
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.total_lines(), 0);

        buffer.set_text("one");
        assert_eq!(buffer.total_lines(), 1);
    }
}
