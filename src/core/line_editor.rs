//! Line editor: applies key events to an [`InputLine`] and walks history.

use history_store::HistoryStore;

use crate::core::input_line::InputLine;
use crate::core::key::KeyEvent;

/// What applying one key event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Text, cursor or browse position changed.
    Changed,
    /// The event belongs to the editor but had no effect (e.g. backspace at column 0).
    Unchanged,
    /// Return on a non-blank line. Carries the trimmed text; the line has been cleared.
    Submitted(String),
    /// The editor does not handle this event (Ctrl-C, Escape, Shift+Tab, ...).
    Ignored,
}

/// Current input line plus history browse position.
///
/// `history_index` is `None` while not browsing. Any text edit or clear ends browsing;
/// cursor motion does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    line: InputLine,
    history_index: Option<usize>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> &InputLine {
        &self.line
    }

    pub fn text(&self) -> &str {
        self.line.text()
    }

    pub fn cursor(&self) -> usize {
        self.line.cursor()
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    pub fn is_browsing(&self) -> bool {
        self.history_index.is_some()
    }

    /// Replace the whole line (cursor at end), ending any history browse.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.line = InputLine::from_text(text);
        self.history_index = None;
    }

    pub fn insert(&mut self, text: &str) -> bool {
        let next = self.line.insert(text);
        self.replace_text(next)
    }

    pub fn backspace(&mut self, count: usize) -> bool {
        let next = self.line.backspace(count);
        self.replace_text(next)
    }

    pub fn delete_forward(&mut self) -> bool {
        let next = self.line.delete_forward(1);
        self.replace_text(next)
    }

    pub fn delete_to_start(&mut self) -> bool {
        let next = self.line.delete_to_start();
        self.replace_text(next)
    }

    pub fn delete_to_end(&mut self) -> bool {
        let next = self.line.delete_to_end();
        self.replace_text(next)
    }

    pub fn delete_word_backward(&mut self) -> bool {
        let next = self.line.delete_word_backward();
        self.replace_text(next)
    }

    pub fn move_cursor(&mut self, delta: isize) -> bool {
        let next = self.line.move_cursor(delta);
        self.replace_cursor(next)
    }

    pub fn move_to_start(&mut self) -> bool {
        let next = self.line.move_to_start();
        self.replace_cursor(next)
    }

    pub fn move_to_end(&mut self) -> bool {
        let next = self.line.move_to_end();
        self.replace_cursor(next)
    }

    /// Empty the line and stop browsing history.
    pub fn clear(&mut self) -> bool {
        let changed = !self.line.is_empty() || self.history_index.is_some();
        self.line = InputLine::new();
        self.history_index = None;
        changed
    }

    /// Step one entry older. No-op on empty history or at the oldest entry.
    pub fn recall_previous(&mut self, history: &HistoryStore) -> bool {
        let next_index = match self.history_index {
            None => 0,
            Some(index) => index + 1,
        };
        let Some(entry) = history.get(next_index) else {
            return false;
        };
        self.line = InputLine::from_text(entry);
        self.history_index = Some(next_index);
        true
    }

    /// Step one entry newer; stepping past the newest leaves an empty line.
    pub fn recall_next(&mut self, history: &HistoryStore) -> bool {
        let Some(index) = self.history_index else {
            return false;
        };
        if index == 0 {
            return self.clear();
        }
        let newer = index - 1;
        match history.get(newer) {
            Some(entry) => {
                self.line = InputLine::from_text(entry);
                self.history_index = Some(newer);
            }
            // History shrank under us (e.g. cleared); bail out of browsing.
            None => {
                self.clear();
            }
        }
        true
    }

    /// Trimmed text to submit, or `None` when the line is blank.
    ///
    /// Does not clear the line; callers record the entry and then call [`LineEditor::clear`].
    pub fn submit(&self) -> Option<String> {
        let trimmed = self.line.trimmed();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Apply one decoded key event.
    pub fn apply(&mut self, event: &KeyEvent, history: &HistoryStore) -> EditOutcome {
        let changed = match event {
            KeyEvent::Character(text) => self.insert(text),
            KeyEvent::Backspace { count } => self.backspace(*count),
            KeyEvent::Delete => self.delete_forward(),
            KeyEvent::ArrowLeft => self.move_cursor(-1),
            KeyEvent::ArrowRight => self.move_cursor(1),
            KeyEvent::Home => self.move_to_start(),
            KeyEvent::End => self.move_to_end(),
            KeyEvent::ArrowUp => self.recall_previous(history),
            KeyEvent::ArrowDown => self.recall_next(history),
            KeyEvent::Return => {
                return match self.submit() {
                    Some(text) => {
                        self.clear();
                        EditOutcome::Submitted(text)
                    }
                    None => EditOutcome::Unchanged,
                };
            }
            KeyEvent::Control(letter) => match letter {
                'a' => self.move_to_start(),
                'e' => self.move_to_end(),
                'b' => self.move_cursor(-1),
                'f' => self.move_cursor(1),
                'd' => self.delete_forward(),
                'k' => self.delete_to_end(),
                'u' => self.delete_to_start(),
                'w' => self.delete_word_backward(),
                _ => return EditOutcome::Ignored,
            },
            KeyEvent::ShiftTab | KeyEvent::Escape | KeyEvent::CursorReport { .. } => {
                return EditOutcome::Ignored;
            }
        };

        if changed {
            EditOutcome::Changed
        } else {
            EditOutcome::Unchanged
        }
    }

    fn replace_text(&mut self, next: InputLine) -> bool {
        if next == self.line {
            return false;
        }
        if next.text() != self.line.text() {
            self.history_index = None;
        }
        self.line = next;
        true
    }

    fn replace_cursor(&mut self, next: InputLine) -> bool {
        if next == self.line {
            return false;
        }
        self.line = next;
        true
    }
}
