//! Logical key events.

/// One decoded unit of terminal input.
///
/// A pasted block is a single `Character` carrying the whole run, so paste is atomic
/// and costs one edit/render instead of one per character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Character(String),
    /// `count` > 1 when the terminal coalesced repeated DEL bytes into one chunk.
    Backspace {
        count: usize,
    },
    Delete,
    Return,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    /// Lowercase ASCII letter.
    Control(char),
    ShiftTab,
    Escape,
    /// Reply to a cursor position query (1-based).
    CursorReport {
        row: u16,
        col: u16,
    },
}

impl KeyEvent {
    pub fn character(text: impl Into<String>) -> Self {
        Self::Character(text.into())
    }

    pub fn backspace() -> Self {
        Self::Backspace { count: 1 }
    }

    pub fn ctrl(letter: char) -> Self {
        Self::Control(letter.to_ascii_lowercase())
    }

    /// Normalized identifier used by hot-key matching (`"shift+tab"`, `"ctrl+c"`, ...).
    ///
    /// Character events map to their text, so `"a"` matches a typed `a`.
    pub fn key_id(&self) -> String {
        match self {
            Self::Character(text) => text.clone(),
            Self::Backspace { .. } => "backspace".to_string(),
            Self::Delete => "delete".to_string(),
            Self::Return => "enter".to_string(),
            Self::ArrowUp => "up".to_string(),
            Self::ArrowDown => "down".to_string(),
            Self::ArrowLeft => "left".to_string(),
            Self::ArrowRight => "right".to_string(),
            Self::Home => "home".to_string(),
            Self::End => "end".to_string(),
            Self::Control(letter) => format!("ctrl+{letter}"),
            Self::ShiftTab => "shift+tab".to_string(),
            Self::Escape => "escape".to_string(),
            Self::CursorReport { .. } => "cursor-report".to_string(),
        }
    }

    /// Whether this event matches a key id, accepting the aliases hosts commonly write.
    pub fn matches(&self, key_id: &str) -> bool {
        let wanted = key_id.trim().to_ascii_lowercase();
        let wanted = match wanted.as_str() {
            "return" => "enter",
            "esc" => "escape",
            "backtab" => "shift+tab",
            "del" => "delete",
            other => other,
        };
        if let Self::Character(text) = self {
            return text == key_id;
        }
        self.key_id() == wanted
    }
}
