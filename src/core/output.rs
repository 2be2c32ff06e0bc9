//! Typed terminal output commands and a single output gate.
//!
//! Invariant: all terminal writes must flow through `OutputGate::flush(..)`.

use crate::core::terminal::Terminal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw text or control sequences.
    Bytes(String),
    BytesStatic(&'static str),

    /// Absolute cursor move, 0-based (written 1-based as `ESC[row;colH`).
    MoveTo { row: u16, col: u16 },
    /// Erase the whole current line (`ESC[2K`).
    ClearLine,
    /// Erase from the cursor to the end of the line.
    ClearToLineEnd,
    /// Erase from the cursor to the end of the screen.
    ClearBelow,

    /// Cursor visibility and shape.
    HideCursor,
    ShowCursor,
    CursorSteadyBlock,
    CursorDefaultStyle,

    /// Protocol toggles.
    BracketedPasteEnable,
    BracketedPasteDisable,

    /// Ask for the cursor position; the reply arrives as `ESC[row;colR`.
    QueryCursorPosition,
}

impl TerminalCmd {
    pub fn bytes(data: impl Into<String>) -> Self {
        Self::Bytes(data.into())
    }

    pub fn encode_into(&self, out: &mut String) {
        match self {
            Self::Bytes(data) => out.push_str(data),
            Self::BytesStatic(data) => out.push_str(data),
            Self::MoveTo { row, col } => {
                let row = u32::from(*row) + 1;
                let col = u32::from(*col) + 1;
                out.push_str(&format!("\x1b[{row};{col}H"));
            }
            Self::ClearLine => out.push_str("\x1b[2K"),
            Self::ClearToLineEnd => out.push_str("\x1b[K"),
            Self::ClearBelow => out.push_str("\x1b[J"),
            Self::HideCursor => out.push_str("\x1b[?25l"),
            Self::ShowCursor => out.push_str("\x1b[?25h"),
            Self::CursorSteadyBlock => out.push_str("\x1b[2 q"),
            Self::CursorDefaultStyle => out.push_str("\x1b[0 q"),
            Self::BracketedPasteEnable => out.push_str("\x1b[?2004h"),
            Self::BracketedPasteDisable => out.push_str("\x1b[?2004l"),
            Self::QueryCursorPosition => out.push_str("\x1b[6n"),
        }
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    /// Encode buffered commands without writing them.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for cmd in &self.cmds {
            cmd.encode_into(&mut out);
        }
        out
    }

    /// Flush buffered commands to the terminal as one write.
    ///
    /// This is the single write gate: `Terminal::write(..)` must not be called
    /// from anywhere else.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let out = self.encode();
        self.cmds.clear();
        term.write(&out);
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputGate, TerminalCmd};
    use crate::core::terminal::Terminal;

    #[derive(Default)]
    struct RecordingTerminal {
        writes: Vec<String>,
    }

    impl Terminal for RecordingTerminal {
        fn start(
            &mut self,
            _on_input: Box<dyn FnMut(Vec<u8>) + Send>,
            _on_resize: Box<dyn FnMut() + Send>,
        ) -> std::io::Result<()> {
            Ok(())
        }

        fn stop(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn drain_input(&mut self, _max_ms: u64, _idle_ms: u64) {}

        fn write(&mut self, data: &str) {
            self.writes.push(data.to_string());
        }

        fn columns(&self) -> u16 {
            80
        }

        fn rows(&self) -> u16 {
            24
        }
    }

    #[test]
    fn move_to_is_one_based_on_the_wire() {
        let mut out = String::new();
        TerminalCmd::MoveTo { row: 0, col: 4 }.encode_into(&mut out);
        assert_eq!(out, "\x1b[1;5H");
    }

    #[test]
    fn flush_writes_once_and_drains() {
        let mut gate = OutputGate::new();
        gate.push(TerminalCmd::HideCursor);
        gate.push(TerminalCmd::MoveTo { row: 2, col: 0 });
        gate.push(TerminalCmd::ClearLine);
        gate.push(TerminalCmd::bytes("hi"));

        let mut term = RecordingTerminal::default();
        gate.flush(&mut term);
        gate.flush(&mut term);

        assert_eq!(term.writes, vec!["\x1b[?25l\x1b[3;1H\x1b[2Khi".to_string()]);
        assert!(gate.is_empty());
    }

    #[test]
    fn cursor_style_and_query_sequences() {
        let mut gate = OutputGate::new();
        gate.extend([
            TerminalCmd::CursorSteadyBlock,
            TerminalCmd::QueryCursorPosition,
        ]);
        assert_eq!(gate.encode(), "\x1b[2 q\x1b[6n");
    }
}
