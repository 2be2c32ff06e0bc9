//! Direct rendering: cursor-addressed writes to the input row only.

use crate::core::output::TerminalCmd;
use crate::render::bridge::{RenderMode, Renderer};
use crate::render::frame::{transcript_rows, View};
use crate::render::line_view::LineView;

/// Screen position (0-based) where the input line starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub row: u16,
    pub col: u16,
}

/// Low-latency renderer that rewrites only what moved.
///
/// The anchor is captured from a cursor position report requested on every focus gain;
/// until the report arrives the bottom row is assumed. A keystroke costs one move, one line
/// clear, the visible input text and a final cursor placement. Transcript rows live above
/// the anchor and are diffed independently. A resize keeps the (clamped) anchor.
#[derive(Debug, Default)]
pub struct DirectRenderer {
    anchor: Option<Anchor>,
    awaiting_report: bool,
    previous_transcript: Vec<String>,
    previous_input: Option<(String, u16)>,
    previous_size: Option<(u16, u16)>,
}

impl DirectRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Option<Anchor> {
        self.anchor
    }

    pub fn is_awaiting_report(&self) -> bool {
        self.awaiting_report
    }

    fn effective_anchor(&self, columns: u16, rows: u16) -> Anchor {
        let bottom = rows.saturating_sub(1);
        match self.anchor {
            Some(anchor) => Anchor {
                row: anchor.row.min(bottom),
                col: anchor.col.min(columns.saturating_sub(1)),
            },
            None => Anchor { row: bottom, col: 0 },
        }
    }
}

impl Renderer for DirectRenderer {
    fn mode(&self) -> RenderMode {
        RenderMode::Direct
    }

    fn focus(&mut self) -> Vec<TerminalCmd> {
        self.anchor = None;
        self.awaiting_report = true;
        self.invalidate();
        vec![
            TerminalCmd::CursorSteadyBlock,
            TerminalCmd::QueryCursorPosition,
        ]
    }

    fn blur(&mut self) -> Vec<TerminalCmd> {
        self.awaiting_report = false;
        vec![TerminalCmd::CursorDefaultStyle, TerminalCmd::ShowCursor]
    }

    fn cursor_report(&mut self, row: u16, col: u16) -> bool {
        if !self.awaiting_report {
            return false;
        }
        self.awaiting_report = false;
        self.anchor = Some(Anchor {
            row: row.saturating_sub(1),
            col: col.saturating_sub(1),
        });
        tracing::debug!(target: "chatline::render", row, col, "direct anchor captured");
        self.invalidate();
        true
    }

    fn invalidate(&mut self) {
        self.previous_transcript.clear();
        self.previous_input = None;
        self.previous_size = None;
    }

    fn render(&mut self, view: &View<'_>, columns: u16, rows: u16) -> Vec<TerminalCmd> {
        if columns == 0 || rows == 0 {
            return Vec::new();
        }
        if self.previous_size != Some((columns, rows)) {
            self.previous_transcript.clear();
            self.previous_input = None;
            self.previous_size = Some((columns, rows));
        }

        let anchor = self.effective_anchor(columns, rows);
        let mut cmds = Vec::new();

        let region = usize::from(anchor.row);
        let transcript = transcript_rows(view.transcript, region, usize::from(columns));
        let mut screen = vec![String::new(); region - transcript.len()];
        screen.extend(transcript);
        for (row, text) in screen.iter().enumerate() {
            if self.previous_transcript.get(row) == Some(text) {
                continue;
            }
            cmds.push(TerminalCmd::MoveTo {
                row: row as u16,
                col: 0,
            });
            cmds.push(TerminalCmd::ClearLine);
            if !text.is_empty() {
                cmds.push(TerminalCmd::Bytes(text.clone()));
            }
        }
        let transcript_written = !cmds.is_empty();
        self.previous_transcript = screen;

        let width = usize::from(columns - anchor.col);
        let input = LineView::new(view.line, view.prompt, view.placeholder, width);
        let text = input.render_plain();
        let cursor_col = anchor.col.saturating_add(input.cursor_col as u16);
        let text_changed = self
            .previous_input
            .as_ref()
            .map_or(true, |(previous, _)| *previous != text);
        let cursor_moved = self
            .previous_input
            .as_ref()
            .map_or(true, |(_, previous)| *previous != cursor_col);

        if text_changed {
            cmds.push(TerminalCmd::MoveTo {
                row: anchor.row,
                col: anchor.col,
            });
            cmds.push(if anchor.col == 0 {
                TerminalCmd::ClearLine
            } else {
                TerminalCmd::ClearToLineEnd
            });
            cmds.push(TerminalCmd::Bytes(text.clone()));
        }
        if text_changed || cursor_moved || transcript_written {
            cmds.push(TerminalCmd::MoveTo {
                row: anchor.row,
                col: cursor_col.min(columns - 1),
            });
            cmds.push(TerminalCmd::ShowCursor);
        }

        self.previous_input = Some((text, cursor_col));
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::{Anchor, DirectRenderer};
    use crate::core::input_line::InputLine;
    use crate::core::output::TerminalCmd;
    use crate::core::render_buffer::RenderBuffer;
    use crate::render::bridge::Renderer;
    use crate::render::frame::View;

    fn view<'a>(transcript: &'a RenderBuffer, line: &'a InputLine) -> View<'a> {
        View {
            transcript,
            line,
            prompt: "> ",
            placeholder: "",
        }
    }

    #[test]
    fn focus_queries_cursor_position() {
        let mut renderer = DirectRenderer::new();
        let cmds = renderer.focus();
        assert_eq!(
            cmds,
            vec![
                TerminalCmd::CursorSteadyBlock,
                TerminalCmd::QueryCursorPosition
            ]
        );
        assert!(renderer.is_awaiting_report());
    }

    #[test]
    fn cursor_report_sets_zero_based_anchor_once() {
        let mut renderer = DirectRenderer::new();
        renderer.focus();
        assert!(renderer.cursor_report(5, 3));
        assert_eq!(renderer.anchor(), Some(Anchor { row: 4, col: 2 }));
        assert!(!renderer.cursor_report(9, 9));
    }

    #[test]
    fn falls_back_to_bottom_row_without_report() {
        let transcript = RenderBuffer::new();
        let line = InputLine::from_text("hi");
        let mut renderer = DirectRenderer::new();
        renderer.focus();

        let cmds = renderer.render(&view(&transcript, &line), 40, 10);

        assert!(cmds.contains(&TerminalCmd::MoveTo { row: 9, col: 0 }));
        assert!(cmds.contains(&TerminalCmd::Bytes("> hi".to_string())));
        assert_eq!(
            &cmds[cmds.len() - 2..],
            &[TerminalCmd::MoveTo { row: 9, col: 4 }, TerminalCmd::ShowCursor]
        );
    }

    #[test]
    fn keystroke_rewrites_input_row_only() {
        let transcript = RenderBuffer::new();
        let mut renderer = DirectRenderer::new();
        renderer.focus();
        renderer.cursor_report(3, 1);
        renderer.render(&view(&transcript, &InputLine::from_text("h")), 40, 10);

        let cmds = renderer.render(&view(&transcript, &InputLine::from_text("he")), 40, 10);

        assert_eq!(
            cmds,
            vec![
                TerminalCmd::MoveTo { row: 2, col: 0 },
                TerminalCmd::ClearLine,
                TerminalCmd::bytes("> he"),
                TerminalCmd::MoveTo { row: 2, col: 4 },
                TerminalCmd::ShowCursor,
            ]
        );
    }

    #[test]
    fn cursor_motion_only_moves_the_cursor() {
        let transcript = RenderBuffer::new();
        let line = InputLine::from_text("hey");
        let mut renderer = DirectRenderer::new();
        renderer.render(&view(&transcript, &line), 40, 5);

        let cmds = renderer.render(&view(&transcript, &line.move_cursor(-1)), 40, 5);

        assert_eq!(
            cmds,
            vec![
                TerminalCmd::MoveTo { row: 4, col: 4 },
                TerminalCmd::ShowCursor
            ]
        );
    }

    #[test]
    fn anchor_with_column_offset_clears_to_line_end() {
        let transcript = RenderBuffer::new();
        let line = InputLine::from_text("x");
        let mut renderer = DirectRenderer::new();
        renderer.focus();
        renderer.cursor_report(1, 11);

        let cmds = renderer.render(&view(&transcript, &line), 40, 5);
        assert_eq!(cmds[0], TerminalCmd::MoveTo { row: 0, col: 10 });
        assert_eq!(cmds[1], TerminalCmd::ClearToLineEnd);
    }

    #[test]
    fn transcript_rows_above_anchor_are_diffed() {
        let mut transcript = RenderBuffer::new();
        let line = InputLine::new();
        let mut renderer = DirectRenderer::new();
        transcript.append("one\n");
        renderer.render(&view(&transcript, &line), 40, 4);

        transcript.append("two\n");
        let cmds = renderer.render(&view(&transcript, &line), 40, 4);

        let moved_rows: Vec<u16> = cmds
            .iter()
            .filter_map(|cmd| match cmd {
                TerminalCmd::MoveTo { row, .. } => Some(*row),
                _ => None,
            })
            .collect();
        // Rows 1 and 2 shift; row 0 stays blank; then the cursor returns to the input row.
        assert_eq!(moved_rows, vec![1, 2, 3]);
    }
}
