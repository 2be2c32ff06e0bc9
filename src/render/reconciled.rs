//! Reconciled rendering: compose the whole screen, rewrite only rows that changed.

use crate::core::output::TerminalCmd;
use crate::render::bridge::{RenderMode, Renderer};
use crate::render::frame::{transcript_rows, View};
use crate::render::line_view::LineView;

const SYNC_START: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";

/// Full-frame renderer with a reverse-video software cursor.
///
/// The input line sits on the bottom row and the transcript tail is bottom-aligned above it.
/// Each render composes the complete frame and diffs it row by row against the previous one.
#[derive(Debug, Default)]
pub struct ReconciledRenderer {
    previous: Vec<String>,
    previous_size: Option<(u16, u16)>,
}

impl ReconciledRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full frame for `view`, one string per screen row.
    pub fn compose(view: &View<'_>, columns: u16, rows: u16) -> Vec<String> {
        let height = usize::from(rows);
        let width = usize::from(columns);
        if height == 0 {
            return Vec::new();
        }

        let input = LineView::new(view.line, view.prompt, view.placeholder, width);
        let transcript = transcript_rows(view.transcript, height - 1, width);

        let mut frame = vec![String::new(); height - 1 - transcript.len()];
        frame.extend(transcript);
        frame.push(input.render_highlighted());
        frame
    }
}

impl Renderer for ReconciledRenderer {
    fn mode(&self) -> RenderMode {
        RenderMode::Reconciled
    }

    fn focus(&mut self) -> Vec<TerminalCmd> {
        self.invalidate();
        vec![TerminalCmd::HideCursor]
    }

    fn blur(&mut self) -> Vec<TerminalCmd> {
        vec![TerminalCmd::ShowCursor]
    }

    fn cursor_report(&mut self, _row: u16, _col: u16) -> bool {
        false
    }

    fn invalidate(&mut self) {
        self.previous.clear();
        self.previous_size = None;
    }

    fn render(&mut self, view: &View<'_>, columns: u16, rows: u16) -> Vec<TerminalCmd> {
        let frame = Self::compose(view, columns, rows);
        let full = self.previous_size != Some((columns, rows));

        let changed: Vec<usize> = (0..frame.len())
            .filter(|row| full || self.previous.get(*row) != Some(&frame[*row]))
            .collect();
        if changed.is_empty() {
            return Vec::new();
        }

        let mut cmds = vec![TerminalCmd::BytesStatic(SYNC_START)];
        if full {
            cmds.push(TerminalCmd::HideCursor);
        }
        for row in changed {
            cmds.push(TerminalCmd::MoveTo {
                row: row as u16,
                col: 0,
            });
            cmds.push(TerminalCmd::ClearLine);
            if !frame[row].is_empty() {
                cmds.push(TerminalCmd::Bytes(frame[row].clone()));
            }
        }
        cmds.push(TerminalCmd::BytesStatic(SYNC_END));

        tracing::trace!(target: "chatline::render", full, rows = frame.len(), "reconciled frame");
        self.previous = frame;
        self.previous_size = Some((columns, rows));
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::ReconciledRenderer;
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

    fn rewritten_rows(cmds: &[TerminalCmd]) -> Vec<u16> {
        cmds.iter()
            .filter_map(|cmd| match cmd {
                TerminalCmd::MoveTo { row, .. } => Some(*row),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn compose_puts_input_on_bottom_row() {
        let mut transcript = RenderBuffer::new();
        transcript.append("hello\n");
        let line = InputLine::from_text("hi");

        let frame = ReconciledRenderer::compose(&view(&transcript, &line), 20, 4);

        assert_eq!(frame.len(), 4);
        assert_eq!(frame[0], "");
        assert_eq!(frame[1], "");
        assert_eq!(frame[2], "hello\x1b[0m");
        assert_eq!(frame[3], "> hi\x1b[7m \x1b[27m");
    }

    #[test]
    fn first_render_draws_every_row() {
        let transcript = RenderBuffer::new();
        let line = InputLine::new();
        let mut renderer = ReconciledRenderer::new();

        let cmds = renderer.render(&view(&transcript, &line), 20, 3);
        assert_eq!(rewritten_rows(&cmds), vec![0, 1, 2]);
        assert!(cmds.contains(&TerminalCmd::HideCursor));
    }

    #[test]
    fn typing_rewrites_only_the_input_row() {
        let transcript = RenderBuffer::new();
        let mut renderer = ReconciledRenderer::new();
        renderer.render(&view(&transcript, &InputLine::new()), 20, 5);

        let cmds = renderer.render(&view(&transcript, &InputLine::from_text("a")), 20, 5);
        assert_eq!(rewritten_rows(&cmds), vec![4]);

        let cmds = renderer.render(&view(&transcript, &InputLine::from_text("a")), 20, 5);
        assert!(cmds.is_empty());
    }

    #[test]
    fn resize_forces_full_redraw() {
        let transcript = RenderBuffer::new();
        let line = InputLine::new();
        let mut renderer = ReconciledRenderer::new();
        renderer.render(&view(&transcript, &line), 20, 2);

        let cmds = renderer.render(&view(&transcript, &line), 30, 2);
        assert_eq!(rewritten_rows(&cmds), vec![0, 1]);
    }
}
