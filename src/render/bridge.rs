//! Capability-driven selection between the two rendering strategies.

use crate::core::output::TerminalCmd;
use crate::core::terminal::Terminal;
use crate::render::direct::DirectRenderer;
use crate::render::frame::View;
use crate::render::reconciled::ReconciledRenderer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Reconciled,
    Direct,
}

impl RenderMode {
    /// Case-insensitive `"reconciled"` / `"direct"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reconciled" => Some(Self::Reconciled),
            "direct" => Some(Self::Direct),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reconciled => "reconciled",
            Self::Direct => "direct",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub supports_raw_mode: bool,
}

impl Capabilities {
    pub fn of<T: Terminal + ?Sized>(terminal: &T) -> Self {
        Self {
            supports_raw_mode: terminal.supports_raw_mode(),
        }
    }
}

/// A rendering strategy: turns view state into terminal commands.
pub trait Renderer: Send {
    fn mode(&self) -> RenderMode;

    /// Input gained focus. Direct mode re-captures its anchor here.
    fn focus(&mut self) -> Vec<TerminalCmd>;

    /// Input lost focus; restore cursor state.
    fn blur(&mut self) -> Vec<TerminalCmd>;

    /// Offer a cursor position report (1-based). Returns whether it was consumed.
    fn cursor_report(&mut self, row: u16, col: u16) -> bool;

    /// Forget cached frames so the next render redraws everything.
    fn invalidate(&mut self);

    fn render(&mut self, view: &View<'_>, columns: u16, rows: u16) -> Vec<TerminalCmd>;
}

/// Maps editor and transcript state to terminal output in one of two modes.
pub struct TerminalBridge {
    renderer: Box<dyn Renderer>,
}

impl TerminalBridge {
    /// Use `preferred` when the terminal can support it, else reconciled mode.
    pub fn select(preferred: RenderMode, capabilities: Capabilities) -> Self {
        let mode = match preferred {
            RenderMode::Direct if !capabilities.supports_raw_mode => {
                tracing::info!(
                    target: "chatline::render",
                    "raw mode unsupported; falling back to reconciled rendering"
                );
                RenderMode::Reconciled
            }
            mode => mode,
        };
        let renderer: Box<dyn Renderer> = match mode {
            RenderMode::Reconciled => Box::new(ReconciledRenderer::new()),
            RenderMode::Direct => Box::new(DirectRenderer::new()),
        };
        Self { renderer }
    }

    /// Wrap a custom strategy.
    pub fn with_renderer(renderer: Box<dyn Renderer>) -> Self {
        Self { renderer }
    }

    pub fn mode(&self) -> RenderMode {
        self.renderer.mode()
    }

    pub fn focus(&mut self) -> Vec<TerminalCmd> {
        self.renderer.focus()
    }

    pub fn blur(&mut self) -> Vec<TerminalCmd> {
        self.renderer.blur()
    }

    pub fn cursor_report(&mut self, row: u16, col: u16) -> bool {
        self.renderer.cursor_report(row, col)
    }

    pub fn resize(&mut self) {
        self.renderer.invalidate();
    }

    pub fn render(&mut self, view: &View<'_>, columns: u16, rows: u16) -> Vec<TerminalCmd> {
        self.renderer.render(view, columns, rows)
    }
}

impl std::fmt::Debug for TerminalBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalBridge")
            .field("mode", &self.mode())
            .finish()
    }
}
