//! Chat session runtime: one event queue driving decoder, editor, history and renderer.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use history_store::HistoryStore;

use crate::core::hotkeys::{HotKeyFlow, HotKeys};
use crate::core::key::KeyEvent;
use crate::core::key_decoder::KeyDecoder;
use crate::core::line_editor::{EditOutcome, LineEditor};
use crate::core::output::{OutputGate, TerminalCmd};
use crate::core::render_buffer::RenderBuffer;
use crate::core::terminal::Terminal;
use crate::render::{Capabilities, RenderMode, TerminalBridge, View};

const STOP_DRAIN_MAX_MS: u64 = 1000;
const STOP_DRAIN_IDLE_MS: u64 = 50;
/// Upper bound on a blocking wait, so a background history load is merged promptly.
const IDLE_TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionEvent {
    Input(Vec<u8>),
    Append(String),
    SetTranscript(String),
    ClearTranscript,
    SetInput(String),
    Focus(bool),
    Resize,
}

#[derive(Default)]
struct WakeState {
    queue: VecDeque<SessionEvent>,
    stop_requested: bool,
}

/// Ordered event queue shared with input, resize and producer threads.
#[derive(Default)]
struct SessionWake {
    state: Mutex<WakeState>,
    cvar: Condvar,
}

impl SessionWake {
    fn lock(&self) -> MutexGuard<'_, WakeState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Wait until an event is queued or `timeout` passes. Returns false once stop is requested.
    fn wait_for_event(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .cvar
            .wait_timeout_while(state, timeout, |state| {
                !state.stop_requested && state.queue.is_empty()
            })
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        !state.stop_requested
    }

    fn push(&self, event: SessionEvent) {
        let mut state = self.lock();
        state.queue.push_back(event);
        self.cvar.notify_one();
    }

    fn drain(&self) -> Vec<SessionEvent> {
        self.lock().queue.drain(..).collect()
    }

    fn request_stop(&self) {
        self.lock().stop_requested = true;
        self.cvar.notify_all();
    }

    fn is_stop_requested(&self) -> bool {
        self.lock().stop_requested
    }

    fn reset_for_start(&self) {
        let mut state = self.lock();
        state.queue.clear();
        state.stop_requested = false;
    }
}

/// Cloneable, `Send` handle for feeding a running session from other threads.
///
/// Every call is queued and applied by the session loop in call order, interleaved with
/// terminal input in arrival order.
#[derive(Clone)]
pub struct SessionHandle {
    wake: Arc<SessionWake>,
}

impl SessionHandle {
    /// Append streamed text to the transcript.
    pub fn append(&self, text: impl Into<String>) {
        self.wake.push(SessionEvent::Append(text.into()));
    }

    /// Replace the whole transcript.
    pub fn set_text(&self, text: impl Into<String>) {
        self.wake.push(SessionEvent::SetTranscript(text.into()));
    }

    pub fn clear(&self) {
        self.wake.push(SessionEvent::ClearTranscript);
    }

    /// Replace the input line (cursor at end).
    pub fn set_input(&self, text: impl Into<String>) {
        self.wake.push(SessionEvent::SetInput(text.into()));
    }

    /// Give or take input focus. Without focus, keys reach hot keys only.
    pub fn set_focused(&self, focused: bool) {
        self.wake.push(SessionEvent::Focus(focused));
    }

    /// Feed raw terminal bytes, as if the terminal had delivered them.
    pub fn send_input(&self, bytes: impl Into<Vec<u8>>) {
        self.wake.push(SessionEvent::Input(bytes.into()));
    }

    pub fn request_stop(&self) {
        self.wake.request_stop();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.wake.is_stop_requested()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub render_mode: RenderMode,
    pub prompt: String,
    pub placeholder: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::default(),
            prompt: "> ".to_string(),
            placeholder: String::new(),
        }
    }
}

pub struct ChatSession<T: Terminal> {
    terminal: T,
    output: OutputGate,
    decoder: KeyDecoder,
    editor: LineEditor,
    history: HistoryStore,
    transcript: RenderBuffer,
    hotkeys: HotKeys,
    bridge: TerminalBridge,
    prompt: String,
    placeholder: String,
    on_submit: Option<Box<dyn FnMut(String)>>,
    wake: Arc<SessionWake>,
    focused: bool,
    needs_render: bool,
    stopped: bool,
}

impl<T: Terminal> ChatSession<T> {
    pub fn new(terminal: T, history: HistoryStore, options: SessionOptions) -> Self {
        let bridge = TerminalBridge::select(options.render_mode, Capabilities::of(&terminal));
        Self {
            terminal,
            output: OutputGate::new(),
            decoder: KeyDecoder::new(),
            editor: LineEditor::new(),
            history,
            transcript: RenderBuffer::new(),
            hotkeys: HotKeys::new(),
            bridge,
            prompt: options.prompt,
            placeholder: options.placeholder,
            on_submit: None,
            wake: Arc::new(SessionWake::default()),
            focused: true,
            needs_render: false,
            stopped: true,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            wake: Arc::clone(&self.wake),
        }
    }

    /// Called with each trimmed, non-blank submitted line, after it is recorded in history.
    pub fn set_on_submit(&mut self, handler: impl FnMut(String) + 'static) {
        self.on_submit = Some(Box::new(handler));
    }

    pub fn hotkeys_mut(&mut self) -> &mut HotKeys {
        &mut self.hotkeys
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
        self.needs_render = true;
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
        self.needs_render = true;
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn transcript(&self) -> &RenderBuffer {
        &self.transcript
    }

    pub fn render_mode(&self) -> RenderMode {
        self.bridge.mode()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    pub fn start(&mut self) -> io::Result<()> {
        self.output.clear();
        self.decoder.reset();
        self.wake.reset_for_start();

        let wake_input = Arc::clone(&self.wake);
        let wake_resize = Arc::clone(&self.wake);
        self.terminal.start(
            Box::new(move |bytes| wake_input.push(SessionEvent::Input(bytes))),
            Box::new(move || wake_resize.push(SessionEvent::Resize)),
        )?;
        self.stopped = false;
        tracing::debug!(target: "chatline::session", mode = self.bridge.mode().as_str(), "session started");

        self.output.push(TerminalCmd::BracketedPasteEnable);
        if self.focused {
            let cmds = self.bridge.focus();
            self.output.extend(cmds);
        }
        self.render();
        self.flush_output();
        Ok(())
    }

    pub fn stop(&mut self) -> io::Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.wake.request_stop();
        let cmds = self.bridge.blur();
        self.output.extend(cmds);
        self.output.push(TerminalCmd::BracketedPasteDisable);
        self.output.push(TerminalCmd::BytesStatic("\r\n"));
        self.flush_output();

        self.terminal
            .drain_input(STOP_DRAIN_MAX_MS, STOP_DRAIN_IDLE_MS);
        let result = self.terminal.stop();
        self.stopped = true;
        self.history.flush();
        tracing::debug!(target: "chatline::session", "session stopped");
        result
    }

    /// Process events until a stop is requested, then stop.
    pub fn run(&mut self) -> io::Result<()> {
        while !self.stopped && !self.wake.is_stop_requested() {
            self.run_blocking_once();
        }
        self.stop()
    }

    /// Block until an event arrives, an idle tick passes or a held escape tail times out,
    /// then process queued work.
    pub fn run_blocking_once(&mut self) {
        if self.stopped {
            return;
        }
        let timeout = self
            .decoder
            .next_timeout(Instant::now())
            .map_or(IDLE_TICK, |remaining| remaining.min(IDLE_TICK));
        if !self.wake.wait_for_event(timeout) {
            return;
        }
        self.run_once();
    }

    /// Process everything queued so far without blocking, then render once.
    pub fn run_once(&mut self) {
        if self.stopped {
            return;
        }
        self.history.poll_loaded();

        for key in self.decoder.flush_due(Instant::now()) {
            self.handle_key(&key);
        }
        for event in self.wake.drain() {
            if self.wake.is_stop_requested() {
                break;
            }
            self.handle_event(event);
        }

        if self.needs_render {
            self.render();
        }
        self.flush_output();
    }

    /// Decode a raw terminal chunk and apply the resulting keys in order.
    pub fn handle_input(&mut self, bytes: &[u8]) {
        for key in self.decoder.decode(bytes) {
            self.handle_key(&key);
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Input(bytes) => self.handle_input(&bytes),
            SessionEvent::Append(text) => {
                self.transcript.append(&text);
                self.needs_render = true;
            }
            SessionEvent::SetTranscript(text) => {
                self.transcript.set_text(text);
                self.needs_render = true;
            }
            SessionEvent::ClearTranscript => {
                self.transcript.clear();
                self.needs_render = true;
            }
            SessionEvent::SetInput(text) => {
                self.editor.set_text(text);
                self.needs_render = true;
            }
            SessionEvent::Focus(focused) => self.set_focused(focused),
            SessionEvent::Resize => {
                self.bridge.resize();
                self.needs_render = true;
            }
        }
    }

    /// Focus transitions re-run the renderer's focus handling (direct mode re-anchors).
    pub fn set_focused(&mut self, focused: bool) {
        if self.focused == focused {
            return;
        }
        self.focused = focused;
        let cmds = if focused {
            self.bridge.focus()
        } else {
            self.bridge.blur()
        };
        self.output.extend(cmds);
        self.needs_render = true;
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        tracing::trace!(target: "chatline::session", key = %key.key_id(), "key");

        if let KeyEvent::CursorReport { row, col } = key {
            if self.bridge.cursor_report(*row, *col) {
                self.needs_render = true;
            }
            return;
        }

        if self.hotkeys.dispatch(key, &mut self.editor) == HotKeyFlow::Consumed {
            self.needs_render = true;
            return;
        }
        if !self.focused {
            return;
        }

        match self.editor.apply(key, &self.history) {
            EditOutcome::Changed => self.needs_render = true,
            EditOutcome::Unchanged => {}
            EditOutcome::Submitted(line) => {
                self.history.record(&line);
                self.needs_render = true;
                if let Some(handler) = self.on_submit.as_mut() {
                    handler(line);
                }
            }
            EditOutcome::Ignored => {
                if *key == KeyEvent::ctrl('c') {
                    tracing::debug!(target: "chatline::session", "ctrl+c requested stop");
                    self.wake.request_stop();
                }
            }
        }
    }

    fn render(&mut self) {
        self.needs_render = false;
        let view = View {
            transcript: &self.transcript,
            line: self.editor.line(),
            prompt: &self.prompt,
            placeholder: &self.placeholder,
        };
        let cmds = self
            .bridge
            .render(&view, self.terminal.columns(), self.terminal.rows());
        self.output.extend(cmds);
    }

    fn flush_output(&mut self) {
        self.output.flush(&mut self.terminal);
    }
}

impl<T: Terminal> Drop for ChatSession<T> {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
