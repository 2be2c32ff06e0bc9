//! Terminal abstraction.

/// Byte-oriented terminal the engine drives.
///
/// Input is delivered as raw chunks exactly as read, so the decoder sees the same
/// framing the terminal produced (fused keystrokes, DEL bursts, split pastes).
pub trait Terminal {
    /// Start the terminal with input and resize handlers.
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(Vec<u8>) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> std::io::Result<()>;

    /// Stop the terminal and restore state.
    fn stop(&mut self) -> std::io::Result<()>;

    /// Drain pending input before exiting so late key bytes do not leak into the shell.
    fn drain_input(&mut self, max_ms: u64, idle_ms: u64);

    /// Write output to the terminal.
    fn write(&mut self, data: &str);

    /// Terminal dimensions.
    fn columns(&self) -> u16;
    fn rows(&self) -> u16;

    /// Whether input arrives unbuffered and unechoed.
    fn supports_raw_mode(&self) -> bool {
        true
    }
}
