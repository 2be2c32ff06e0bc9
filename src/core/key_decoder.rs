//! Raw terminal byte chunks to [`KeyEvent`]s.
//!
//! The terminal may fuse several keystrokes into one read under load, and a read of
//! several printable bytes is indistinguishable from a paste. The decoder resolves this
//! with a chunk-level heuristic:
//!
//! - one byte: a single key (control code, printable character, or escape lead);
//! - only DEL bytes: one `Backspace` carrying the byte count (some terminal/runtime
//!   combinations coalesce rapid backspace presses this way);
//! - only printable bytes / UTF-8: one atomic `Character` run (paste);
//! - anything else: split in order into escape sequences, control bytes and text runs.
//!
//! Bracketed paste (`ESC[200~ .. ESC[201~`) is honored even when it spans reads.
//! An escape sequence cut off at the end of a read is held and joined to the next read;
//! if nothing arrives before the escape timeout, a lone `ESC` becomes `Escape` and any
//! other unfinished tail is dropped. Unrecognized sequences and invalid UTF-8 are dropped,
//! never inserted.

use std::time::{Duration, Instant};

use crate::core::key::KeyEvent;

const ESC: u8 = 0x1b;
const DEL: u8 = 0x7f;
const BS: u8 = 0x08;
const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";
const PASTE_TAB: &str = "    ";
/// How long an unfinished escape tail waits for the rest of its bytes.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(10);
/// Unfinished CSI tails longer than this are garbage, not a split sequence.
const MAX_PENDING_ESCAPE: usize = 32;

#[derive(Debug, Default)]
pub struct KeyDecoder {
    paste: Option<Vec<u8>>,
    pending: Vec<u8>,
    flush_deadline: Option<Instant>,
}

enum EscapeScan {
    /// Bytes consumed and the decoded key, if recognized.
    Complete(usize, Option<KeyEvent>),
    /// The sequence continues in a later read.
    Incomplete,
}

impl KeyDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a bracketed paste is open and waiting for its terminator.
    pub fn is_pasting(&self) -> bool {
        self.paste.is_some()
    }

    /// Whether an unfinished escape tail is waiting for more bytes.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Time left before [`KeyDecoder::flush_due`] resolves the pending tail.
    pub fn next_timeout(&self, now: Instant) -> Option<Duration> {
        self.flush_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Resolve the pending tail once its deadline has passed.
    pub fn flush_due(&mut self, now: Instant) -> Vec<KeyEvent> {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => Vec::new(),
        }
    }

    /// Resolve the pending tail now: a lone `ESC` is `Escape`, anything else is dropped.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        self.flush_deadline = None;
        let pending = std::mem::take(&mut self.pending);
        if pending == [ESC] {
            return vec![KeyEvent::Escape];
        }
        if !pending.is_empty() {
            tracing::trace!(sequence = ?pending, "dropping unfinished escape sequence");
        }
        Vec::new()
    }

    /// Discard any partially received paste or escape sequence.
    pub fn reset(&mut self) {
        self.paste = None;
        self.pending.clear();
        self.flush_deadline = None;
    }

    pub fn decode(&mut self, chunk: &[u8]) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        self.decode_into(chunk, &mut events);
        events
    }

    fn decode_into(&mut self, chunk: &[u8], events: &mut Vec<KeyEvent>) {
        if chunk.is_empty() {
            return;
        }

        if self.paste.is_some() {
            self.continue_paste(chunk, events);
            return;
        }

        if !self.pending.is_empty() {
            let mut joined = std::mem::take(&mut self.pending);
            self.flush_deadline = None;
            joined.extend_from_slice(chunk);
            self.decode_fused(&joined, events);
            return;
        }

        if chunk.len() == 1 && chunk[0] != ESC {
            events.extend(decode_byte(chunk[0]));
            return;
        }

        if chunk.iter().all(|&byte| byte == DEL) {
            tracing::debug!(count = chunk.len(), "coalesced backspace burst");
            events.push(KeyEvent::Backspace { count: chunk.len() });
            return;
        }

        if is_printable_run(chunk) {
            events.extend(decode_text(chunk).map(KeyEvent::Character));
            return;
        }

        self.decode_fused(chunk, events);
    }

    fn decode_fused(&mut self, chunk: &[u8], events: &mut Vec<KeyEvent>) {
        let mut pos = 0;
        while pos < chunk.len() {
            let rest = &chunk[pos..];
            let byte = rest[0];

            if byte == ESC {
                if rest.starts_with(PASTE_START) {
                    self.paste = Some(Vec::new());
                    self.continue_paste(&rest[PASTE_START.len()..], events);
                    return;
                }
                match decode_escape(rest) {
                    EscapeScan::Complete(consumed, event) => {
                        events.extend(event);
                        pos += consumed;
                    }
                    EscapeScan::Incomplete => {
                        self.pending = rest.to_vec();
                        self.flush_deadline = Some(Instant::now() + ESCAPE_TIMEOUT);
                        return;
                    }
                }
                continue;
            }

            if byte == DEL || byte == BS {
                let count = rest
                    .iter()
                    .take_while(|&&b| b == DEL || b == BS)
                    .count();
                events.push(KeyEvent::Backspace { count });
                pos += count;
                continue;
            }

            if byte < 0x20 {
                events.extend(decode_byte(byte));
                pos += 1;
                continue;
            }

            let run = rest
                .iter()
                .take_while(|&&b| b >= 0x20 && b != DEL)
                .count();
            events.extend(decode_text(&rest[..run]).map(KeyEvent::Character));
            pos += run;
        }
    }

    fn continue_paste(&mut self, data: &[u8], events: &mut Vec<KeyEvent>) {
        let buffer = self.paste.get_or_insert_with(Vec::new);
        buffer.extend_from_slice(data);

        let Some(end) = find(buffer, PASTE_END) else {
            return;
        };

        let buffer = self.paste.take().unwrap_or_default();
        let (content, rest) = buffer.split_at(end);
        events.extend(clean_paste(content).map(KeyEvent::Character));
        self.decode_into(&rest[PASTE_END.len()..], events);
    }
}

fn decode_byte(byte: u8) -> Option<KeyEvent> {
    match byte {
        b'\r' | b'\n' => Some(KeyEvent::Return),
        DEL | BS => Some(KeyEvent::backspace()),
        ESC => Some(KeyEvent::Escape),
        1..=26 => Some(KeyEvent::Control((b'a' + byte - 1) as char)),
        0x20..=0x7e => Some(KeyEvent::Character((byte as char).to_string())),
        _ => {
            tracing::trace!(byte, "dropping unmapped byte");
            None
        }
    }
}

/// Decode one escape-led sequence at the start of `seq`.
fn decode_escape(seq: &[u8]) -> EscapeScan {
    debug_assert_eq!(seq.first(), Some(&ESC));

    match seq.get(1) {
        None => EscapeScan::Incomplete,
        Some(&ESC) => EscapeScan::Complete(1, Some(KeyEvent::Escape)),
        Some(b'[') => decode_csi(seq),
        Some(b'O') => match seq.get(2) {
            Some(&final_byte) => EscapeScan::Complete(3, decode_ss3(final_byte)),
            None => EscapeScan::Incomplete,
        },
        Some(_) => {
            tracing::trace!(sequence = ?&seq[..2], "dropping unrecognized escape pair");
            EscapeScan::Complete(2, None)
        }
    }
}

fn decode_csi(seq: &[u8]) -> EscapeScan {
    let mut idx = 2;
    while idx < seq.len() && (0x30..=0x3f).contains(&seq[idx]) {
        idx += 1;
    }
    let params_end = idx;
    while idx < seq.len() && (0x20..=0x2f).contains(&seq[idx]) {
        idx += 1;
    }

    let Some(&final_byte) = seq.get(idx) else {
        if seq.len() > MAX_PENDING_ESCAPE {
            tracing::trace!(sequence = ?seq, "dropping overlong CSI sequence");
            return EscapeScan::Complete(seq.len(), None);
        }
        return EscapeScan::Incomplete;
    };
    if !(0x40..=0x7e).contains(&final_byte) {
        tracing::trace!(sequence = ?&seq[..idx], "dropping malformed CSI sequence");
        return EscapeScan::Complete(idx, None);
    }

    // Parameter bytes are ASCII by construction.
    let params = std::str::from_utf8(&seq[2..params_end]).unwrap_or("");
    let event = map_csi(params, final_byte);
    if event.is_none() {
        tracing::trace!(sequence = ?&seq[..=idx], "dropping unrecognized CSI sequence");
    }
    EscapeScan::Complete(idx + 1, event)
}

fn map_csi(params: &str, final_byte: u8) -> Option<KeyEvent> {
    let plain = params.is_empty() || params == "1";
    match final_byte {
        b'A' if plain => Some(KeyEvent::ArrowUp),
        b'B' if plain => Some(KeyEvent::ArrowDown),
        b'C' if plain => Some(KeyEvent::ArrowRight),
        b'D' if plain => Some(KeyEvent::ArrowLeft),
        b'H' if plain => Some(KeyEvent::Home),
        b'F' if plain => Some(KeyEvent::End),
        b'Z' if params.is_empty() => Some(KeyEvent::ShiftTab),
        b'~' => match params {
            "1" | "7" => Some(KeyEvent::Home),
            "4" | "8" => Some(KeyEvent::End),
            "3" => Some(KeyEvent::Delete),
            _ => None,
        },
        b'R' => {
            let (row, col) = params.split_once(';')?;
            Some(KeyEvent::CursorReport {
                row: row.parse().ok()?,
                col: col.parse().ok()?,
            })
        }
        _ => None,
    }
}

fn decode_ss3(final_byte: u8) -> Option<KeyEvent> {
    match final_byte {
        b'A' => Some(KeyEvent::ArrowUp),
        b'B' => Some(KeyEvent::ArrowDown),
        b'C' => Some(KeyEvent::ArrowRight),
        b'D' => Some(KeyEvent::ArrowLeft),
        b'H' => Some(KeyEvent::Home),
        b'F' => Some(KeyEvent::End),
        _ => {
            tracing::trace!(final_byte, "dropping unrecognized SS3 sequence");
            None
        }
    }
}

fn is_printable_run(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|&byte| (0x20..=0x7e).contains(&byte) || byte >= 0x80)
}

/// Valid UTF-8 portions of `bytes`; `None` when nothing valid remains.
fn decode_text(bytes: &[u8]) -> Option<String> {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        if !chunk.invalid().is_empty() {
            tracing::trace!(invalid = ?chunk.invalid(), "dropping invalid UTF-8");
        }
    }
    (!text.is_empty()).then_some(text)
}

/// Pasted text for a single-line editor: line breaks removed, tabs expanded,
/// other control characters dropped.
fn clean_paste(bytes: &[u8]) -> Option<String> {
    let raw = decode_text(bytes)?;
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\r' | '\n' => {}
            '\t' => cleaned.push_str(PASTE_TAB),
            ch if ch.is_control() => {}
            ch => cleaned.push(ch),
        }
    }
    (!cleaned.is_empty()).then_some(cleaned)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
