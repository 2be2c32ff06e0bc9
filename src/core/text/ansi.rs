//! ANSI escape sequence recognition for width math.

/// Length in bytes of the escape sequence starting at `pos`, if one starts there.
///
/// Recognizes CSI (`ESC [` .. final byte), string-terminated OSC/APC/DCS (BEL or `ESC \`)
/// and three-byte SS3. Unterminated sequences are not recognized.
pub fn ansi_sequence_len(input: &str, pos: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }
    match bytes.get(pos + 1)? {
        b'[' => bytes[pos + 2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map(|offset| offset + 3),
        b']' | b'_' | b'P' => string_terminated_len(bytes, pos),
        b'O' if pos + 2 < bytes.len() => Some(3),
        _ => None,
    }
}

fn string_terminated_len(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut idx = pos + 2;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            return Some(idx + 1 - pos);
        }
        if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
            return Some(idx + 2 - pos);
        }
        idx += 1;
    }
    None
}

/// Whether an escape sequence only styles text: SGR (`ESC[...m`) or an OSC 8 hyperlink.
///
/// Anything else (cursor moves, erases, mode switches, titles) changes terminal state
/// outside the row being drawn.
pub fn is_style_sequence(seq: &str) -> bool {
    if let Some(params) = seq
        .strip_prefix("\x1b[")
        .and_then(|rest| rest.strip_suffix('m'))
    {
        return params
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b';' || b == b':');
    }
    seq.starts_with("\x1b]8;")
}

/// `input` with every recognized escape sequence removed.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(len) = ansi_sequence_len(input, idx) {
            idx += len;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{ansi_sequence_len, is_style_sequence, strip_ansi};

    #[test]
    fn csi_length_includes_final_byte() {
        assert_eq!(ansi_sequence_len("\x1b[31mred", 0), Some(5));
        assert_eq!(ansi_sequence_len("x\x1b[0m", 1), Some(4));
        assert_eq!(ansi_sequence_len("\x1b[31", 0), None);
    }

    #[test]
    fn osc_hyperlink_terminators() {
        assert_eq!(ansi_sequence_len("\x1b]8;;u\x07", 0), Some(7));
        assert_eq!(ansi_sequence_len("\x1b]8;;u\x1b\\", 0), Some(8));
    }

    #[test]
    fn strip_removes_sequences_only() {
        assert_eq!(strip_ansi("a\x1b[1mb\x1b[0mc"), "abc");
        assert_eq!(strip_ansi("plain ✓"), "plain ✓");
    }

    #[test]
    fn only_sgr_and_hyperlinks_are_style_sequences() {
        assert!(is_style_sequence("\x1b[0m"));
        assert!(is_style_sequence("\x1b[1;38;2;255;0;0m"));
        assert!(is_style_sequence("\x1b[m"));
        assert!(is_style_sequence("\x1b]8;;https://example.com\x1b\\"));
        assert!(!is_style_sequence("\x1b[2J"));
        assert!(!is_style_sequence("\x1b[H"));
        assert!(!is_style_sequence("\x1b[?25l"));
        assert!(!is_style_sequence("\x1b]0;title\x07"));
    }
}
