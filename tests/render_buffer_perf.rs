use std::time::{Duration, Instant};

use chatline::RenderBuffer;

fn filled(lines: usize) -> RenderBuffer {
    let mut buffer = RenderBuffer::new();
    for idx in 0..lines {
        buffer.append(&format!("assistant line {idx}: streamed response text\n"));
    }
    buffer
}

#[test]
fn tail_of_large_transcript_reports_hidden_lines() {
    let buffer = filled(5_000);
    assert_eq!(buffer.total_lines(), 5_000);

    let tail = buffer.get_tail(300);
    assert_eq!(tail.hidden_lines_count, 4_700);
    assert_eq!(tail.total_lines, 5_000);
    assert_eq!(tail.lines().count(), 300);
    assert_eq!(
        tail.lines().next(),
        Some("assistant line 4700: streamed response text")
    );
}

#[test]
fn tail_read_is_well_under_budget() {
    let buffer = filled(5_000);

    let started = Instant::now();
    let tail = buffer.get_tail(300);
    let elapsed = started.elapsed();

    assert_eq!(tail.hidden_lines_count, 4_700);
    assert!(
        elapsed < Duration::from_millis(100),
        "get_tail(300) took {elapsed:?}"
    );
}

#[test]
fn streaming_appends_keep_line_count() {
    let mut buffer = filled(5_000);
    for idx in 0..1_000 {
        buffer.append(&format!("token{idx} "));
    }
    buffer.append("\n");
    assert_eq!(buffer.total_lines(), 5_001);
    assert_eq!(buffer.get_tail(1).hidden_lines_count, 5_000);
}
