//! Stdin chunk buffering.
//!
//! Reads can split an escape sequence, a bracketed paste or a UTF-8 character. The buffer holds
//! back an incomplete tail until the next read completes it or the flush deadline passes, so a
//! lone Escape still arrives as a key.

use std::time::{Duration, Instant};

use crate::core::input_event::{parse_input_events, InputEvent};

const ESC: u8 = 0x1b;
const PASTE_START: &[u8] = b"\x1b[200~";
const PASTE_END: &[u8] = b"\x1b[201~";

pub struct StdinBuffer {
    pending: Vec<u8>,
    timeout: Duration,
    flush_deadline: Option<Instant>,
}

impl StdinBuffer {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            pending: Vec::new(),
            timeout: Duration::from_millis(timeout_ms),
            flush_deadline: None,
        }
    }

    /// Append a chunk and decode everything that is complete.
    pub fn process(&mut self, data: &[u8], now: Instant) -> Vec<InputEvent> {
        self.pending.extend_from_slice(data);
        let ready_len = complete_prefix_len(&self.pending);
        let ready: Vec<u8> = self.pending.drain(..ready_len).collect();
        self.flush_deadline = if self.pending.is_empty() {
            None
        } else {
            Some(now + self.timeout)
        };
        decode(&ready)
    }

    /// Decode a held-back tail once its deadline has passed.
    pub fn flush_due(&mut self, now: Instant) -> Vec<InputEvent> {
        match self.flush_deadline {
            Some(deadline) if now >= deadline => self.flush(),
            _ => Vec::new(),
        }
    }

    /// Poll timeout: time left until the flush deadline, or `default_ms` when nothing is held.
    pub fn next_timeout_ms(&self, now: Instant, default_ms: i32) -> i32 {
        match self.flush_deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(now).as_millis();
                remaining.min(default_ms.max(0) as u128) as i32
            }
            None => default_ms,
        }
    }

    pub fn flush(&mut self) -> Vec<InputEvent> {
        self.flush_deadline = None;
        let pending = std::mem::take(&mut self.pending);
        decode(&pending)
    }

    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}

fn decode(bytes: &[u8]) -> Vec<InputEvent> {
    if bytes.is_empty() {
        return Vec::new();
    }
    parse_input_events(&String::from_utf8_lossy(bytes))
}

/// Length of the prefix that can be decoded without waiting for more bytes.
fn complete_prefix_len(bytes: &[u8]) -> usize {
    let utf8_end = match std::str::from_utf8(bytes) {
        Ok(_) => bytes.len(),
        Err(err) if err.error_len().is_none() => err.valid_up_to(),
        Err(_) => bytes.len(),
    };
    let text = &bytes[..utf8_end];

    if let Some(start) = rfind(text, PASTE_START) {
        if rfind(&text[start..], PASTE_END).is_none() {
            return start;
        }
    }

    match text.iter().rposition(|&b| b == ESC) {
        Some(esc) if !escape_complete(&text[esc..]) => esc,
        _ => utf8_end,
    }
}

fn escape_complete(seq: &[u8]) -> bool {
    match seq.get(1) {
        None => false,
        Some(b'[') => seq[2..].iter().any(|b| (0x40..=0x7e).contains(b)),
        Some(b'O') => seq.len() >= 3,
        Some(_) => true,
    }
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len())
        .rev()
        .find(|&idx| haystack[idx..].starts_with(needle))
}

#[cfg(test)]
mod tests {
    use super::StdinBuffer;
    use crate::core::input_event::InputEvent;
    use std::time::{Duration, Instant};

    #[test]
    fn split_csi_waits_for_its_final_byte() {
        let now = Instant::now();
        let mut buffer = StdinBuffer::new(10);
        assert_eq!(buffer.process(b"ab\x1b[", now), vec![InputEvent::text("ab")]);
        assert_eq!(buffer.pending(), b"\x1b[");
        let events = buffer.process(b"D", now);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key_id(), Some("left"));
    }

    #[test]
    fn lone_escape_flushes_after_timeout() {
        let now = Instant::now();
        let mut buffer = StdinBuffer::new(10);
        assert!(buffer.process(b"\x1b", now).is_empty());
        assert_eq!(buffer.next_timeout_ms(now, 50), 10);
        assert!(buffer.flush_due(now + Duration::from_millis(5)).is_empty());
        let events = buffer.flush_due(now + Duration::from_millis(10));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key_id(), Some("escape"));
        assert_eq!(buffer.next_timeout_ms(now, 50), 50);
    }

    #[test]
    fn paste_split_across_reads_arrives_whole() {
        let now = Instant::now();
        let mut buffer = StdinBuffer::new(10);
        assert!(buffer.process(b"\x1b[200~cat ab", now).is_empty());
        let events = buffer.process(b"out\x1b[201~", now);
        assert_eq!(events.len(), 1);
        match &events[0] {
            InputEvent::Paste { text, .. } => assert_eq!(text, "cat about"),
            other => panic!("expected paste, got {other:?}"),
        }
    }

    #[test]
    fn split_utf8_is_reassembled() {
        let now = Instant::now();
        let mut buffer = StdinBuffer::new(10);
        let bytes = "é".as_bytes();
        assert!(buffer.process(&bytes[..1], now).is_empty());
        assert_eq!(buffer.process(&bytes[1..], now), vec![InputEvent::text("é")]);
    }
}
