//! Structured input events and the raw terminal byte decoder.

use crate::core::text::ansi::{extract_ansi_code, AnsiCodeKind};

const PASTE_START: &str = "\x1b[200~";
const PASTE_END: &str = "\x1b[201~";
const SGR_MOUSE_PREFIX: &str = "\x1b[<";

/// Input event delivered to the shell and the line editor.
///
/// Notes:
/// - `raw` is the exact sequence received from the terminal when applicable.
/// - `key_id` is a normalized identifier for matching keybindings.
/// - Text and paste events carry decoded text; any text source (typing, composition, paste)
///   ends up in the same insertion path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key { raw: String, key_id: String },
    Text { raw: String, text: String },
    Paste { raw: String, text: String },
    Mouse(MouseReport),
    Resize { columns: u16, rows: u16 },
    UnknownRaw { raw: String },
}

impl InputEvent {
    /// A named key press from an embedder that already decoded its keys.
    pub fn key(key_id: impl Into<String>) -> Self {
        let key_id = key_id.into();
        InputEvent::Key {
            raw: key_id.clone(),
            key_id,
        }
    }

    /// Composed or typed text, one or more graphemes.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        InputEvent::Text {
            raw: text.clone(),
            text,
        }
    }

    pub fn paste(text: impl Into<String>) -> Self {
        let text = text.into();
        InputEvent::Paste {
            raw: text.clone(),
            text,
        }
    }

    pub fn key_id(&self) -> Option<&str> {
        match self {
            InputEvent::Key { key_id, .. } => Some(key_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Press,
    Release,
    Drag,
    Move,
    Wheel,
}

/// An SGR (1006) mouse report. `col`/`row` are zero-based terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseReport {
    pub button: MouseButton,
    pub kind: MouseKind,
    pub col: u16,
    pub row: u16,
}

/// Decode a chunk read from a raw-mode terminal into events, in arrival order.
pub fn parse_input_events(data: &str) -> Vec<InputEvent> {
    let mut events = Vec::new();
    let mut text = String::new();
    let mut idx = 0;

    let flush_text = |text: &mut String, events: &mut Vec<InputEvent>| {
        if !text.is_empty() {
            events.push(InputEvent::text(std::mem::take(text)));
        }
    };

    while idx < data.len() {
        let rest = &data[idx..];

        if let Some(after_start) = rest.strip_prefix(PASTE_START) {
            flush_text(&mut text, &mut events);
            let Some(end_rel) = after_start.find(PASTE_END) else {
                events.push(InputEvent::UnknownRaw {
                    raw: rest.to_string(),
                });
                break;
            };
            let raw_len = PASTE_START.len() + end_rel + PASTE_END.len();
            events.push(InputEvent::Paste {
                raw: rest[..raw_len].to_string(),
                text: after_start[..end_rel].to_string(),
            });
            idx += raw_len;
            continue;
        }

        if rest.starts_with('\x1b') {
            flush_text(&mut text, &mut events);
            let (event, consumed) = parse_escape(rest);
            events.push(event);
            idx += consumed;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        idx += ch.len_utf8();

        if let Some(key_id) = control_key_id(ch) {
            flush_text(&mut text, &mut events);
            events.push(InputEvent::Key {
                raw: ch.to_string(),
                key_id,
            });
            continue;
        }
        text.push(ch);
    }

    flush_text(&mut text, &mut events);
    events
}

fn control_key_id(ch: char) -> Option<String> {
    let id = match ch {
        '\r' | '\n' => "enter".to_string(),
        '\t' => "tab".to_string(),
        '\x7f' | '\x08' => "backspace".to_string(),
        '\x00' => "ctrl+space".to_string(),
        '\x01'..='\x1a' => {
            let letter = (b'a' + (ch as u8 - 1)) as char;
            format!("ctrl+{letter}")
        }
        _ if ch.is_control() => return Some(format!("unknown+{:02x}", ch as u32)),
        _ => return None,
    };
    Some(id)
}

/// Parse one escape sequence at the start of `data`; returns the event and bytes consumed.
fn parse_escape(data: &str) -> (InputEvent, usize) {
    if data.starts_with(SGR_MOUSE_PREFIX) {
        if let Some((report, consumed)) = parse_sgr_mouse(data) {
            return (InputEvent::Mouse(report), consumed);
        }
    }

    if let Some(code) = extract_ansi_code(data, 0) {
        let key_id = match code.kind {
            AnsiCodeKind::Csi => code.csi_parts().and_then(|(params, final_byte)| {
                csi_key_id(params, final_byte)
            }),
            AnsiCodeKind::Ss3 => code.code.chars().nth(2).and_then(cursor_key_name),
            AnsiCodeKind::Osc => None,
        };
        let event = match key_id {
            Some(key_id) => InputEvent::Key {
                raw: code.code.clone(),
                key_id,
            },
            None => InputEvent::UnknownRaw { raw: code.code },
        };
        return (event, code.length);
    }

    // ESC followed by a plain character is alt+<char>; a lone ESC is escape.
    let mut chars = data.chars();
    chars.next();
    match chars.next() {
        Some(ch) if ch != '\x1b' && !ch.is_control() => {
            let consumed = 1 + ch.len_utf8();
            (
                InputEvent::Key {
                    raw: data[..consumed].to_string(),
                    key_id: format!("alt+{}", ch.to_ascii_lowercase()),
                },
                consumed,
            )
        }
        _ => (
            InputEvent::Key {
                raw: "\x1b".to_string(),
                key_id: "escape".to_string(),
            },
            1,
        ),
    }
}

fn cursor_key_name(final_byte: char) -> Option<String> {
    let name = match final_byte {
        'A' => "up",
        'B' => "down",
        'C' => "right",
        'D' => "left",
        'H' => "home",
        'F' => "end",
        _ => return None,
    };
    Some(name.to_string())
}

fn csi_key_id(params: &str, final_byte: char) -> Option<String> {
    let mut fields = params.split(';');
    let first = fields.next().unwrap_or("");
    let modifier = fields
        .next()
        .and_then(|value| value.parse::<u8>().ok())
        .unwrap_or(1);

    let base = match final_byte {
        '~' => match first {
            "1" | "7" => "home".to_string(),
            "2" => "insert".to_string(),
            "3" => "delete".to_string(),
            "4" | "8" => "end".to_string(),
            "5" => "pageup".to_string(),
            "6" => "pagedown".to_string(),
            _ => return None,
        },
        'Z' => return Some("shift+tab".to_string()),
        other => cursor_key_name(other)?,
    };

    Some(format!("{}{base}", modifier_prefix(modifier)))
}

/// xterm modifier parameter (1 + bitmask of shift=1, alt=2, ctrl=4, meta=8) as key id prefixes.
fn modifier_prefix(param: u8) -> String {
    let mask = param.saturating_sub(1);
    let mut prefix = String::new();
    if mask & 4 != 0 {
        prefix.push_str("ctrl+");
    }
    if mask & 2 != 0 {
        prefix.push_str("alt+");
    }
    if mask & 8 != 0 {
        prefix.push_str("meta+");
    }
    if mask & 1 != 0 {
        prefix.push_str("shift+");
    }
    prefix
}

fn parse_sgr_mouse(data: &str) -> Option<(MouseReport, usize)> {
    let body = &data[SGR_MOUSE_PREFIX.len()..];
    let end = body.find(['M', 'm'])?;
    let pressed = &body[end..=end] == "M";
    let mut fields = body[..end].split(';').map(|field| field.parse::<u16>().ok());
    let code = fields.next()??;
    let col = fields.next()??;
    let row = fields.next()??;

    let button = match code & 0b11 {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        2 => MouseButton::Right,
        _ => MouseButton::None,
    };
    let kind = if code & 64 != 0 {
        MouseKind::Wheel
    } else if code & 32 != 0 {
        if button == MouseButton::None {
            MouseKind::Move
        } else {
            MouseKind::Drag
        }
    } else if pressed {
        MouseKind::Press
    } else {
        MouseKind::Release
    };

    Some((
        MouseReport {
            button,
            kind,
            col: col.saturating_sub(1),
            row: row.saturating_sub(1),
        },
        SGR_MOUSE_PREFIX.len() + end + 1,
    ))
}
