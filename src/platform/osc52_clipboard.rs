//! System clipboard through the terminal's OSC 52 escape.

use std::io::Write;

use base64::{engine::general_purpose, Engine as _};
use log::debug;

use crate::runtime::command::{Clipboard, ClipboardError};

/// Escape asking the terminal emulator to put `text` on the system clipboard.
pub fn osc52_copy_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", general_purpose::STANDARD.encode(text))
}

/// Copies by writing OSC 52 to the terminal. Terminals rarely answer clipboard queries, so
/// pasting returns the last text copied through this clipboard.
pub struct Osc52Clipboard<W: Write> {
    out: W,
    last_copied: Option<String>,
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_copied: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Clipboard for Osc52Clipboard<W> {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        self.last_copied.clone().ok_or(ClipboardError::Empty)
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.out
            .write_all(osc52_copy_sequence(text).as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|err| ClipboardError::Backend(err.to_string()))?;
        debug!("copied {} bytes through OSC 52", text.len());
        self.last_copied = Some(text.to_string());
        Ok(())
    }
}
