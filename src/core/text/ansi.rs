//! ANSI escape extraction and SGR style tracking.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiCodeKind {
    Csi,
    Osc,
    Ss3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiCode {
    pub code: String,
    pub length: usize,
    pub kind: AnsiCodeKind,
}

impl AnsiCode {
    /// Parameter bytes and final byte of a CSI sequence (`"2K"` for `ESC [ 2 K`).
    pub fn csi_parts(&self) -> Option<(&str, char)> {
        if self.kind != AnsiCodeKind::Csi {
            return None;
        }
        let body = self.code.strip_prefix("\x1b[")?;
        let final_byte = body.chars().last()?;
        Some((&body[..body.len() - final_byte.len_utf8()], final_byte))
    }
}

/// Extract the escape sequence starting at byte `pos`, if one starts there and is complete.
pub fn extract_ansi_code(input: &str, pos: usize) -> Option<AnsiCode> {
    let (end, kind) = sequence_end(input.as_bytes(), pos)?;
    let code = input.get(pos..end)?;
    Some(AnsiCode {
        code: code.to_string(),
        length: end - pos,
        kind,
    })
}

/// Exclusive end of the sequence introduced by the ESC at `pos`.
fn sequence_end(bytes: &[u8], pos: usize) -> Option<(usize, AnsiCodeKind)> {
    if bytes.get(pos) != Some(&0x1b) {
        return None;
    }
    let body = pos + 2;
    match bytes.get(pos + 1)? {
        b'[' => {
            let offset = bytes.get(body..)?.iter().position(|b| (0x40..=0x7e).contains(b))?;
            Some((body + offset + 1, AnsiCodeKind::Csi))
        }
        // OSC ends at BEL or ST (ESC \).
        b']' => bytes
            .get(body..)?
            .iter()
            .enumerate()
            .find_map(|(offset, &b)| match b {
                0x07 => Some(body + offset + 1),
                0x1b if bytes.get(body + offset + 1) == Some(&b'\\') => Some(body + offset + 2),
                _ => None,
            })
            .map(|end| (end, AnsiCodeKind::Osc)),
        b'O' if bytes.len() > body => Some((body + 1, AnsiCodeKind::Ss3)),
        _ => None,
    }
}

/// Graphic rendition carried by each rendered cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: bool,
    pub dim: bool,
    pub inverse: bool,
    pub underline: bool,
    /// 256-color palette index; basic colors 30-37/90-97 are folded into 0-15.
    pub fg: Option<u8>,
    pub bg: Option<u8>,
}

impl CellStyle {
    /// Whether this style renders as secondary "ghost" text.
    pub fn is_muted(&self) -> bool {
        self.dim || self.fg.is_some()
    }

    /// SGR sequence that reproduces this style from a reset state.
    pub fn to_sgr(&self) -> String {
        let mut params = vec!["0".to_string()];
        for (enabled, code) in [
            (self.bold, "1"),
            (self.dim, "2"),
            (self.underline, "4"),
            (self.inverse, "7"),
        ] {
            if enabled {
                params.push(code.to_string());
            }
        }
        if let Some(fg) = self.fg {
            params.push(format!("38;5;{fg}"));
        }
        if let Some(bg) = self.bg {
            params.push(format!("48;5;{bg}"));
        }
        format!("\x1b[{}m", params.join(";"))
    }

    /// Apply the parameter list of an SGR (`ESC [ ... m`) sequence.
    pub fn apply_sgr(&mut self, params: &str) {
        if params.is_empty() {
            *self = CellStyle::default();
            return;
        }

        let parts: Vec<u16> = params
            .split(';')
            .map(|part| part.parse::<u16>().unwrap_or(0))
            .collect();
        let mut idx = 0;
        while idx < parts.len() {
            let code = parts[idx];
            if (code == 38 || code == 48) && idx + 2 < parts.len() && parts[idx + 1] == 5 {
                let color = u8::try_from(parts[idx + 2]).ok();
                if code == 38 {
                    self.fg = color;
                } else {
                    self.bg = color;
                }
                idx += 3;
                continue;
            }

            match code {
                0 => *self = CellStyle::default(),
                1 => self.bold = true,
                2 => self.dim = true,
                4 => self.underline = true,
                7 => self.inverse = true,
                22 => {
                    self.bold = false;
                    self.dim = false;
                }
                24 => self.underline = false,
                27 => self.inverse = false,
                39 => self.fg = None,
                49 => self.bg = None,
                30..=37 => self.fg = Some((code - 30) as u8),
                90..=97 => self.fg = Some((code - 90 + 8) as u8),
                40..=47 => self.bg = Some((code - 40) as u8),
                100..=107 => self.bg = Some((code - 100 + 8) as u8),
                _ => {}
            }
            idx += 1;
        }
    }
}
