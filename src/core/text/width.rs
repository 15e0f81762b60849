//! Cell widths.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::extract_ansi_code;

/// Cells taken by one grapheme cluster. Only the base char counts, so combining marks and
/// ZWJ tails add nothing.
pub fn grapheme_width(grapheme: &str) -> usize {
    grapheme.chars().next().and_then(|base| base.width()).unwrap_or(0)
}

/// Printable text of `input` with escape sequences removed.
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut rest_from = 0;
    for (idx, ch) in input.char_indices() {
        if idx < rest_from {
            continue;
        }
        match extract_ansi_code(input, idx) {
            Some(code) => rest_from = idx + code.length,
            None => clean.push(ch),
        }
    }
    clean
}

/// Number of terminal cells `input` occupies, ignoring escape sequences.
pub fn visible_width(input: &str) -> usize {
    strip_ansi(input).graphemes(true).map(grapheme_width).sum()
}
