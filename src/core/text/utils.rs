//! Grapheme and column helpers shared by the editor and the hit-testers.

use unicode_segmentation::UnicodeSegmentation;

use super::width::grapheme_width;

pub fn grapheme_segments(text: &str) -> unicode_segmentation::Graphemes<'_> {
    UnicodeSegmentation::graphemes(text, true)
}

/// Byte length of the grapheme ending at `cursor`.
pub fn previous_grapheme_len(text: &str, cursor: usize) -> usize {
    grapheme_segments(&text[..cursor])
        .next_back()
        .map(str::len)
        .unwrap_or(0)
}

/// Byte length of the grapheme starting at `cursor`.
pub fn next_grapheme_len(text: &str, cursor: usize) -> usize {
    grapheme_segments(&text[cursor..])
        .next()
        .map(str::len)
        .unwrap_or(0)
}

/// A grapheme of rendered text together with the cell columns it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpan<'a> {
    pub text: &'a str,
    pub byte_start: usize,
    pub col_start: usize,
    pub col_end: usize,
}

/// Lay `text` out on a cell grid starting at column zero.
pub fn column_spans(text: &str) -> Vec<ColumnSpan<'_>> {
    let mut col = 0;
    let mut spans = Vec::new();
    for (byte_start, grapheme) in text.grapheme_indices(true) {
        let width = grapheme_width(grapheme).max(1);
        spans.push(ColumnSpan {
            text: grapheme,
            byte_start,
            col_start: col,
            col_end: col + width,
        });
        col += width;
    }
    spans
}

/// Column at which byte offset `byte` of `text` is drawn.
pub fn column_of_byte(text: &str, byte: usize) -> usize {
    let spans = column_spans(text);
    spans
        .iter()
        .find(|span| span.byte_start >= byte)
        .map(|span| span.col_start)
        .unwrap_or_else(|| spans.last().map(|span| span.col_end).unwrap_or(0))
}
