//! Selection ranges derived from pointer cells.

use std::ops::Range;

use crate::core::surface::{CellAddress, SelectionRange, TerminalSurface};
use crate::core::text::utils::column_spans;

/// Linear selection covering both cells inclusively, whichever order they were given in.
///
/// Cells are flattened row-major on a grid `cols` wide, so a drag across rows selects the tail
/// of the first row, every row in between and the head of the last row.
pub fn selection_between(
    anchor: CellAddress,
    current: CellAddress,
    cols: usize,
) -> Option<SelectionRange> {
    if cols == 0 {
        return None;
    }
    let mut start = anchor.flat_index(cols);
    let mut end = current.flat_index(cols);
    if end < start {
        std::mem::swap(&mut start, &mut end);
    }
    Some(SelectionRange {
        start_col: start % cols,
        start_row: start / cols,
        length: end - start + 1,
    })
}

/// Column range of the whitespace-delimited word drawn over `col`.
///
/// `None` when the column is past the text or lands on whitespace.
pub fn word_columns_at(line: &str, col: usize) -> Option<Range<usize>> {
    let spans = column_spans(line);
    let hit = spans
        .iter()
        .position(|span| span.col_start <= col && col < span.col_end)?;
    let is_blank = |idx: usize| spans[idx].text.chars().all(char::is_whitespace);
    if is_blank(hit) {
        return None;
    }

    let mut first = hit;
    while first > 0 && !is_blank(first - 1) {
        first -= 1;
    }
    let mut last = hit;
    while last + 1 < spans.len() && !is_blank(last + 1) {
        last += 1;
    }
    Some(spans[first].col_start..spans[last].col_end)
}

/// Select the drag range between two cells on the surface's live grid.
pub fn select_between<S: TerminalSurface + ?Sized>(
    surface: &mut S,
    anchor: CellAddress,
    current: CellAddress,
) -> Option<SelectionRange> {
    let dims = surface.dimensions()?;
    let range = selection_between(anchor, current, dims.cols)?;
    surface.select(range);
    Some(range)
}

/// Select the word under `cell`; leaves the selection untouched when there is none.
pub fn select_word_at<S: TerminalSurface + ?Sized>(
    surface: &mut S,
    cell: CellAddress,
) -> Option<SelectionRange> {
    let line = surface.line_text(cell.row)?;
    let columns = word_columns_at(&line, cell.col)?;
    let range = SelectionRange::new(columns.start, cell.row, columns.len());
    surface.select(range);
    Some(range)
}

/// Select every cell of a visible row.
pub fn select_line_at<S: TerminalSurface + ?Sized>(
    surface: &mut S,
    row: usize,
) -> Option<SelectionRange> {
    let dims = surface.dimensions()?;
    if row >= dims.rows {
        return None;
    }
    let range = SelectionRange::new(0, row, dims.cols);
    surface.select(range);
    Some(range)
}
