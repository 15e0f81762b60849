//! In-memory terminal grid.
//!
//! Interprets the subset of VT output the line editor and the command shell produce (printable
//! text with wide characters, CR/LF/BS/BEL/TAB, SGR styling, line and screen erase, absolute and
//! relative cursor moves) and keeps the result readable cell by cell. Rows are addressed relative
//! to the visible viewport; lines scrolled off the top stay in the scrollback.

use crate::core::surface::{GridDimensions, SelectionRange, TerminalSurface};
use crate::core::text::ansi::{extract_ansi_code, AnsiCodeKind, CellStyle};
use crate::core::text::utils::grapheme_segments;
use crate::core::text::width::grapheme_width;

const DEFAULT_SCROLLBACK: usize = 1000;
const TAB_STOP: usize = 8;

/// One cell of the grid. A wide grapheme occupies its cell plus a following tail cell whose
/// text is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub style: CellStyle,
}

impl Cell {
    fn blank() -> Self {
        Self {
            text: " ".to_string(),
            style: CellStyle::default(),
        }
    }

    fn is_wide_tail(&self) -> bool {
        self.text.is_empty()
    }
}

type Row = Vec<Cell>;

#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    cols: usize,
    rows: usize,
    /// Scrollback followed by the viewport; the viewport is always the last `rows` lines.
    lines: Vec<Row>,
    cursor_col: usize,
    cursor_row: usize,
    style: CellStyle,
    selection: Option<SelectionRange>,
    bell_count: usize,
    scrollback_limit: usize,
    mounted: bool,
}

impl ScreenBuffer {
    pub fn new(cols: usize, rows: usize) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            lines: (0..rows).map(|_| blank_row(cols)).collect(),
            cursor_col: 0,
            cursor_row: 0,
            style: CellStyle::default(),
            selection: None,
            bell_count: 0,
            scrollback_limit: DEFAULT_SCROLLBACK,
            mounted: true,
        }
    }

    pub fn with_scrollback_limit(mut self, limit: usize) -> Self {
        self.scrollback_limit = limit;
        self
    }

    /// Stop reporting dimensions, as a renderer does before it is attached or fitted.
    pub fn detach(&mut self) {
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Refit the grid. Lines are truncated or padded to the new width; the viewport grows
    /// downward and shrinks into the scrollback.
    pub fn resize(&mut self, cols: usize, rows: usize) {
        let cols = cols.max(1);
        let rows = rows.max(1);
        let absolute_row = self.viewport_top() + self.cursor_row;
        for line in &mut self.lines {
            line.resize_with(cols, Cell::blank);
            if line.last().is_some_and(|cell| grapheme_width(&cell.text) > 1) {
                if let Some(last) = line.last_mut() {
                    *last = Cell::blank();
                }
            }
        }
        while self.lines.len() < rows {
            self.lines.push(blank_row(cols));
        }

        self.cols = cols;
        self.rows = rows;
        let new_top = self.viewport_top();
        self.cursor_row = absolute_row.saturating_sub(new_top).min(rows - 1);
        self.cursor_col = self.cursor_col.min(cols - 1);
        self.selection = None;
        self.mounted = true;
    }

    /// Viewport-relative cursor position; the column may equal `cols` while a wrap is pending.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_col, self.cursor_row)
    }

    /// How many BEL characters have been written.
    pub fn bell_count(&self) -> usize {
        self.bell_count
    }

    pub fn scrollback_len(&self) -> usize {
        self.viewport_top()
    }

    pub fn style_at(&self, col: usize, row: usize) -> Option<CellStyle> {
        self.viewport_row(row)?.get(col).map(|cell| cell.style)
    }

    /// Visible rows with trailing blanks removed.
    pub fn visible_lines(&self) -> Vec<String> {
        self.lines[self.viewport_top()..]
            .iter()
            .map(|row| row_text(row).trim_end().to_string())
            .collect()
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    /// Columns of a visible row covered by the selection.
    pub fn selection_columns(&self, row: usize) -> Option<std::ops::Range<usize>> {
        let range = self.selection?;
        if row >= self.rows {
            return None;
        }
        let start = range.start_row * self.cols + range.start_col;
        let end = start + range.length;
        let row_start = row * self.cols;
        let from = start.max(row_start);
        let to = end.min(row_start + self.cols);
        (from < to).then(|| from - row_start..to - row_start)
    }

    /// A visible row as styled output, selected cells in inverse video.
    pub fn render_row(&self, row: usize) -> Option<String> {
        let line = self.viewport_row(row)?;
        let selected = self.selection_columns(row).unwrap_or(0..0);
        let mut output = String::new();
        let mut current: Option<CellStyle> = None;
        for (col, cell) in line.iter().enumerate() {
            let mut style = cell.style;
            if selected.contains(&col) {
                style.inverse = !style.inverse;
            }
            if current != Some(style) {
                output.push_str(&style.to_sgr());
                current = Some(style);
            }
            output.push_str(&cell.text);
        }
        output.push_str("\x1b[0m");
        Some(output)
    }

    fn viewport_top(&self) -> usize {
        self.lines.len().saturating_sub(self.rows)
    }

    fn viewport_row(&self, row: usize) -> Option<&Row> {
        if row >= self.rows {
            return None;
        }
        self.lines.get(self.viewport_top() + row)
    }

    fn cursor_line(&mut self) -> &mut Row {
        let idx = self.viewport_top() + self.cursor_row;
        &mut self.lines[idx]
    }

    fn line_feed(&mut self) {
        if self.cursor_row + 1 < self.rows {
            self.cursor_row += 1;
            return;
        }
        self.lines.push(blank_row(self.cols));
        let excess = self
            .lines
            .len()
            .saturating_sub(self.rows + self.scrollback_limit);
        if excess > 0 {
            self.lines.drain(..excess);
        }
        // Viewport-relative selections no longer point at the text they covered.
        self.selection = None;
    }

    fn put_grapheme(&mut self, grapheme: &str) {
        let width = grapheme_width(grapheme);
        if width == 0 {
            self.attach_to_previous(grapheme);
            return;
        }
        if width > self.cols {
            return;
        }
        if self.cursor_col + width > self.cols {
            self.cursor_col = 0;
            self.line_feed();
        }

        let col = self.cursor_col;
        let style = self.style;
        let line = self.cursor_line();
        release_cell(line, col);
        if width == 2 {
            release_cell(line, col + 1);
        }
        line[col] = Cell {
            text: grapheme.to_string(),
            style,
        };
        if width == 2 {
            line[col + 1] = Cell {
                text: String::new(),
                style,
            };
        }
        self.cursor_col = col + width;
    }

    fn attach_to_previous(&mut self, mark: &str) {
        let mut col = self.cursor_col.min(self.cols);
        let line = self.cursor_line();
        while col > 0 {
            col -= 1;
            if !line[col].is_wide_tail() {
                line[col].text.push_str(mark);
                return;
            }
        }
    }

    fn erase_cells(&mut self, range: std::ops::Range<usize>) {
        let line = self.cursor_line();
        let end = range.end.min(line.len());
        for cell in &mut line[range.start.min(end)..end] {
            *cell = Cell::blank();
        }
    }

    fn erase_rows(&mut self, rows: std::ops::Range<usize>) {
        let top = self.viewport_top();
        for row in rows {
            if let Some(line) = self.lines.get_mut(top + row) {
                *line = blank_row(self.cols);
            }
        }
    }

    fn apply_control(&mut self, ch: char) {
        match ch {
            '\r' => self.cursor_col = 0,
            '\n' => self.line_feed(),
            '\x08' => self.cursor_col = self.cursor_col.min(self.cols - 1).saturating_sub(1),
            '\x07' => self.bell_count += 1,
            '\t' => {
                let next = (self.cursor_col / TAB_STOP + 1) * TAB_STOP;
                self.cursor_col = next.min(self.cols - 1);
            }
            _ => {}
        }
    }

    fn apply_csi(&mut self, params: &str, final_byte: char) {
        // Private-mode toggles (`?2004h`, mouse reporting) have no effect on the grid.
        if params.starts_with('?') {
            return;
        }
        let mut numbers = params.split(';').map(|part| part.parse::<usize>().ok());
        let first = numbers.next().flatten();
        let count = first.unwrap_or(1).max(1);

        match final_byte {
            'm' => self.style.apply_sgr(params),
            'K' => {
                let col = self.cursor_col.min(self.cols);
                match first.unwrap_or(0) {
                    0 => self.erase_cells(col..self.cols),
                    1 => self.erase_cells(0..(col + 1).min(self.cols)),
                    2 => self.erase_cells(0..self.cols),
                    _ => {}
                }
            }
            'J' => match first.unwrap_or(0) {
                0 => {
                    let col = self.cursor_col.min(self.cols);
                    self.erase_cells(col..self.cols);
                    self.erase_rows(self.cursor_row + 1..self.rows);
                }
                1 => {
                    self.erase_rows(0..self.cursor_row);
                    self.erase_cells(0..(self.cursor_col + 1).min(self.cols));
                }
                2 | 3 => self.erase_rows(0..self.rows),
                _ => {}
            },
            'G' => self.cursor_col = (count - 1).min(self.cols - 1),
            'H' | 'f' => {
                let col = numbers.next().flatten().unwrap_or(1).max(1);
                self.cursor_row = (count - 1).min(self.rows - 1);
                self.cursor_col = (col - 1).min(self.cols - 1);
            }
            'A' => self.cursor_row = self.cursor_row.saturating_sub(count),
            'B' => self.cursor_row = (self.cursor_row + count).min(self.rows - 1),
            'C' => self.cursor_col = (self.cursor_col + count).min(self.cols - 1),
            'D' => self.cursor_col = self.cursor_col.min(self.cols - 1).saturating_sub(count),
            _ => {}
        }
    }

    fn write_text_run(&mut self, run: &str) {
        for grapheme in grapheme_segments(run) {
            self.put_grapheme(grapheme);
        }
    }
}

impl TerminalSurface for ScreenBuffer {
    fn write(&mut self, data: &str) {
        let mut idx = 0;
        while idx < data.len() {
            let rest = &data[idx..];
            let Some(ch) = rest.chars().next() else {
                break;
            };

            if ch == '\x1b' {
                match extract_ansi_code(data, idx) {
                    Some(code) => {
                        if code.kind == AnsiCodeKind::Csi {
                            if let Some((params, final_byte)) = code.csi_parts() {
                                self.apply_csi(params, final_byte);
                            }
                        }
                        idx += code.length;
                    }
                    None => idx += 1,
                }
                continue;
            }

            if ch.is_control() {
                self.apply_control(ch);
                idx += ch.len_utf8();
                continue;
            }

            let run_len = rest
                .find(|c: char| c == '\x1b' || c.is_control())
                .unwrap_or(rest.len());
            self.write_text_run(&rest[..run_len]);
            idx += run_len;
        }
    }

    fn clear(&mut self) {
        let idx = self.viewport_top() + self.cursor_row;
        let kept = std::mem::replace(&mut self.lines[idx], blank_row(self.cols));
        self.lines.clear();
        self.lines.push(kept);
        while self.lines.len() < self.rows {
            self.lines.push(blank_row(self.cols));
        }
        self.cursor_row = 0;
        self.selection = None;
    }

    fn dimensions(&self) -> Option<GridDimensions> {
        self.mounted
            .then(|| GridDimensions::new(self.cols, self.rows))
    }

    fn line_text(&self, row: usize) -> Option<String> {
        self.viewport_row(row).map(|line| row_text(line))
    }

    fn cell_char(&self, col: usize, row: usize) -> Option<String> {
        self.viewport_row(row)?.get(col).map(|cell| cell.text.clone())
    }

    fn select(&mut self, range: SelectionRange) {
        self.selection = (range.length > 0).then_some(range);
    }

    fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn selected_text(&self) -> String {
        let Some(range) = self.selection else {
            return String::new();
        };
        let total = self.cols * self.rows;
        let start = (range.start_row * self.cols + range.start_col).min(total);
        let end = (start + range.length).min(total);
        if start >= end {
            return String::new();
        }

        let mut rows_text = Vec::new();
        let mut flat = start;
        while flat < end {
            let row = flat / self.cols;
            let col = flat % self.cols;
            let row_end = ((row + 1) * self.cols).min(end);
            let Some(line) = self.viewport_row(row) else {
                break;
            };
            let segment = row_text(&line[col..col + (row_end - flat)]);
            rows_text.push(segment.trim_end().to_string());
            flat = row_end;
        }
        let text = rows_text.join("\n");
        text.trim_end_matches('\n').to_string()
    }

    fn has_selection(&self) -> bool {
        self.selection.is_some()
    }
}

fn blank_row(cols: usize) -> Row {
    vec![Cell::blank(); cols]
}

fn row_text(cells: &[Cell]) -> String {
    cells.iter().map(|cell| cell.text.as_str()).collect()
}

/// Blank whatever half of a wide character would be left orphaned by overwriting `col`.
fn release_cell(line: &mut Row, col: usize) {
    if col >= line.len() {
        return;
    }
    if line[col].is_wide_tail() && col > 0 {
        line[col - 1] = Cell::blank();
    } else if col + 1 < line.len() && line[col + 1].is_wide_tail() {
        line[col + 1] = Cell::blank();
    }
}

#[cfg(test)]
mod tests {
    use super::ScreenBuffer;
    use crate::core::surface::{SelectionRange, TerminalSurface};

    #[test]
    fn text_lands_at_cursor_and_wraps() {
        let mut screen = ScreenBuffer::new(5, 3);
        screen.write("abcdefg");
        assert_eq!(screen.visible_lines(), vec!["abcde", "fg", ""]);
        assert_eq!(screen.cursor(), (2, 1));
    }

    #[test]
    fn crlf_moves_to_next_row_and_scrolls() {
        let mut screen = ScreenBuffer::new(10, 2);
        screen.write("one\r\ntwo\r\nthree");
        assert_eq!(screen.visible_lines(), vec!["two", "three"]);
        assert_eq!(screen.scrollback_len(), 1);
    }

    #[test]
    fn erase_line_and_absolute_column() {
        let mut screen = ScreenBuffer::new(20, 2);
        screen.write("> hello");
        screen.write("\x1b[2K\r> help\x1b[5G");
        assert_eq!(screen.visible_lines()[0], "> help");
        assert_eq!(screen.cursor(), (4, 0));
    }

    #[test]
    fn sgr_styles_cells_until_reset() {
        let mut screen = ScreenBuffer::new(20, 1);
        screen.write("cl\x1b[2;38;5;28mear\x1b[0m!");
        assert!(!screen.style_at(1, 0).unwrap().is_muted());
        let ghost = screen.style_at(2, 0).unwrap();
        assert!(ghost.dim);
        assert_eq!(ghost.fg, Some(28));
        assert!(!screen.style_at(5, 0).unwrap().is_muted());
    }

    #[test]
    fn wide_chars_take_a_tail_cell() {
        let mut screen = ScreenBuffer::new(10, 1);
        screen.write("日a");
        assert_eq!(screen.cell_char(0, 0).as_deref(), Some("日"));
        assert_eq!(screen.cell_char(1, 0).as_deref(), Some(""));
        assert_eq!(screen.cell_char(2, 0).as_deref(), Some("a"));
        screen.write("\r\x1b[2C");
        screen.write("x");
        assert_eq!(screen.visible_lines()[0], "日x");

        screen.write("\rb");
        assert_eq!(screen.visible_lines()[0], "b x");
    }

    #[test]
    fn backspace_and_bell() {
        let mut screen = ScreenBuffer::new(10, 1);
        screen.write("ab\x08c\x07");
        assert_eq!(screen.visible_lines()[0], "ac");
        assert_eq!(screen.bell_count(), 1);
    }

    #[test]
    fn clear_keeps_cursor_line_on_top() {
        let mut screen = ScreenBuffer::new(10, 3);
        screen.write("a\r\nb\r\n> c");
        screen.clear();
        assert_eq!(screen.visible_lines(), vec!["> c", "", ""]);
        assert_eq!(screen.cursor(), (3, 0));
        assert_eq!(screen.scrollback_len(), 0);
    }

    #[test]
    fn selection_trims_each_row() {
        let mut screen = ScreenBuffer::new(6, 3);
        screen.write("ab\r\ncdef\r\ngh");
        screen.select(SelectionRange::new(1, 0, 14));
        assert_eq!(screen.selected_text(), "b\ncdef\ngh");
        screen.select(SelectionRange::new(0, 1, 2));
        assert_eq!(screen.selected_text(), "cd");
        screen.clear_selection();
        assert_eq!(screen.selected_text(), "");
        assert!(!screen.has_selection());
    }

    #[test]
    fn selected_cells_render_inverted() {
        let mut screen = ScreenBuffer::new(4, 2);
        screen.write("abcd\r\nef");
        screen.select(SelectionRange::new(2, 0, 4));
        assert_eq!(screen.selection_columns(0), Some(2..4));
        assert_eq!(screen.selection_columns(1), Some(0..2));
        assert_eq!(
            screen.render_row(0).as_deref(),
            Some("\x1b[0mab\x1b[0;7mcd\x1b[0m")
        );
    }

    #[test]
    fn detached_buffer_reports_no_dimensions() {
        let mut screen = ScreenBuffer::new(10, 2);
        screen.detach();
        assert!(screen.dimensions().is_none());
        screen.resize(12, 4);
        assert_eq!(screen.dimensions().map(|dims| (dims.cols, dims.rows)), Some((12, 4)));
    }

    #[test]
    fn resize_keeps_cursor_on_its_line() {
        let mut screen = ScreenBuffer::new(10, 3);
        screen.write("a\r\nb\r\nc");
        screen.resize(8, 2);
        assert_eq!(screen.visible_lines(), vec!["b", "c"]);
        assert_eq!(screen.cursor(), (1, 1));
    }

    #[test]
    fn growing_keeps_cursor_on_the_prompt_line() {
        let mut screen = ScreenBuffer::new(10, 3);
        screen.write("a\r\nb\r\n> c");
        screen.resize(20, 5);
        assert_eq!(screen.cursor(), (3, 2));
        screen.write("\x1b[2K\r> x");
        assert_eq!(screen.visible_lines(), vec!["a", "b", "> x", "", ""]);
    }

    #[test]
    fn off_grid_reads_are_none() {
        let screen = ScreenBuffer::new(4, 2);
        assert_eq!(screen.line_text(2), None);
        assert_eq!(screen.cell_char(4, 0), None);
        assert_eq!(screen.line_text(0).as_deref(), Some("    "));
    }
}
