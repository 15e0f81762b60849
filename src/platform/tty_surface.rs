//! A [`TerminalSurface`] backed by a real terminal.
//!
//! Output goes to the device unchanged and is mirrored into a [`ScreenBuffer`], which answers
//! every read-back query. Selections are painted on the device by repainting the affected rows
//! in inverse video.

use crate::core::surface::{GridDimensions, SelectionRange, TerminalSurface};
use crate::core::terminal::Terminal;
use crate::render::screen_buffer::ScreenBuffer;

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[3J\x1b[H";

pub struct TtySurface<T: Terminal> {
    terminal: T,
    screen: ScreenBuffer,
}

impl<T: Terminal> TtySurface<T> {
    pub fn new(terminal: T) -> Self {
        let screen = ScreenBuffer::new(
            usize::from(terminal.columns()),
            usize::from(terminal.rows()),
        );
        Self { terminal, screen }
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    pub fn screen(&self) -> &ScreenBuffer {
        &self.screen
    }

    pub fn into_terminal(self) -> T {
        self.terminal
    }

    /// Refit the mirror to the device's current size.
    pub fn refit(&mut self) {
        let cols = usize::from(self.terminal.columns());
        let rows = usize::from(self.terminal.rows());
        let had_selection = self.screen.has_selection();
        self.screen.resize(cols, rows);
        if had_selection {
            self.repaint_all();
        }
    }

    fn repaint_rows(&mut self, rows: impl Iterator<Item = usize>) {
        let mut output = String::from("\x1b7");
        for row in rows {
            if let Some(line) = self.screen.render_row(row) {
                output.push_str(&format!("\x1b[{};1H", row + 1));
                output.push_str(&line);
            }
        }
        output.push_str("\x1b8");
        self.terminal.write(&output);
    }

    fn repaint_all(&mut self) {
        let rows = self.screen.dimensions().map_or(0, |dims| dims.rows);
        self.repaint_rows(0..rows);
    }

    fn selected_rows(&self) -> Option<std::ops::RangeInclusive<usize>> {
        let range = self.screen.selection()?;
        let dims = self.screen.dimensions()?;
        let last = (range.start_row * dims.cols + range.start_col + range.length - 1) / dims.cols;
        Some(range.start_row..=last.min(dims.rows - 1))
    }
}

impl<T: Terminal> TerminalSurface for TtySurface<T> {
    fn write(&mut self, data: &str) {
        self.terminal.write(data);
        self.screen.write(data);
    }

    fn clear(&mut self) {
        self.terminal.write(CLEAR_SCREEN);
        self.screen.clear();
        self.repaint_rows(std::iter::once(0));
    }

    fn dimensions(&self) -> Option<GridDimensions> {
        self.screen.dimensions()
    }

    fn line_text(&self, row: usize) -> Option<String> {
        self.screen.line_text(row)
    }

    fn cell_char(&self, col: usize, row: usize) -> Option<String> {
        self.screen.cell_char(col, row)
    }

    fn select(&mut self, range: SelectionRange) {
        let previous = self.selected_rows();
        self.screen.select(range);
        let current = self.selected_rows();
        repaint_union(self, previous, current);
    }

    fn clear_selection(&mut self) {
        let previous = self.selected_rows();
        self.screen.clear_selection();
        repaint_union(self, previous, None);
    }

    fn selected_text(&self) -> String {
        self.screen.selected_text()
    }

    fn has_selection(&self) -> bool {
        self.screen.has_selection()
    }
}

fn repaint_union<T: Terminal>(
    surface: &mut TtySurface<T>,
    previous: Option<std::ops::RangeInclusive<usize>>,
    current: Option<std::ops::RangeInclusive<usize>>,
) {
    let bounds = [previous, current]
        .into_iter()
        .flatten()
        .map(|rows| (*rows.start(), *rows.end()))
        .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)));
    if let Some((first, last)) = bounds {
        surface.repaint_rows(first..=last);
    }
}
