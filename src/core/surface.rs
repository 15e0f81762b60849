//! Terminal surface contract shared by the editor, the selection logic and the renderers.

/// Live grid size of a mounted surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDimensions {
    pub cols: usize,
    pub rows: usize,
}

impl GridDimensions {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    pub fn contains(&self, cell: CellAddress) -> bool {
        cell.col < self.cols && cell.row < self.rows
    }
}

/// One character slot of the visible grid; rows are viewport-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub col: usize,
    pub row: usize,
}

impl CellAddress {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    /// Row-major index of this cell on a grid `cols` wide.
    pub fn flat_index(&self, cols: usize) -> usize {
        self.row * cols + self.col
    }
}

/// A linear run of cells starting at `(start_col, start_row)` and wrapping across rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start_col: usize,
    pub start_row: usize,
    pub length: usize,
}

impl SelectionRange {
    pub fn new(start_col: usize, start_row: usize, length: usize) -> Self {
        Self {
            start_col,
            start_row,
            length,
        }
    }
}

/// Grid-based text renderer the line editor draws into.
///
/// Neither the editor nor the selection logic know which renderer backs this; they only issue
/// writes and read the rendered buffer back through it.
pub trait TerminalSurface {
    /// Write text and escape sequences at the surface cursor.
    fn write(&mut self, data: &str);

    /// Drop everything but the line holding the cursor, which becomes the first line.
    fn clear(&mut self);

    /// Current grid size, or `None` while the surface is not mounted or fitted.
    fn dimensions(&self) -> Option<GridDimensions>;

    /// Rendered text of a visible row, untrimmed.
    fn line_text(&self, row: usize) -> Option<String>;

    /// The grapheme drawn in one cell; `None` off-grid, `Some("")` for a wide char's tail.
    fn cell_char(&self, col: usize, row: usize) -> Option<String>;

    fn select(&mut self, range: SelectionRange);

    fn clear_selection(&mut self);

    /// Text covered by the current selection, empty when nothing is selected.
    fn selected_text(&self) -> String;

    fn has_selection(&self) -> bool {
        !self.selected_text().is_empty()
    }
}

impl<T: TerminalSurface + ?Sized> TerminalSurface for &mut T {
    fn write(&mut self, data: &str) {
        (**self).write(data);
    }

    fn clear(&mut self) {
        (**self).clear();
    }

    fn dimensions(&self) -> Option<GridDimensions> {
        (**self).dimensions()
    }

    fn line_text(&self, row: usize) -> Option<String> {
        (**self).line_text(row)
    }

    fn cell_char(&self, col: usize, row: usize) -> Option<String> {
        (**self).cell_char(col, row)
    }

    fn select(&mut self, range: SelectionRange) {
        (**self).select(range);
    }

    fn clear_selection(&mut self) {
        (**self).clear_selection();
    }

    fn selected_text(&self) -> String {
        (**self).selected_text()
    }

    fn has_selection(&self) -> bool {
        (**self).has_selection()
    }
}

#[cfg(test)]
mod tests {
    use super::{CellAddress, GridDimensions};

    #[test]
    fn flat_index_is_row_major() {
        assert_eq!(CellAddress::new(5, 2).flat_index(44), 93);
        assert_eq!(CellAddress::new(0, 0).flat_index(44), 0);
    }

    #[test]
    fn dimensions_contain_only_in_grid_cells() {
        let dims = GridDimensions::new(44, 20);
        assert!(dims.contains(CellAddress::new(43, 19)));
        assert!(!dims.contains(CellAddress::new(44, 0)));
        assert!(!dims.contains(CellAddress::new(0, 20)));
        assert!(GridDimensions::new(0, 20).is_empty());
    }
}
