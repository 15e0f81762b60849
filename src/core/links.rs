//! Hyperlink hit-testing on rendered lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::surface::{CellAddress, TerminalSurface};
use crate::core::text::utils::column_of_byte;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("url pattern compiles"));

/// A URL found in a rendered line and the cell columns it covers (`end_col` exclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    pub url: String,
    pub start_col: usize,
    pub end_col: usize,
}

impl LinkMatch {
    pub fn contains(&self, col: usize) -> bool {
        self.start_col <= col && col < self.end_col
    }
}

/// All URL-shaped runs in a line, left to right.
pub fn links_in(line: &str) -> Vec<LinkMatch> {
    let line = line.trim_end();
    URL_PATTERN
        .find_iter(line)
        .map(|found| LinkMatch {
            url: found.as_str().to_string(),
            start_col: column_of_byte(line, found.start()),
            end_col: column_of_byte(line, found.end()),
        })
        .collect()
}

/// The URL whose span covers `col`, if any.
pub fn link_at(line: &str, col: usize) -> Option<String> {
    links_in(line)
        .into_iter()
        .find(|link| link.contains(col))
        .map(|link| link.url)
}

/// Hit-test a visible cell against the surface's rendered text.
pub fn link_at_cell<S: TerminalSurface + ?Sized>(surface: &S, cell: CellAddress) -> Option<String> {
    let line = surface.line_text(cell.row)?;
    link_at(&line, cell.col)
}
