//! Pointer interaction over the terminal grid: drag selection, word/line selection on multi
//! click, link hover and link activation.
//!
//! Events arrive already resolved to a cell (or to no cell when the pointer misses the screen);
//! the projection from viewport space is the shell's job.

use log::debug;

use crate::core::cell_mapper::ViewportPoint;
use crate::core::links::link_at_cell;
use crate::core::selection::{select_between, select_line_at, select_word_at};
use crate::core::surface::{CellAddress, TerminalSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// `click_count` is 1 for a single click, 2 for a double click and so on.
    Down {
        button: PointerButton,
        click_count: u8,
    },
    Move,
    Up {
        button: PointerButton,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub point: ViewportPoint,
}

impl PointerEvent {
    pub fn down(point: ViewportPoint, click_count: u8) -> Self {
        Self {
            kind: PointerKind::Down {
                button: PointerButton::Primary,
                click_count,
            },
            point,
        }
    }

    pub fn moved(point: ViewportPoint) -> Self {
        Self {
            kind: PointerKind::Move,
            point,
        }
    }

    pub fn up(point: ViewportPoint) -> Self {
        Self {
            kind: PointerKind::Up {
                button: PointerButton::Primary,
            },
            point,
        }
    }
}

/// Drag anchor and hovered link, owned by the interaction layer rather than the editor.
#[derive(Debug, Default, Clone)]
pub struct PointerTracker {
    drag_anchor: Option<CellAddress>,
    hovered_link: Option<String>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_anchor(&self) -> Option<CellAddress> {
        self.drag_anchor
    }

    /// URL under the pointer, for a link cursor style.
    pub fn hovered_link(&self) -> Option<&str> {
        self.hovered_link.as_deref()
    }

    /// Apply one pointer event. Returns a URL when a click released on a link should open it.
    pub fn handle<S: TerminalSurface + ?Sized>(
        &mut self,
        kind: PointerKind,
        cell: Option<CellAddress>,
        surface: &mut S,
    ) -> Option<String> {
        match kind {
            PointerKind::Down {
                button: PointerButton::Primary,
                click_count,
            } => {
                let cell = cell?;
                match click_count {
                    2 => {
                        self.drag_anchor = None;
                        select_word_at(surface, cell);
                    }
                    count if count >= 3 => {
                        self.drag_anchor = None;
                        select_line_at(surface, cell.row);
                    }
                    _ => {
                        surface.clear_selection();
                        self.drag_anchor = Some(cell);
                    }
                }
                None
            }
            PointerKind::Down { .. } => None,
            PointerKind::Move => {
                let Some(cell) = cell else {
                    self.hovered_link = None;
                    return None;
                };
                self.hovered_link = link_at_cell(surface, cell);
                if let Some(anchor) = self.drag_anchor {
                    select_between(surface, anchor, cell);
                }
                None
            }
            PointerKind::Up {
                button: PointerButton::Primary,
            } => {
                let anchor = self.drag_anchor.take();
                match (anchor, cell) {
                    (Some(anchor), Some(cell)) if anchor == cell => {
                        let link = self.hovered_link.clone()?;
                        debug!("activating link at [{}, {}]", cell.col, cell.row);
                        Some(link)
                    }
                    _ => None,
                }
            }
            PointerKind::Up { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PointerButton, PointerKind, PointerTracker};
    use crate::core::surface::{CellAddress, TerminalSurface};
    use crate::render::screen_buffer::ScreenBuffer;

    fn down(click_count: u8) -> PointerKind {
        PointerKind::Down {
            button: PointerButton::Primary,
            click_count,
        }
    }

    fn up() -> PointerKind {
        PointerKind::Up {
            button: PointerButton::Primary,
        }
    }

    fn screen() -> ScreenBuffer {
        let mut screen = ScreenBuffer::new(40, 4);
        screen.write("visit https://example.com now\r\nsecond line here");
        screen
    }

    #[test]
    fn drag_selects_between_anchor_and_pointer() {
        let mut screen = screen();
        let mut tracker = PointerTracker::new();
        tracker.handle(down(1), Some(CellAddress::new(0, 1)), &mut screen);
        tracker.handle(PointerKind::Move, Some(CellAddress::new(5, 1)), &mut screen);
        assert_eq!(screen.selected_text(), "second");
        tracker.handle(up(), Some(CellAddress::new(5, 1)), &mut screen);
        assert_eq!(tracker.drag_anchor(), None);
        assert_eq!(screen.selected_text(), "second");
    }

    #[test]
    fn new_press_clears_previous_selection() {
        let mut screen = screen();
        let mut tracker = PointerTracker::new();
        tracker.handle(down(3), Some(CellAddress::new(2, 1)), &mut screen);
        assert_eq!(screen.selected_text(), "second line here");
        tracker.handle(down(1), Some(CellAddress::new(2, 1)), &mut screen);
        assert!(!screen.has_selection());
    }

    #[test]
    fn double_click_selects_word() {
        let mut screen = screen();
        let mut tracker = PointerTracker::new();
        tracker.handle(down(2), Some(CellAddress::new(9, 1)), &mut screen);
        assert_eq!(screen.selected_text(), "line");
        assert_eq!(tracker.drag_anchor(), None);
    }

    #[test]
    fn click_on_hovered_link_opens_it() {
        let mut screen = screen();
        let mut tracker = PointerTracker::new();
        let cell = Some(CellAddress::new(10, 0));
        tracker.handle(PointerKind::Move, cell, &mut screen);
        assert_eq!(tracker.hovered_link(), Some("https://example.com"));
        tracker.handle(down(1), cell, &mut screen);
        let opened = tracker.handle(up(), cell, &mut screen);
        assert_eq!(opened.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn drag_off_a_link_does_not_open_it() {
        let mut screen = screen();
        let mut tracker = PointerTracker::new();
        tracker.handle(down(1), Some(CellAddress::new(10, 0)), &mut screen);
        tracker.handle(PointerKind::Move, Some(CellAddress::new(12, 0)), &mut screen);
        let opened = tracker.handle(up(), Some(CellAddress::new(12, 0)), &mut screen);
        assert_eq!(opened, None);
    }

    #[test]
    fn misses_clear_hover_and_ignore_presses() {
        let mut screen = screen();
        let mut tracker = PointerTracker::new();
        tracker.handle(PointerKind::Move, Some(CellAddress::new(10, 0)), &mut screen);
        tracker.handle(PointerKind::Move, None, &mut screen);
        assert_eq!(tracker.hovered_link(), None);
        tracker.handle(down(1), None, &mut screen);
        assert_eq!(tracker.drag_anchor(), None);
    }

    #[test]
    fn secondary_button_does_not_start_a_drag() {
        let mut screen = screen();
        let mut tracker = PointerTracker::new();
        let kind = PointerKind::Down {
            button: PointerButton::Secondary,
            click_count: 1,
        };
        tracker.handle(kind, Some(CellAddress::new(1, 1)), &mut screen);
        assert_eq!(tracker.drag_anchor(), None);
    }
}
