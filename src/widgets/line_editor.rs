//! Readline-style single-line editor.
//!
//! Owns the in-progress line, cursor, history and completion state. Every handled edit repaints
//! the input line with exactly one surface write; the editor never addresses cells and never
//! reads pointer state.

use log::debug;

use crate::core::input_event::InputEvent;
use crate::core::keybindings::{has_command_modifier, EditorAction, EditorKeybindingsHandle};
use crate::core::surface::TerminalSurface;
use crate::core::text::utils::{next_grapheme_len, previous_grapheme_len};
use crate::core::text::width::{strip_ansi, visible_width};
use crate::core::vocabulary::Vocabulary;

const ERASE_LINE: &str = "\x1b[2K\r";
const COMPLETION_SEPARATOR: &str = "   ";
const BELL: &str = "\x07";

pub struct LineEditorTheme {
    /// Styles the inline suggestion shown after the cursor.
    pub suggestion: Box<dyn Fn(&str) -> String>,
}

impl Default for LineEditorTheme {
    fn default() -> Self {
        Self {
            suggestion: Box::new(|text| format!("\x1b[2;38;5;28m{text}\x1b[0m")),
        }
    }
}

/// Editable state for one terminal session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditorState {
    /// Text typed since the last submission; never contains a newline.
    pub current_line: String,
    /// Byte offset into `current_line`, always on a grapheme boundary.
    pub cursor_index: usize,
    /// Submitted lines, most recent first.
    pub history: Vec<String>,
    /// `None` while not browsing history.
    pub history_index: Option<usize>,
    /// Inline completion remainder; recomputed on every repaint.
    pub suggestion: String,
    /// Consecutive Tab presses; any other key resets it.
    pub tab_press_count: usize,
}

/// What the embedding shell has to do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorOutcome {
    /// The event was not for the editor.
    Ignored,
    Handled,
    /// Enter was pressed; carries the trimmed line, possibly empty.
    Submitted(String),
    CopyRequested,
    PasteRequested,
}

pub struct LineEditor {
    state: LineEditorState,
    prompt: String,
    vocabulary: Vocabulary,
    keybindings: EditorKeybindingsHandle,
    theme: LineEditorTheme,
    on_bell: Option<Box<dyn FnMut()>>,
}

impl LineEditor {
    pub fn new(vocabulary: Vocabulary, keybindings: EditorKeybindingsHandle) -> Self {
        Self {
            state: LineEditorState::default(),
            prompt: "> ".to_string(),
            vocabulary,
            keybindings,
            theme: LineEditorTheme::default(),
            on_bell: None,
        }
    }

    pub fn state(&self) -> &LineEditorState {
        &self.state
    }

    pub fn current_line(&self) -> &str {
        &self.state.current_line
    }

    pub fn cursor_index(&self) -> usize {
        self.state.cursor_index
    }

    pub fn history(&self) -> &[String] {
        &self.state.history
    }

    pub fn history_index(&self) -> Option<usize> {
        self.state.history_index
    }

    pub fn suggestion(&self) -> &str {
        &self.state.suggestion
    }

    pub fn tab_press_count(&self) -> usize {
        self.state.tab_press_count
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_theme(&mut self, theme: LineEditorTheme) {
        self.theme = theme;
    }

    /// Replace the terminal bell emitted when ambiguous completions are listed.
    pub fn set_on_bell(&mut self, handler: Option<Box<dyn FnMut()>>) {
        self.on_bell = handler;
    }

    /// Splice text at the cursor. Typing, composition and paste all come through here.
    pub fn handle_character_input(&mut self, text: &str, surface: &mut dyn TerminalSurface) {
        let cleaned = printable_text(text);
        if !cleaned.is_empty() {
            let cursor = self.state.cursor_index;
            self.state.current_line.insert_str(cursor, &cleaned);
            self.state.cursor_index = cursor + cleaned.len();
        }
        self.redraw(surface);
    }

    pub fn handle_backspace(&mut self, surface: &mut dyn TerminalSurface) {
        let cursor = self.state.cursor_index;
        if cursor > 0 {
            let start = cursor - previous_grapheme_len(&self.state.current_line, cursor);
            self.state.current_line.replace_range(start..cursor, "");
            self.state.cursor_index = start;
        }
        self.redraw(surface);
    }

    pub fn handle_delete(&mut self, surface: &mut dyn TerminalSurface) {
        let cursor = self.state.cursor_index;
        if cursor < self.state.current_line.len() {
            let end = cursor + next_grapheme_len(&self.state.current_line, cursor);
            self.state.current_line.replace_range(cursor..end, "");
        }
        self.redraw(surface);
    }

    pub fn handle_cursor_left(&mut self, surface: &mut dyn TerminalSurface) {
        let cursor = self.state.cursor_index;
        if cursor > 0 {
            self.state.cursor_index = cursor - previous_grapheme_len(&self.state.current_line, cursor);
        }
        self.redraw(surface);
    }

    /// Move right; at the end of the line a pending suggestion is accepted instead.
    pub fn handle_cursor_right(&mut self, surface: &mut dyn TerminalSurface) {
        self.refresh_suggestion();
        let cursor = self.state.cursor_index;
        let len = self.state.current_line.len();
        if cursor == len && !self.state.suggestion.is_empty() {
            self.accept_suggestion();
        } else if cursor < len {
            self.state.cursor_index = cursor + next_grapheme_len(&self.state.current_line, cursor);
        }
        self.redraw(surface);
    }

    /// Accept the pending suggestion, or list ambiguous matches on the second consecutive Tab.
    pub fn handle_tab_complete(&mut self, surface: &mut dyn TerminalSurface) {
        self.refresh_suggestion();
        if !self.state.suggestion.is_empty() {
            self.accept_suggestion();
            if self.vocabulary.expects_argument(&self.state.current_line) {
                self.state.current_line.push(' ');
                self.state.cursor_index = self.state.current_line.len();
            }
            self.redraw(surface);
            return;
        }

        let matches = self.vocabulary.completions(&self.state.current_line);
        let mut listing = String::new();
        if matches.len() > 1 && self.state.tab_press_count >= 1 {
            debug!("listing {} completions", matches.len());
            match self.on_bell.as_mut() {
                Some(handler) => handler(),
                None => listing.push_str(BELL),
            }
            listing.push_str("\r\n");
            listing.push_str(&matches.join(COMPLETION_SEPARATOR));
            listing.push_str("\r\n");
        }
        self.state.tab_press_count += 1;
        self.redraw_after(&listing, surface);
    }

    /// Finish the line: returns it trimmed and resets the editor for the next one.
    ///
    /// Non-empty lines go to the front of the history and move the surface to a fresh line.
    pub fn handle_submit(&mut self, surface: &mut dyn TerminalSurface) -> String {
        let submitted = self.state.current_line.trim().to_string();
        if !submitted.is_empty() {
            surface.write("\r\n");
            self.state.history.insert(0, submitted.clone());
        }
        debug!("submitted line ({} history entries)", self.state.history.len());

        self.state.current_line.clear();
        self.state.cursor_index = 0;
        self.state.suggestion.clear();
        self.state.history_index = None;
        submitted
    }

    pub fn handle_history_up(&mut self, surface: &mut dyn TerminalSurface) {
        let next = self.state.history_index.map_or(0, |idx| idx + 1);
        if next < self.state.history.len() {
            self.state.history_index = Some(next);
            self.state.current_line = self.state.history[next].clone();
            self.state.cursor_index = self.state.current_line.len();
        }
        self.redraw(surface);
    }

    pub fn handle_history_down(&mut self, surface: &mut dyn TerminalSurface) {
        match self.state.history_index {
            Some(idx) if idx > 0 => {
                self.state.history_index = Some(idx - 1);
                self.state.current_line = self.state.history[idx - 1].clone();
            }
            _ => {
                self.state.history_index = None;
                self.state.current_line.clear();
            }
        }
        self.state.cursor_index = self.state.current_line.len();
        self.redraw(surface);
    }

    /// Repaint the input line: prompt, text, ghost suggestion when the cursor is at the end,
    /// then the cursor column.
    pub fn redraw(&mut self, surface: &mut dyn TerminalSurface) {
        self.redraw_after("", surface);
    }

    /// The repaint sequence for the current state.
    pub fn render_line(&mut self) -> String {
        self.refresh_suggestion();
        let line = &self.state.current_line;
        let cursor = self.state.cursor_index;

        let mut output = String::with_capacity(line.len() + self.prompt.len() + 16);
        output.push_str(ERASE_LINE);
        output.push_str(&self.prompt);
        output.push_str(line);
        if cursor == line.len() && !self.state.suggestion.is_empty() {
            output.push_str(&(self.theme.suggestion)(&self.state.suggestion));
        }
        let column = visible_width(&self.prompt) + visible_width(&line[..cursor]) + 1;
        output.push_str(&format!("\x1b[{column}G"));
        output
    }

    /// Route one input event. Tab streaks end on any other input.
    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        surface: &mut dyn TerminalSurface,
    ) -> EditorOutcome {
        let (raw, key_id) = match event {
            InputEvent::Text { text, .. } | InputEvent::Paste { text, .. } => {
                self.state.tab_press_count = 0;
                self.handle_character_input(text, surface);
                return EditorOutcome::Handled;
            }
            InputEvent::Key { raw, key_id } => (raw.as_str(), key_id.as_str()),
            _ => return EditorOutcome::Ignored,
        };

        let action = self
            .keybindings
            .lock()
            .expect("editor keybindings lock poisoned")
            .action_for(key_id);
        if action != Some(EditorAction::Tab) {
            self.state.tab_press_count = 0;
        }

        match action {
            Some(EditorAction::Submit) => EditorOutcome::Submitted(self.handle_submit(surface)),
            Some(EditorAction::Tab) => {
                self.handle_tab_complete(surface);
                EditorOutcome::Handled
            }
            Some(EditorAction::DeleteCharBackward) => {
                self.handle_backspace(surface);
                EditorOutcome::Handled
            }
            Some(EditorAction::DeleteCharForward) => {
                self.handle_delete(surface);
                EditorOutcome::Handled
            }
            Some(EditorAction::CursorLeft) => {
                self.handle_cursor_left(surface);
                EditorOutcome::Handled
            }
            Some(EditorAction::CursorRight) => {
                self.handle_cursor_right(surface);
                EditorOutcome::Handled
            }
            Some(EditorAction::HistoryPrevious) => {
                self.handle_history_up(surface);
                EditorOutcome::Handled
            }
            Some(EditorAction::HistoryNext) => {
                self.handle_history_down(surface);
                EditorOutcome::Handled
            }
            Some(EditorAction::Copy) => EditorOutcome::CopyRequested,
            Some(EditorAction::Paste) => EditorOutcome::PasteRequested,
            None => match printable_key(raw, key_id) {
                Some(text) => {
                    self.handle_character_input(&text, surface);
                    EditorOutcome::Handled
                }
                None => EditorOutcome::Ignored,
            },
        }
    }

    fn redraw_after(&mut self, prefix: &str, surface: &mut dyn TerminalSurface) {
        let mut output = String::from(prefix);
        output.push_str(&self.render_line());
        surface.write(&output);
    }

    fn refresh_suggestion(&mut self) {
        self.state.suggestion = self.vocabulary.suggest(&self.state.current_line);
    }

    fn accept_suggestion(&mut self) {
        let suggestion = std::mem::take(&mut self.state.suggestion);
        self.state.current_line.push_str(&suggestion);
        self.state.cursor_index = self.state.current_line.len();
    }
}

/// Text for a key event naming a single printable character (embedders sending `"a"`).
fn printable_key(raw: &str, key_id: &str) -> Option<String> {
    if has_command_modifier(key_id) {
        return None;
    }
    if key_id == "space" {
        return Some(" ".to_string());
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if !ch.is_control() => Some(ch.to_string()),
        _ => None,
    }
}

/// Text safe to keep in the line: escape sequences removed, tabs as one space, other
/// control characters (line breaks included) dropped.
fn printable_text(text: &str) -> String {
    strip_ansi(text)
        .chars()
        .filter_map(|ch| match ch {
            '\t' => Some(' '),
            ch if ch.is_control() => None,
            ch => Some(ch),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{EditorOutcome, LineEditor};
    use crate::core::input_event::InputEvent;
    use crate::core::keybindings::default_editor_keybindings_handle;
    use crate::core::surface::{GridDimensions, SelectionRange, TerminalSurface};
    use crate::core::vocabulary::Vocabulary;

    #[derive(Default)]
    struct RecordingSurface {
        writes: Vec<String>,
    }

    impl TerminalSurface for RecordingSurface {
        fn write(&mut self, data: &str) {
            self.writes.push(data.to_string());
        }
        fn clear(&mut self) {}
        fn dimensions(&self) -> Option<GridDimensions> {
            Some(GridDimensions::new(80, 24))
        }
        fn line_text(&self, _row: usize) -> Option<String> {
            None
        }
        fn cell_char(&self, _col: usize, _row: usize) -> Option<String> {
            None
        }
        fn select(&mut self, _range: SelectionRange) {}
        fn clear_selection(&mut self) {}
        fn selected_text(&self) -> String {
            String::new()
        }
    }

    fn editor() -> LineEditor {
        LineEditor::new(Vocabulary::portfolio_default(), default_editor_keybindings_handle())
    }

    fn submit(editor: &mut LineEditor, surface: &mut RecordingSurface, line: &str) {
        editor.handle_character_input(line, surface);
        editor.handle_submit(surface);
    }

    #[test]
    fn insert_then_backspace_returns_to_empty() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("hello", &mut surface);
        for _ in 0..5 {
            editor.handle_backspace(&mut surface);
        }
        assert_eq!(editor.current_line(), "");
        assert_eq!(editor.cursor_index(), 0);
        editor.handle_backspace(&mut surface);
        assert_eq!(editor.cursor_index(), 0);
    }

    #[test]
    fn insertion_happens_at_cursor() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("helo", &mut surface);
        editor.handle_cursor_left(&mut surface);
        editor.handle_character_input("l", &mut surface);
        assert_eq!(editor.current_line(), "hello");
        assert_eq!(editor.cursor_index(), 4);

        editor.handle_delete(&mut surface);
        assert_eq!(editor.current_line(), "hell");
        editor.handle_delete(&mut surface);
        assert_eq!(editor.current_line(), "hell");
    }

    #[test]
    fn pasted_newlines_are_dropped() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("cat\r\nabout", &mut surface);
        assert_eq!(editor.current_line(), "catabout");
        assert_eq!(editor.cursor_index(), 8);
    }

    #[test]
    fn pasted_tabs_and_escapes_stay_out_of_the_line() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("a\tb", &mut surface);
        assert_eq!(editor.current_line(), "a b");
        assert_eq!(editor.cursor_index(), 3);

        editor.handle_character_input("\x1b[2J", &mut surface);
        editor.handle_character_input("c\x07\x1bd", &mut surface);
        assert_eq!(editor.current_line(), "a bcd");
        assert!(surface.writes.iter().all(|write| !write.contains("\x1b[2J")));
        assert_eq!(editor.handle_submit(&mut surface), "a bcd");
    }

    #[test]
    fn every_edit_is_one_write() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("cl", &mut surface);
        editor.handle_cursor_left(&mut surface);
        editor.handle_cursor_right(&mut surface);
        editor.handle_backspace(&mut surface);
        assert_eq!(surface.writes.len(), 4);
        assert!(surface.writes.iter().all(|write| write.starts_with("\x1b[2K\r> ")));
    }

    #[test]
    fn redraw_is_idempotent() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("cl", &mut surface);
        editor.redraw(&mut surface);
        editor.redraw(&mut surface);
        let n = surface.writes.len();
        assert_eq!(surface.writes[n - 1], surface.writes[n - 2]);
    }

    #[test]
    fn ghost_suggestion_only_at_end_of_line() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("cl", &mut surface);
        assert_eq!(editor.suggestion(), "ear");
        assert_eq!(
            surface.writes.last().unwrap(),
            "\x1b[2K\r> cl\x1b[2;38;5;28mear\x1b[0m\x1b[5G"
        );

        editor.handle_cursor_left(&mut surface);
        assert_eq!(surface.writes.last().unwrap(), "\x1b[2K\r> cl\x1b[4G");

        editor.handle_character_input(" ", &mut surface);
        assert_eq!(editor.suggestion(), "");
    }

    #[test]
    fn right_arrow_at_end_accepts_suggestion() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("he", &mut surface);
        editor.handle_cursor_right(&mut surface);
        assert_eq!(editor.current_line(), "help");
        assert_eq!(editor.cursor_index(), 4);
        assert_eq!(editor.suggestion(), "");
    }

    #[test]
    fn tab_accepts_and_spaces_argument_commands() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("ca", &mut surface);
        editor.handle_tab_complete(&mut surface);
        assert_eq!(editor.current_line(), "cat ");

        editor.handle_character_input("pro", &mut surface);
        editor.handle_tab_complete(&mut surface);
        assert_eq!(editor.current_line(), "cat projects");
        assert_eq!(editor.cursor_index(), "cat projects".len());
    }

    #[test]
    fn second_tab_lists_candidates_with_bell() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("cat ", &mut surface);
        assert_eq!(editor.suggestion(), "");

        editor.handle_tab_complete(&mut surface);
        assert_eq!(editor.tab_press_count(), 1);
        assert!(!surface.writes.last().unwrap().contains("about"));

        editor.handle_tab_complete(&mut surface);
        assert_eq!(editor.tab_press_count(), 2);
        let listing = surface.writes.last().unwrap();
        assert!(listing.starts_with("\x07\r\nabout   projects   skills"));
        assert!(listing.contains("awards\r\n\x1b[2K\r> cat "));
        assert_eq!(editor.current_line(), "cat ");
    }

    #[test]
    fn bell_handler_replaces_terminal_bell() {
        use std::cell::Cell;
        use std::rc::Rc;

        let rings = Rc::new(Cell::new(0));
        let counter = Rc::clone(&rings);
        let mut editor = editor();
        editor.set_on_bell(Some(Box::new(move || counter.set(counter.get() + 1))));
        let mut surface = RecordingSurface::default();
        editor.handle_tab_complete(&mut surface);
        editor.handle_tab_complete(&mut surface);
        assert_eq!(rings.get(), 1);
        assert!(!surface.writes.last().unwrap().contains('\x07'));
    }

    #[test]
    fn other_keys_reset_tab_streak() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_event(&InputEvent::key("tab"), &mut surface);
        assert_eq!(editor.tab_press_count(), 1);
        editor.handle_event(&InputEvent::key("left"), &mut surface);
        assert_eq!(editor.tab_press_count(), 0);
        editor.handle_event(&InputEvent::key("tab"), &mut surface);
        editor.handle_event(&InputEvent::text("x"), &mut surface);
        assert_eq!(editor.tab_press_count(), 0);
    }

    #[test]
    fn zero_match_tab_only_repaints() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("zz", &mut surface);
        editor.handle_tab_complete(&mut surface);
        editor.handle_tab_complete(&mut surface);
        assert_eq!(editor.current_line(), "zz");
        assert_eq!(surface.writes.last().unwrap(), "\x1b[2K\r> zz\x1b[5G");
    }

    #[test]
    fn history_walks_most_recent_first() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        submit(&mut editor, &mut surface, "about");
        submit(&mut editor, &mut surface, "skills");

        editor.handle_history_up(&mut surface);
        editor.handle_history_up(&mut surface);
        assert_eq!(editor.current_line(), "about");
        assert_eq!(editor.cursor_index(), 5);
        editor.handle_history_up(&mut surface);
        assert_eq!(editor.current_line(), "about");
        assert_eq!(editor.history_index(), Some(1));

        editor.handle_history_down(&mut surface);
        assert_eq!(editor.current_line(), "skills");
        editor.handle_history_down(&mut surface);
        assert_eq!(editor.current_line(), "");
        assert_eq!(editor.history_index(), None);
        editor.handle_history_down(&mut surface);
        assert_eq!(editor.current_line(), "");
        assert_eq!(editor.cursor_index(), 0);
    }

    #[test]
    fn submit_trims_records_and_resets() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("  cat about  ", &mut surface);
        editor.handle_history_up(&mut surface);
        let line = editor.handle_submit(&mut surface);
        assert_eq!(line, "cat about");
        assert_eq!(editor.history(), ["cat about".to_string()]);
        assert_eq!(editor.current_line(), "");
        assert_eq!(editor.cursor_index(), 0);
        assert_eq!(editor.history_index(), None);
        assert_eq!(surface.writes.last().unwrap(), "\r\n");
    }

    #[test]
    fn empty_submit_is_reported_but_not_recorded() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("   ", &mut surface);
        let writes_before = surface.writes.len();
        let outcome = editor.handle_event(&InputEvent::key("enter"), &mut surface);
        assert_eq!(outcome, EditorOutcome::Submitted(String::new()));
        assert!(editor.history().is_empty());
        assert_eq!(surface.writes.len(), writes_before);
    }

    #[test]
    fn clipboard_keys_are_delegated_and_modified_keys_ignored() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        assert_eq!(
            editor.handle_event(&InputEvent::key("ctrl+c"), &mut surface),
            EditorOutcome::CopyRequested
        );
        assert_eq!(
            editor.handle_event(&InputEvent::key("shift+insert"), &mut surface),
            EditorOutcome::PasteRequested
        );
        assert_eq!(
            editor.handle_event(&InputEvent::key("ctrl+a"), &mut surface),
            EditorOutcome::Ignored
        );
        assert_eq!(
            editor.handle_event(&InputEvent::key("alt+b"), &mut surface),
            EditorOutcome::Ignored
        );
        assert!(surface.writes.is_empty());
    }

    #[test]
    fn single_character_key_events_insert_text() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_event(&InputEvent::key("H"), &mut surface);
        editor.handle_event(&InputEvent::key("space"), &mut surface);
        editor.handle_event(&InputEvent::key("f5"), &mut surface);
        assert_eq!(editor.current_line(), "H ");
    }

    #[test]
    fn cursor_column_counts_display_width() {
        let mut editor = editor();
        let mut surface = RecordingSurface::default();
        editor.handle_character_input("日本", &mut surface);
        assert_eq!(surface.writes.last().unwrap(), "\x1b[2K\r> 日本\x1b[7G");
        editor.handle_backspace(&mut surface);
        assert_eq!(editor.current_line(), "日");
        assert_eq!(editor.cursor_index(), "日".len());
    }
}
