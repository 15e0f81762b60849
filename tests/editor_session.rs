use crt_term::{
    default_editor_keybindings_handle, EditorOutcome, InputEvent, LineEditor, ScreenBuffer,
    Vocabulary,
};
use pretty_assertions::assert_eq;

fn editor() -> LineEditor {
    LineEditor::new(
        Vocabulary::portfolio_default(),
        default_editor_keybindings_handle(),
    )
}

#[test]
fn history_walks_back_and_forth() {
    let mut screen = ScreenBuffer::new(40, 6);
    let mut editor = editor();
    for line in ["about", "skills"] {
        editor.handle_character_input(line, &mut screen);
        assert_eq!(editor.handle_submit(&mut screen), line);
    }

    editor.handle_history_up(&mut screen);
    editor.handle_history_up(&mut screen);
    assert_eq!(editor.current_line(), "about");
    editor.handle_history_down(&mut screen);
    assert_eq!(editor.current_line(), "skills");
    editor.handle_history_down(&mut screen);
    assert_eq!(editor.current_line(), "");
    assert_eq!(editor.history_index(), None);
    assert_eq!(editor.history(), ["skills", "about"]);
}

#[test]
fn history_up_stops_at_the_oldest_entry() {
    let mut screen = ScreenBuffer::new(40, 6);
    let mut editor = editor();
    editor.handle_character_input("help", &mut screen);
    editor.handle_submit(&mut screen);
    editor.handle_history_up(&mut screen);
    editor.handle_history_up(&mut screen);
    assert_eq!(editor.current_line(), "help");
    assert_eq!(editor.history_index(), Some(0));
    assert_eq!(editor.cursor_index(), 4);
}

#[test]
fn suggestion_is_drawn_as_a_ghost_after_the_cursor() {
    let mut screen = ScreenBuffer::new(40, 6);
    let mut editor = editor();
    editor.handle_character_input("cl", &mut screen);
    assert_eq!(editor.suggestion(), "ear");
    assert_eq!(screen.visible_lines()[0], "> clear");
    assert_eq!(screen.cursor(), (4, 0));

    editor.handle_character_input(" ", &mut screen);
    assert_eq!(editor.suggestion(), "");
    assert_eq!(screen.visible_lines()[0], "> cl");
}

#[test]
fn hello_and_five_backspaces_is_empty_again() {
    let mut screen = ScreenBuffer::new(40, 6);
    let mut editor = editor();
    editor.handle_character_input("hello", &mut screen);
    for _ in 0..5 {
        editor.handle_backspace(&mut screen);
    }
    assert_eq!(editor.current_line(), "");
    assert_eq!(editor.cursor_index(), 0);
    assert_eq!(screen.visible_lines()[0], ">");
}

#[test]
fn cursor_stays_inside_the_line_under_any_edit_sequence() {
    let mut screen = ScreenBuffer::new(40, 6);
    let mut editor = editor();
    let steps = [
        "ab", "<", "<", "<", "日", ">", "del", "bs", "bs", "bs", "x", "del", "<", "bs", "e\u{301}",
        "<", "del", "del", "bs", "bs", "bs",
    ];
    for step in steps {
        match step {
            "<" => editor.handle_cursor_left(&mut screen),
            ">" => editor.handle_cursor_right(&mut screen),
            "del" => editor.handle_delete(&mut screen),
            "bs" => editor.handle_backspace(&mut screen),
            text => editor.handle_character_input(text, &mut screen),
        }
        let line = editor.current_line();
        assert!(editor.cursor_index() <= line.len(), "after {step:?}");
        assert!(line.is_char_boundary(editor.cursor_index()), "after {step:?}");
    }
}

#[test]
fn redraw_is_idempotent() {
    let mut screen = ScreenBuffer::new(40, 6);
    let mut editor = editor();
    editor.handle_character_input("cat pro", &mut screen);
    editor.handle_cursor_left(&mut screen);
    let first = editor.render_line();
    let second = editor.render_line();
    assert_eq!(first, second);

    editor.redraw(&mut screen);
    let before = screen.visible_lines();
    editor.redraw(&mut screen);
    assert_eq!(screen.visible_lines(), before);
}

#[test]
fn key_events_drive_the_editor() {
    let mut screen = ScreenBuffer::new(40, 6);
    let mut editor = editor();
    assert_eq!(
        editor.handle_event(&InputEvent::text("ca"), &mut screen),
        EditorOutcome::Handled
    );
    editor.handle_event(&InputEvent::key("tab"), &mut screen);
    assert_eq!(editor.current_line(), "cat ");
    editor.handle_event(&InputEvent::text("sk"), &mut screen);
    editor.handle_event(&InputEvent::key("right"), &mut screen);
    assert_eq!(editor.current_line(), "cat skills");
    assert_eq!(
        editor.handle_event(&InputEvent::key("enter"), &mut screen),
        EditorOutcome::Submitted("cat skills".to_string())
    );
    assert_eq!(
        editor.handle_event(&InputEvent::key("ctrl+v"), &mut screen),
        EditorOutcome::PasteRequested
    );
    assert_eq!(
        editor.handle_event(&InputEvent::key("ctrl+x"), &mut screen),
        EditorOutcome::Ignored
    );
}
