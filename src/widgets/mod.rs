//! Interactive widgets.

pub mod line_editor;

pub use line_editor::{EditorOutcome, LineEditor, LineEditorState, LineEditorTheme};
