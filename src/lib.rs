//! Input engine for a terminal rendered onto a warped screen.
//!
//! Invariant: the line editor only ever writes whole-line repaints to a [`TerminalSurface`]; it
//! never addresses cells and never sees pointer state.
//!
//! # Public API Overview
//! - Edit a prompt line with [`LineEditor`]: history, inline suggestions, Tab completion.
//! - Map pointer positions to cells with [`CellMapper`] and a [`RayIntersector`]
//!   ([`PlanarProjection`], [`QuadProjection`], or a closure over a 3D engine's ray cast).
//! - Drive selection and link hit-testing against any surface's rendered text.
//! - Run a prompt session with [`TerminalShell`] over an in-memory [`ScreenBuffer`] or a real
//!   terminal through [`platform::TtySurface`].

pub mod config;
pub mod logging;

pub mod core;
pub mod platform;
pub mod render;
pub mod runtime;
pub mod widgets;

/// Terminal surface contract and grid types.
pub use crate::core::surface::{CellAddress, GridDimensions, SelectionRange, TerminalSurface};

/// Pointer-to-cell mapping.
pub use crate::core::cell_mapper::{
    AxisRounding, CanvasGeometry, CellMapper, PlanarProjection, QuadProjection, RayIntersector,
    SurfaceUv, ViewportPoint,
};

/// Selection and link hit-testing.
pub use crate::core::links::{link_at, link_at_cell, links_in, LinkMatch};
pub use crate::core::selection::{
    select_between, select_line_at, select_word_at, selection_between, word_columns_at,
};

/// Completion vocabularies.
pub use crate::core::vocabulary::{CommandSpec, CompletionSource, Vocabulary};

/// Keybinding configuration and default mappings.
pub use crate::core::keybindings::{
    default_editor_keybindings_handle, EditorAction, EditorKeybindingsConfig,
    EditorKeybindingsHandle, EditorKeybindingsManager, KeyId, DEFAULT_EDITOR_KEYBINDINGS,
};

/// Input events and the raw byte decoder.
pub use crate::core::input_event::{
    parse_input_events, InputEvent, MouseButton, MouseKind, MouseReport,
};

/// Terminal device interface.
pub use crate::core::terminal::{Terminal, TerminalGuard};

pub use crate::render::ScreenBuffer;
pub use crate::widgets::{EditorOutcome, LineEditor, LineEditorState, LineEditorTheme};

/// Shell runtime.
pub use crate::runtime::{
    AssetResolver, Clipboard, ClipboardError, CommandError, CommandOutput, CommandProcessor,
    HoverReport, MemoryClipboard, PointerButton, PointerEvent, PointerKind, ResizeDebouncer,
    ShellEvent, ShellOptions, TerminalShell,
};

/// Visible width helper that ignores ANSI control sequences.
pub use crate::core::text::width::visible_width;
