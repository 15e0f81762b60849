//! Application shell and its collaborators.

pub mod command;
pub mod debounce;
pub mod pointer;
pub mod shell;

pub use command::{
    AssetResolver, Clipboard, ClipboardError, CommandError, CommandOutput, CommandProcessor,
    MemoryClipboard, NoAssets, NoClipboard,
};
pub use debounce::ResizeDebouncer;
pub use pointer::{PointerButton, PointerEvent, PointerKind, PointerTracker};
pub use shell::{HoverReport, ShellEvent, ShellOptions, TerminalShell};
