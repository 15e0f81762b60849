//! Platform-specific terminal integrations.

pub mod osc52_clipboard;
pub mod stdin_buffer;
pub mod tty_surface;

#[cfg(unix)]
pub mod process_terminal;

#[cfg(unix)]
pub use process_terminal::ProcessTerminal;
pub use osc52_clipboard::Osc52Clipboard;
pub use tty_surface::TtySurface;
