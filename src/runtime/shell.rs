//! Application shell: owns the surface and the line editor, dispatches submitted lines to the
//! command processor and routes pointer and clipboard interaction.

use std::time::Duration;

use log::{debug, info, warn};

use crate::core::cell_mapper::{CellMapper, RayIntersector};
use crate::core::input_event::InputEvent;
use crate::core::surface::{CellAddress, TerminalSurface};
use crate::runtime::command::{
    AssetResolver, Clipboard, CommandError, CommandOutput, CommandProcessor, NoAssets, NoClipboard,
};
use crate::runtime::debounce::DEFAULT_RESIZE_DEBOUNCE;
use crate::runtime::pointer::{PointerEvent, PointerKind, PointerTracker};
use crate::widgets::line_editor::{EditorOutcome, LineEditor};

const NOT_READY_MESSAGE: &str = "System not ready. Please wait.";
const DEBUG_MOUSE_COMMAND: &str = "debug mouse";

#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Prompt marker handed to the line editor.
    pub prompt: String,
    /// Lines printed by [`TerminalShell::start`] before the first prompt.
    pub greeting: Vec<String>,
    pub resize_debounce: Duration,
    pub mouse_debug: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            greeting: vec![
                "Welcome to the interactive portfolio!".to_string(),
                "Type 'help' for a list of commands.".to_string(),
            ],
            resize_debounce: DEFAULT_RESIZE_DEBOUNCE,
            mouse_debug: false,
        }
    }
}

/// The cell under the pointer while mouse debugging is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverReport {
    pub cell: CellAddress,
    pub text: String,
}

/// What an input event led to, for embedders that react beyond the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Ignored,
    Edited,
    /// A line was submitted and its output written.
    Executed(String),
    Copied,
    Pasted,
}

pub struct TerminalShell<S: TerminalSurface> {
    surface: S,
    editor: LineEditor,
    processor: Box<dyn CommandProcessor>,
    assets: Box<dyn AssetResolver>,
    clipboard: Box<dyn Clipboard>,
    context: Option<String>,
    mapper: CellMapper,
    pointer: PointerTracker,
    mouse_debug: bool,
    last_hover: Option<HoverReport>,
    options: ShellOptions,
}

impl<S: TerminalSurface> TerminalShell<S> {
    pub fn new(
        surface: S,
        mut editor: LineEditor,
        processor: impl CommandProcessor + 'static,
        options: ShellOptions,
    ) -> Self {
        editor.set_prompt(options.prompt.clone());
        Self {
            surface,
            editor,
            processor: Box::new(processor),
            assets: Box::new(NoAssets),
            clipboard: Box::new(NoClipboard),
            context: None,
            mapper: CellMapper::default(),
            pointer: PointerTracker::new(),
            mouse_debug: options.mouse_debug,
            last_hover: None,
            options,
        }
    }

    pub fn with_assets(mut self, assets: impl AssetResolver + 'static) -> Self {
        self.assets = Box::new(assets);
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_mapper(mut self, mapper: CellMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Install the document commands run against. Until then every command reports not ready.
    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = Some(context.into());
    }

    pub fn is_ready(&self) -> bool {
        self.context.is_some()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn options(&self) -> &ShellOptions {
        &self.options
    }

    pub fn mouse_debug(&self) -> bool {
        self.mouse_debug
    }

    pub fn last_hover(&self) -> Option<&HoverReport> {
        self.last_hover.as_ref()
    }

    pub fn hovered_link(&self) -> Option<&str> {
        self.pointer.hovered_link()
    }

    /// Print the greeting and the first prompt.
    pub fn start(&mut self) {
        let mut banner = String::new();
        for line in &self.options.greeting {
            banner.push_str(line);
            banner.push_str("\r\n");
        }
        banner.push_str(self.editor.prompt());
        self.surface.write(&banner);
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> ShellEvent {
        match self.editor.handle_event(event, &mut self.surface) {
            EditorOutcome::Ignored => ShellEvent::Ignored,
            EditorOutcome::Handled => ShellEvent::Edited,
            EditorOutcome::Submitted(line) => {
                self.run_command(&line);
                ShellEvent::Executed(line)
            }
            EditorOutcome::CopyRequested => {
                if self.copy_selection() {
                    ShellEvent::Copied
                } else {
                    ShellEvent::Ignored
                }
            }
            EditorOutcome::PasteRequested => {
                self.paste_from_clipboard();
                ShellEvent::Pasted
            }
        }
    }

    /// Run a submitted line and print its output followed by a fresh prompt.
    pub fn run_command(&mut self, line: &str) {
        if !self.is_ready() {
            self.write(&format!("\r\n{NOT_READY_MESSAGE}"));
            self.prompt();
            return;
        }

        let command = line.trim();
        if command == DEBUG_MOUSE_COMMAND {
            self.mouse_debug = !self.mouse_debug;
            if !self.mouse_debug {
                self.last_hover = None;
            }
            let status = if self.mouse_debug { "ON" } else { "OFF" };
            self.write(&format!("\r\nMouse debugging is now {status}.\r\n"));
            self.prompt();
            return;
        }
        debug!("running command {command:?}");
        let result = match self.context.as_deref() {
            Some(context) => self.processor.process(command, context),
            None => Err(CommandError::NotReady),
        };
        match result {
            Ok(CommandOutput::Clear) => {
                self.surface.clear();
                self.editor.redraw(&mut self.surface);
            }
            Ok(CommandOutput::Text(output)) if output.is_empty() => self.prompt(),
            Ok(CommandOutput::Text(output)) => {
                let resolved = self.assets.resolve(&output);
                self.write(&resolved);
                self.prompt();
            }
            Err(CommandError::NotReady) => {
                self.write(&format!("\r\n{NOT_READY_MESSAGE}"));
                self.prompt();
            }
            Err(err) => {
                warn!("command {command:?} failed: {err}");
                self.write(&format!("\r\n{err}"));
                self.prompt();
            }
        }
    }

    /// Print a message in place of the input line, then repaint the line being edited below it.
    pub fn notify(&mut self, message: &str) {
        self.write(&format!("\x1b[2K\r{message}\r\n"));
        self.editor.redraw(&mut self.surface);
    }

    /// Write text with every line break normalized to CR LF.
    pub fn write(&mut self, text: &str) {
        self.surface.write(&normalize_newlines(text));
    }

    pub fn prompt(&mut self) {
        let prompt = format!("\r\n{}", self.editor.prompt());
        self.surface.write(&prompt);
    }

    pub fn clear(&mut self) {
        self.surface.clear();
    }

    /// Copy the current selection; false when nothing is selected or the clipboard refused.
    pub fn copy_selection(&mut self) -> bool {
        let text = self.surface.selected_text();
        if text.is_empty() {
            return false;
        }
        match self.clipboard.write_text(&text) {
            Ok(()) => true,
            Err(err) => {
                warn!("copy failed: {err}");
                false
            }
        }
    }

    /// Insert clipboard text at the cursor. Failures are logged and leave the editor untouched.
    pub fn paste_from_clipboard(&mut self) {
        match self.clipboard.read_text() {
            Ok(text) if !text.is_empty() => {
                self.editor.handle_character_input(&text, &mut self.surface);
            }
            Ok(_) => {}
            Err(err) => warn!("paste failed: {err}"),
        }
    }

    /// Resolve a pointer event to a cell and apply it. Returns a URL the embedder should open.
    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        intersector: &dyn RayIntersector,
    ) -> Option<String> {
        let cell = self
            .mapper
            .map_pointer(intersector, event.point, self.surface.dimensions());

        if self.mouse_debug && event.kind == PointerKind::Move {
            self.report_hover(cell);
        }
        self.pointer.handle(event.kind, cell, &mut self.surface)
    }

    fn report_hover(&mut self, cell: Option<CellAddress>) {
        let Some(cell) = cell else {
            self.last_hover = None;
            return;
        };
        let text = self.surface.cell_char(cell.col, cell.row).unwrap_or_default();
        info!("Hover: [{}, {}] {:?}", cell.col, cell.row, text);
        self.last_hover = Some(HoverReport { cell, text });
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "\r\n")
}

#[cfg(test)]
mod tests {
    use super::normalize_newlines;

    #[test]
    fn newlines_become_crlf_once() {
        assert_eq!(normalize_newlines("a\nb\r\nc"), "a\r\nb\r\nc");
        assert_eq!(normalize_newlines("plain"), "plain");
    }
}
