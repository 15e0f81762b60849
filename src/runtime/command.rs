//! Seams between the shell and its collaborators: command processing, asset placeholders and
//! the system clipboard.

use thiserror::Error;

/// Result of running one submitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Clear the surface before the next prompt.
    Clear,
    /// Text to print; may contain `\n` line breaks and asset placeholders.
    Text(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("command context is not loaded")]
    NotReady,
    #[error("command failed: {0}")]
    Failed(String),
}

/// Turns a submitted line into output, given the loaded context document.
pub trait CommandProcessor {
    fn process(&mut self, line: &str, context: &str) -> Result<CommandOutput, CommandError>;
}

impl<F> CommandProcessor for F
where
    F: FnMut(&str, &str) -> Result<CommandOutput, CommandError>,
{
    fn process(&mut self, line: &str, context: &str) -> Result<CommandOutput, CommandError> {
        self(line, context)
    }
}

/// Substitutes `[[...]]` placeholders in command output with preloaded content.
pub trait AssetResolver {
    fn resolve(&self, text: &str) -> String;
}

/// Leaves output untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAssets;

impl AssetResolver for NoAssets {
    fn resolve(&self, text: &str) -> String {
        text.to_string()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard is unavailable")]
    Unavailable,
    #[error("clipboard is empty")]
    Empty,
    #[error("clipboard backend error: {0}")]
    Backend(String),
}

pub trait Clipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError>;
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Process-local clipboard.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            contents: Some(text.into()),
        }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        self.contents.clone().ok_or(ClipboardError::Empty)
    }

    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// A clipboard that refuses every access, as in a sandbox without clipboard permissions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn read_text(&mut self) -> Result<String, ClipboardError> {
        Err(ClipboardError::Unavailable)
    }

    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}
