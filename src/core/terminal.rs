//! Terminal device trait and lifecycle guard.

use std::io;
use std::ops::{Deref, DerefMut};

use log::warn;

use crate::core::input_event::InputEvent;

/// A byte-stream terminal the shell's output is mirrored to.
pub trait Terminal {
    /// Start delivering decoded input and resize notifications.
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(Vec<InputEvent>) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()>;

    /// Stop input delivery and restore the device state.
    fn stop(&mut self) -> io::Result<()>;

    fn write(&mut self, data: &str);

    fn columns(&self) -> u16;
    fn rows(&self) -> u16;
}

/// Stops the wrapped terminal on drop, so an early return or panic unwinding out of the event
/// loop still restores the device. Also a [`Terminal`] itself, so it can sit under a surface.
pub struct TerminalGuard<T: Terminal> {
    inner: Option<T>,
}

impl<T: Terminal> TerminalGuard<T> {
    pub fn new(terminal: T) -> Self {
        Self {
            inner: Some(terminal),
        }
    }

    /// Consume the guard without stopping the terminal.
    pub fn into_inner(mut self) -> T {
        self.inner.take().expect("guard holds its terminal until dropped")
    }
}

impl<T: Terminal> Deref for TerminalGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.inner.as_ref().expect("guard holds its terminal until dropped")
    }
}

impl<T: Terminal> DerefMut for TerminalGuard<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.inner.as_mut().expect("guard holds its terminal until dropped")
    }
}

impl<T: Terminal> Terminal for TerminalGuard<T> {
    fn start(
        &mut self,
        on_input: Box<dyn FnMut(Vec<InputEvent>) + Send>,
        on_resize: Box<dyn FnMut() + Send>,
    ) -> io::Result<()> {
        (**self).start(on_input, on_resize)
    }

    fn stop(&mut self) -> io::Result<()> {
        (**self).stop()
    }

    fn write(&mut self, data: &str) {
        (**self).write(data);
    }

    fn columns(&self) -> u16 {
        (**self).columns()
    }

    fn rows(&self) -> u16 {
        (**self).rows()
    }
}

impl<T: Terminal> Drop for TerminalGuard<T> {
    fn drop(&mut self) {
        let Some(terminal) = self.inner.as_mut() else {
            return;
        };
        if let Err(err) = terminal.stop() {
            warn!("failed to restore terminal: {err}");
        }
    }
}
