//! Input-engine types and logic with no I/O.

pub mod cell_mapper;
pub mod input_event;
pub mod keybindings;
pub mod links;
pub mod selection;
pub mod surface;
pub mod terminal;
pub mod text;
pub mod vocabulary;
