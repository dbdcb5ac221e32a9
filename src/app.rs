//! Application model: the directory browser state shown by the TUI.

mod model;

pub use model::*;
