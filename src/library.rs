//! Filesystem listing and track metadata.
//!
//! One directory at a time: the browser shows `list_entries`, the queue
//! is built from `sibling_tracks`.

mod model;
mod scan;

pub use model::*;
pub use scan::*;
