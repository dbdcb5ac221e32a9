//! Playback engine: queue ordering, transport state machine, clock.
//!
//! Everything in here is mutated from the runtime event loop only; the
//! single piece of cross-thread state is the backend's finished flag.

mod backend;
mod clock;
mod queue;
mod transport;
mod types;

pub use backend::{AudioBackend, RodioBackend};
pub use clock::Clock;
pub use queue::{Direction, Queue};
pub use transport::Player;
pub use types::{PlaybackState, PlayerError, RepeatMode};

#[cfg(test)]
mod tests;
