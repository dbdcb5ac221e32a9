//! Small shared types for the playback engine.

use std::path::PathBuf;

use thiserror::Error;

/// The playback state of the transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::Stopped
    }
}

/// What happens when the queue runs past either end.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RepeatMode {
    /// Stop at the end of the queue.
    None,
    /// Wrap around to the other end of the queue.
    Directory,
    /// Repeat the current track when it ends.
    One,
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::None
    }
}

impl RepeatMode {
    /// Cycle `None -> Directory -> One -> None`.
    pub fn cycled(self) -> Self {
        match self {
            Self::None => Self::Directory,
            Self::Directory => Self::One,
            Self::One => Self::None,
        }
    }
}

/// Recoverable playback failures. Only `OutputDevice` at startup is
/// treated as fatal by the runtime.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no audio output device: {0}")]
    OutputDevice(#[from] rodio::StreamError),

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: rodio::decoder::DecoderError,
    },

    #[error("nothing is loaded")]
    NothingLoaded,
}
