//! The directory-scoped play queue: tracks, a play-order permutation and
//! a cursor into that permutation.

use std::path::Path;

use rand::seq::SliceRandom;

use crate::library::{self, Track};

use super::types::RepeatMode;

/// Direction of a manual or automatic queue step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Outcome of the advance decision table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Advance {
    /// Play the track at this slot of the order.
    Jump(usize),
    /// Re-permute the order, then play slot 0.
    Reshuffle,
    /// Queue exhausted: stop playback.
    Halt,
    /// Nothing to do.
    Stay,
}

/// Ordered set of one directory's playable tracks.
///
/// Invariants: `order` is always a permutation of `0..tracks.len()`;
/// `cursor` is absent or a valid index into `order`.
#[derive(Debug, Default)]
pub struct Queue {
    tracks: Vec<Track>,
    order: Vec<usize>,
    cursor: Option<usize>,
}

impl Queue {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a queue from the audio files next to `path`, pointing the
    /// cursor at `path` itself. A missing or unreadable parent yields an
    /// empty queue with no cursor.
    pub fn from_track(path: &Path, shuffle: bool) -> Self {
        let tracks = library::sibling_tracks(path);
        let mut order: Vec<usize> = (0..tracks.len()).collect();
        if shuffle && order.len() > 1 {
            order.shuffle(&mut rand::rng());
        }

        let cursor = tracks
            .iter()
            .position(|t| t.path == path)
            .and_then(|item| order.iter().position(|&i| i == item));

        Self {
            tracks,
            order,
            cursor,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub(crate) fn set_cursor(&mut self, slot: usize) {
        if slot < self.order.len() {
            self.cursor = Some(slot);
        }
    }

    pub(crate) fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    /// Track at the given slot of the play order.
    pub fn track_at(&self, slot: usize) -> Option<&Track> {
        self.order.get(slot).and_then(|&i| self.tracks.get(i))
    }

    /// The track under the cursor, if any.
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|slot| self.track_at(slot))
    }

    /// Slot of the given file in the play order, used by the UI for the
    /// `[slot/len]` indicator.
    pub fn slot_of_path(&self, path: &Path) -> Option<usize> {
        let item = self.tracks.iter().position(|t| t.path == path)?;
        self.order.iter().position(|&i| i == item)
    }

    /// Re-permute the play order uniformly at random. The cursor slot is
    /// left untouched; callers decide where playback goes next.
    pub fn reshuffle(&mut self) {
        if self.order.len() > 1 {
            self.order.shuffle(&mut rand::rng());
        }
    }

    /// Switch between shuffled and filesystem order, relocating the
    /// cursor so it keeps pointing at the active track.
    pub fn set_shuffled(&mut self, shuffle: bool) {
        let active = self.cursor.and_then(|slot| self.order.get(slot).copied());

        if shuffle {
            self.reshuffle();
        } else {
            self.order = (0..self.tracks.len()).collect();
        }

        self.cursor = active.and_then(|item| self.order.iter().position(|&i| i == item));
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

/// The advance decision table: pure, mutates nothing.
///
/// Forward from the last slot either reshuffles (when enabled), wraps
/// (repeat = Directory) or halts. Backward from slot 0 wraps only under
/// repeat = Directory and never reshuffles.
pub(crate) fn advance(
    cursor: Option<usize>,
    len: usize,
    direction: Direction,
    repeat: RepeatMode,
    reshuffle_on_end: bool,
) -> Advance {
    let Some(c) = cursor else {
        return Advance::Stay;
    };
    if len == 0 {
        return Advance::Stay;
    }

    if repeat == RepeatMode::One {
        return Advance::Jump(c);
    }

    match direction {
        Direction::Forward => {
            if c + 1 < len {
                Advance::Jump(c + 1)
            } else if reshuffle_on_end {
                Advance::Reshuffle
            } else if repeat == RepeatMode::Directory {
                Advance::Jump(0)
            } else {
                Advance::Halt
            }
        }
        Direction::Backward => {
            if c > 0 {
                Advance::Jump(c - 1)
            } else if repeat == RepeatMode::Directory {
                Advance::Jump(len - 1)
            } else {
                Advance::Stay
            }
        }
    }
}
