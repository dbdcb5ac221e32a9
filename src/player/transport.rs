//! The transport state machine.
//!
//! One `Player` owns the queue, the clock and the audio backend; every
//! mutation goes through the methods here, whether it came from the
//! keyboard or from the control surface.

use std::path::Path;
use std::time::Duration;

use crate::library::Track;

use super::backend::AudioBackend;
use super::clock::Clock;
use super::queue::{self, Advance, Direction, Queue};
use super::types::{PlaybackState, PlayerError, RepeatMode};

pub struct Player<B: AudioBackend> {
    backend: B,
    queue: Queue,
    clock: Clock,
    state: PlaybackState,
    duration: Option<Duration>,
    repeat: RepeatMode,
    shuffle: bool,
    reshuffle_on_end: bool,
    volume: u8,
}

impl<B: AudioBackend> Player<B> {
    pub fn new(
        mut backend: B,
        repeat: RepeatMode,
        shuffle: bool,
        reshuffle_on_end: bool,
        volume: u8,
    ) -> Self {
        let volume = volume.min(100);
        backend.set_volume(volume);
        Self {
            backend,
            queue: Queue::empty(),
            clock: Clock::new(),
            state: PlaybackState::Stopped,
            duration: None,
            repeat,
            shuffle,
            reshuffle_on_end,
            volume,
        }
    }

    /// Build the queue from the siblings of `path` and start playing it.
    ///
    /// An empty rebuild (missing or unreadable directory) stops playback;
    /// the previous queue is gone either way.
    pub fn open(&mut self, path: &Path) -> Result<(), PlayerError> {
        self.queue = Queue::from_track(path, self.shuffle);
        match self.queue.cursor() {
            Some(slot) => self.play_at(slot),
            None => {
                self.stop();
                Ok(())
            }
        }
    }

    /// Play the track at `slot` of the play order. Out of range is a
    /// no-op; a load failure leaves current playback untouched.
    pub fn play_at(&mut self, slot: usize) -> Result<(), PlayerError> {
        let Some(track) = self.queue.track_at(slot) else {
            return Ok(());
        };

        self.backend.load(track)?;
        self.backend.play();
        self.duration = self.backend.duration();
        self.clock.reset(Duration::ZERO);
        self.queue.set_cursor(slot);
        self.state = PlaybackState::Playing;
        Ok(())
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Stopped => {}
        }
    }

    /// Pause if playing; freezes the clock at the backend-reported
    /// position.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.backend.pause();
            self.clock.freeze(self.backend.position());
            self.state = PlaybackState::Paused;
        }
    }

    /// Resume if paused; the clock origin is re-derived from the frozen
    /// position.
    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.backend.resume();
            self.clock.resume();
            self.state = PlaybackState::Playing;
        }
    }

    /// Seek by `delta_secs`, clamped to `[0, duration]`. No-op while
    /// stopped.
    pub fn seek(&mut self, delta_secs: i64) -> Result<(), PlayerError> {
        if self.state == PlaybackState::Stopped {
            return Ok(());
        }

        let current = self.position();
        let target = if delta_secs >= 0 {
            current.saturating_add(Duration::from_secs(delta_secs as u64))
        } else {
            current.saturating_sub(Duration::from_secs(delta_secs.unsigned_abs()))
        };
        let target = match self.duration {
            Some(d) => target.min(d),
            None => target,
        };

        self.backend.set_position(target)?;
        if self.state == PlaybackState::Paused {
            self.clock.freeze(target);
        } else {
            self.clock.reset(target);
        }
        Ok(())
    }

    pub fn next(&mut self) -> Result<(), PlayerError> {
        self.step(Direction::Forward)
    }

    pub fn previous(&mut self) -> Result<(), PlayerError> {
        self.step(Direction::Backward)
    }

    pub fn play_first(&mut self) -> Result<(), PlayerError> {
        self.play_at(0)
    }

    pub fn play_last(&mut self) -> Result<(), PlayerError> {
        match self.queue.len() {
            0 => Ok(()),
            n => self.play_at(n - 1),
        }
    }

    fn step(&mut self, direction: Direction) -> Result<(), PlayerError> {
        match queue::advance(
            self.queue.cursor(),
            self.queue.len(),
            direction,
            self.repeat,
            self.reshuffle_on_end,
        ) {
            Advance::Jump(slot) => self.play_skipping(slot, direction),
            Advance::Reshuffle => {
                self.queue.reshuffle();
                self.play_skipping(0, direction)
            }
            Advance::Halt => {
                self.stop();
                Ok(())
            }
            Advance::Stay => Ok(()),
        }
    }

    /// Play `slot`, skipping unplayable tracks in the step direction.
    /// Bounded by the queue length so a directory of bad files ends in
    /// Stopped rather than a spin; the first failure is reported.
    fn play_skipping(&mut self, start: usize, direction: Direction) -> Result<(), PlayerError> {
        let len = self.queue.len();
        let mut slot = start;
        let mut first_err: Option<PlayerError> = None;

        for _ in 0..len {
            match self.play_at(slot) {
                // A bad track may have been skipped, but playback goes on.
                Ok(()) => return Ok(()),
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                    match queue::advance(Some(slot), len, direction, self.repeat, false) {
                        Advance::Jump(next_slot) if next_slot != slot => slot = next_slot,
                        _ => break,
                    }
                }
            }
        }

        self.stop();
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Halt the backend and clear the active track.
    pub fn stop(&mut self) {
        self.backend.halt();
        self.state = PlaybackState::Stopped;
        self.duration = None;
        self.queue.clear_cursor();
    }

    /// Consume the decoder-finished flag, advancing if it was set.
    /// Called exactly once per event-loop tick.
    pub fn poll_finished(&mut self) -> Result<bool, PlayerError> {
        if self.state == PlaybackState::Playing && self.backend.take_finished() {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Toggle shuffle, re-permuting the live queue in place. The cursor
    /// follows the active track.
    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
        self.queue.set_shuffled(self.shuffle);
    }

    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.cycled();
    }

    /// Adjust volume by `delta` percent, clamped to 0..=100.
    pub fn adjust_volume(&mut self, delta: i8) {
        let v = i16::from(self.volume) + i16::from(delta);
        self.volume = v.clamp(0, 100) as u8;
        self.backend.set_volume(self.volume);
    }

    /// Current position: zero while stopped, frozen while paused,
    /// clock-derived while playing.
    pub fn position(&self) -> Duration {
        match self.state {
            PlaybackState::Stopped => Duration::ZERO,
            _ => self.clock.sample(self.duration),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_track(&self) -> Option<&Track> {
        match self.state {
            PlaybackState::Stopped => None,
            _ => self.queue.current(),
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn reshuffle_on_end(&self) -> bool {
        self.reshuffle_on_end
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }
}
