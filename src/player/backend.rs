//! Audio backend seam.
//!
//! `AudioBackend` is the narrow surface the transport drives; the real
//! implementation sits on `rodio`. Seeking recreates the sink with
//! `skip_duration`, which works across the common formats without
//! relying on per-decoder seek support.

use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::library::Track;

use super::types::PlayerError;

/// What the transport needs from an audio output. Calls are synchronous
/// and expected to return quickly; a `load` or `halt` supersedes and
/// discards whatever was playing.
pub trait AudioBackend {
    /// Prepare `track` for playback from position zero, replacing any
    /// current sound. The sink starts paused; call `play` to start.
    fn load(&mut self, track: &Track) -> Result<(), PlayerError>;
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    /// Stop and discard the current sound.
    fn halt(&mut self);
    /// Backend-reported position of the current sound.
    fn position(&self) -> Duration;
    /// Jump to an absolute position within the current sound.
    fn set_position(&mut self, position: Duration) -> Result<(), PlayerError>;
    /// Duration of the loaded sound, when known.
    fn duration(&self) -> Option<Duration>;
    /// Volume in percent, clamped to 0..=100.
    fn set_volume(&mut self, percent: u8);
    /// Check-and-clear the decoder-finished flag. Set at most once per
    /// loaded sound, from the backend's own context.
    fn take_finished(&mut self) -> bool;
}

/// How often the watcher looks for a drained sink.
const WATCH_INTERVAL: Duration = Duration::from_millis(100);

struct SinkSlot {
    sink: Option<Sink>,
    /// Absolute position at which the current sink's source starts.
    offset: Duration,
    /// Bumped on every load/seek/halt so one track end is reported once.
    generation: u64,
}

pub struct RodioBackend {
    stream: OutputStream,
    slot: Arc<Mutex<SinkSlot>>,
    finished: Arc<AtomicBool>,
    loaded: Option<Track>,
    volume: u8,
}

impl RodioBackend {
    /// Open the default output device. Failure here is the one fatal
    /// startup error; the runtime reports it before the TUI starts.
    pub fn new() -> Result<Self, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when the stream is dropped; noisy for a TUI.
        stream.log_on_drop(false);

        let slot = Arc::new(Mutex::new(SinkSlot {
            sink: None,
            offset: Duration::ZERO,
            generation: 0,
        }));
        let finished = Arc::new(AtomicBool::new(false));

        spawn_finish_watcher(Arc::downgrade(&slot), finished.clone());

        Ok(Self {
            stream,
            slot,
            finished,
            loaded: None,
            volume: 100,
        })
    }

    fn create_sink_at(&self, track: &Track, start_at: Duration) -> Result<Sink, PlayerError> {
        let file = File::open(&track.path).map_err(|source| PlayerError::Open {
            path: track.path.clone(),
            source,
        })?;

        let source = Decoder::new(BufReader::new(file))
            .map_err(|source| PlayerError::Decode {
                path: track.path.clone(),
                source,
            })?
            // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
            .skip_duration(start_at);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();
        sink.set_volume(f32::from(self.volume) / 100.0);
        Ok(sink)
    }

    fn replace_sink(&mut self, sink: Option<Sink>, offset: Duration) {
        if let Ok(mut slot) = self.slot.lock() {
            if let Some(old) = slot.sink.take() {
                old.stop();
            }
            slot.sink = sink;
            slot.offset = offset;
            slot.generation += 1;
        }
        self.finished.store(false, Ordering::Release);
    }
}

/// Watches the live sink from a backend-owned thread and latches track
/// end into the shared flag. Exits when the backend is dropped.
fn spawn_finish_watcher(slot: Weak<Mutex<SinkSlot>>, finished: Arc<AtomicBool>) {
    thread::spawn(move || {
        let mut last_reported: u64 = 0;
        loop {
            thread::sleep(WATCH_INTERVAL);
            let Some(slot) = slot.upgrade() else {
                break;
            };
            let Ok(guard) = slot.lock() else {
                break;
            };
            if let Some(sink) = guard.sink.as_ref() {
                if !sink.is_paused() && sink.empty() && guard.generation != last_reported {
                    last_reported = guard.generation;
                    finished.store(true, Ordering::Release);
                }
            }
        }
    });
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, track: &Track) -> Result<(), PlayerError> {
        let sink = self.create_sink_at(track, Duration::ZERO)?;
        self.replace_sink(Some(sink), Duration::ZERO);
        self.loaded = Some(track.clone());
        Ok(())
    }

    fn play(&mut self) {
        if let Ok(slot) = self.slot.lock() {
            if let Some(sink) = slot.sink.as_ref() {
                sink.play();
            }
        }
    }

    fn pause(&mut self) {
        if let Ok(slot) = self.slot.lock() {
            if let Some(sink) = slot.sink.as_ref() {
                sink.pause();
            }
        }
    }

    fn resume(&mut self) {
        self.play();
    }

    fn halt(&mut self) {
        self.replace_sink(None, Duration::ZERO);
        self.loaded = None;
    }

    fn position(&self) -> Duration {
        match self.slot.lock() {
            Ok(slot) => match slot.sink.as_ref() {
                Some(sink) => slot.offset + sink.get_pos(),
                None => Duration::ZERO,
            },
            Err(_) => Duration::ZERO,
        }
    }

    fn set_position(&mut self, position: Duration) -> Result<(), PlayerError> {
        let track = self.loaded.clone().ok_or(PlayerError::NothingLoaded)?;
        let was_paused = self
            .slot
            .lock()
            .ok()
            .and_then(|s| s.sink.as_ref().map(|sink| sink.is_paused()))
            .unwrap_or(true);

        let sink = self.create_sink_at(&track, position)?;
        if !was_paused {
            sink.play();
        }
        self.replace_sink(Some(sink), position);
        Ok(())
    }

    fn duration(&self) -> Option<Duration> {
        self.loaded.as_ref().and_then(|t| t.duration)
    }

    fn set_volume(&mut self, percent: u8) {
        self.volume = percent.min(100);
        if let Ok(slot) = self.slot.lock() {
            if let Some(sink) = slot.sink.as_ref() {
                sink.set_volume(f32::from(self.volume) / 100.0);
            }
        }
    }

    fn take_finished(&mut self) -> bool {
        self.finished.swap(false, Ordering::AcqRel)
    }
}
