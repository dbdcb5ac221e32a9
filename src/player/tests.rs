use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use tempfile::{TempDir, tempdir};

use super::backend::AudioBackend;
use super::clock::Clock;
use super::queue::{self, Advance, Direction, Queue};
use super::transport::Player;
use super::types::{PlaybackState, PlayerError, RepeatMode};
use crate::library::Track;

#[derive(Default)]
struct FakeState {
    loaded: Option<PathBuf>,
    loads: Vec<PathBuf>,
    playing: bool,
    position: Duration,
    duration: Option<Duration>,
    finished: bool,
    volume: u8,
    halts: u32,
    fail_substring: Option<String>,
}

/// Test double for the audio backend. The shared handle lets tests poke
/// at backend state (e.g. raise the finished flag) while the player owns
/// the backend itself.
#[derive(Default)]
struct FakeBackend(Rc<RefCell<FakeState>>);

impl FakeBackend {
    fn with_handle() -> (Self, Rc<RefCell<FakeState>>) {
        let state = Rc::new(RefCell::new(FakeState::default()));
        (Self(state.clone()), state)
    }
}

impl AudioBackend for FakeBackend {
    fn load(&mut self, track: &Track) -> Result<(), PlayerError> {
        let mut s = self.0.borrow_mut();
        if let Some(pat) = &s.fail_substring {
            if track.path.to_string_lossy().contains(pat.as_str()) {
                return Err(PlayerError::NothingLoaded);
            }
        }
        s.loaded = Some(track.path.clone());
        s.loads.push(track.path.clone());
        s.playing = false;
        s.position = Duration::ZERO;
        s.duration = track.duration.or(Some(Duration::from_secs(180)));
        s.finished = false;
        Ok(())
    }

    fn play(&mut self) {
        let mut s = self.0.borrow_mut();
        if s.loaded.is_some() {
            s.playing = true;
        }
    }

    fn pause(&mut self) {
        self.0.borrow_mut().playing = false;
    }

    fn resume(&mut self) {
        self.play();
    }

    fn halt(&mut self) {
        let mut s = self.0.borrow_mut();
        s.loaded = None;
        s.playing = false;
        s.position = Duration::ZERO;
        s.duration = None;
        s.finished = false;
        s.halts += 1;
    }

    fn position(&self) -> Duration {
        self.0.borrow().position
    }

    fn set_position(&mut self, position: Duration) -> Result<(), PlayerError> {
        let mut s = self.0.borrow_mut();
        if s.loaded.is_none() {
            return Err(PlayerError::NothingLoaded);
        }
        s.position = position;
        Ok(())
    }

    fn duration(&self) -> Option<Duration> {
        self.0.borrow().duration
    }

    fn set_volume(&mut self, percent: u8) {
        self.0.borrow_mut().volume = percent.min(100);
    }

    fn take_finished(&mut self) -> bool {
        std::mem::take(&mut self.0.borrow_mut().finished)
    }
}

fn music_dir(names: &[&str]) -> TempDir {
    let dir = tempdir().unwrap();
    for name in names {
        fs::write(dir.path().join(name), b"not real audio").unwrap();
    }
    dir
}

fn player_with(
    repeat: RepeatMode,
    shuffle: bool,
    reshuffle_on_end: bool,
) -> (Player<FakeBackend>, Rc<RefCell<FakeState>>) {
    let (backend, handle) = FakeBackend::with_handle();
    (
        Player::new(backend, repeat, shuffle, reshuffle_on_end, 100),
        handle,
    )
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    let mut seen = vec![false; len];
    order.len() == len
        && order.iter().all(|&i| {
            if i < len && !seen[i] {
                seen[i] = true;
                true
            } else {
                false
            }
        })
}

// --- advance decision table ---

#[test]
fn advance_forward_moves_through_the_order() {
    let a = queue::advance(Some(0), 3, Direction::Forward, RepeatMode::None, false);
    assert_eq!(a, Advance::Jump(1));
}

#[test]
fn advance_forward_at_end_halts_without_repeat() {
    let a = queue::advance(Some(2), 3, Direction::Forward, RepeatMode::None, false);
    assert_eq!(a, Advance::Halt);
}

#[test]
fn advance_forward_at_end_wraps_under_directory_repeat() {
    let a = queue::advance(Some(2), 3, Direction::Forward, RepeatMode::Directory, false);
    assert_eq!(a, Advance::Jump(0));
}

#[test]
fn advance_forward_at_end_prefers_reshuffle_over_wrap() {
    let a = queue::advance(Some(2), 3, Direction::Forward, RepeatMode::Directory, true);
    assert_eq!(a, Advance::Reshuffle);
    let a = queue::advance(Some(2), 3, Direction::Forward, RepeatMode::None, true);
    assert_eq!(a, Advance::Reshuffle);
}

#[test]
fn advance_repeat_one_restarts_in_both_directions() {
    for dir in [Direction::Forward, Direction::Backward] {
        let a = queue::advance(Some(1), 3, dir, RepeatMode::One, true);
        assert_eq!(a, Advance::Jump(1));
    }
}

#[test]
fn advance_backward_stays_at_start_without_repeat() {
    let a = queue::advance(Some(0), 3, Direction::Backward, RepeatMode::None, false);
    assert_eq!(a, Advance::Stay);
    // reshuffle-on-end never applies going backward
    let a = queue::advance(Some(0), 3, Direction::Backward, RepeatMode::None, true);
    assert_eq!(a, Advance::Stay);
}

#[test]
fn advance_backward_wraps_only_under_directory_repeat() {
    let a = queue::advance(Some(0), 3, Direction::Backward, RepeatMode::Directory, false);
    assert_eq!(a, Advance::Jump(2));
    let a = queue::advance(Some(2), 3, Direction::Backward, RepeatMode::Directory, false);
    assert_eq!(a, Advance::Jump(1));
}

#[test]
fn advance_without_cursor_or_items_stays() {
    let a = queue::advance(None, 3, Direction::Forward, RepeatMode::Directory, true);
    assert_eq!(a, Advance::Stay);
    let a = queue::advance(Some(0), 0, Direction::Forward, RepeatMode::Directory, true);
    assert_eq!(a, Advance::Stay);
}

// --- queue ---

#[test]
fn from_track_builds_identity_order_with_cursor_on_the_track() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let q = Queue::from_track(&dir.path().join("b.mp3"), false);

    assert_eq!(q.len(), 3);
    assert_eq!(q.order(), &[0, 1, 2]);
    assert_eq!(q.cursor(), Some(1));
    assert_eq!(q.current().unwrap().file_name(), "b.mp3");
}

#[test]
fn from_track_shuffled_is_a_permutation_with_cursor_on_the_track() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3"]);
    let q = Queue::from_track(&dir.path().join("c.mp3"), true);

    assert!(is_permutation(q.order(), 5));
    assert_eq!(q.current().unwrap().file_name(), "c.mp3");
}

#[test]
fn from_track_in_missing_directory_is_empty() {
    let dir = tempdir().unwrap();
    let q = Queue::from_track(&dir.path().join("gone").join("x.mp3"), false);
    assert!(q.is_empty());
    assert_eq!(q.cursor(), None);
}

#[test]
fn set_shuffled_off_restores_identity_and_relocates_cursor() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3", "d.mp3"]);
    let mut q = Queue::from_track(&dir.path().join("d.mp3"), true);
    let active = q.current().unwrap().file_name();

    q.set_shuffled(false);
    assert_eq!(q.order(), &[0, 1, 2, 3]);
    assert_eq!(q.current().unwrap().file_name(), active);

    q.set_shuffled(true);
    assert!(is_permutation(q.order(), 4));
    assert_eq!(q.current().unwrap().file_name(), active);
}

#[test]
fn reshuffle_produces_distinct_valid_permutations() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3", "d.mp3", "e.mp3", "f.mp3"]);
    let mut q = Queue::from_track(&dir.path().join("a.mp3"), false);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..20 {
        q.reshuffle();
        assert!(is_permutation(q.order(), 6));
        seen.insert(q.order().to_vec());
    }
    // 20 draws from 720 permutations collide into one only with
    // vanishing probability.
    assert!(seen.len() > 1);
}

// --- clock ---

#[test]
fn clock_sample_reads_the_reset_position_and_is_non_decreasing() {
    let mut clock = Clock::new();
    clock.reset(Duration::from_secs(5));

    let first = clock.sample(None);
    assert!(first >= Duration::from_secs(5));
    assert!(first < Duration::from_secs(6));

    std::thread::sleep(Duration::from_millis(10));
    let second = clock.sample(None);
    assert!(second >= first);
}

#[test]
fn clock_freezes_while_paused_and_continues_on_resume() {
    let mut clock = Clock::new();
    clock.reset(Duration::ZERO);
    clock.freeze(Duration::from_secs(3));

    let a = clock.sample(None);
    std::thread::sleep(Duration::from_millis(10));
    let b = clock.sample(None);
    assert_eq!(a, b);
    assert_eq!(b, Duration::from_secs(3));

    clock.resume();
    assert!(!clock.is_frozen());
    let c = clock.sample(None);
    assert!(c >= Duration::from_secs(3));
    assert!(c < Duration::from_secs(4));
}

#[test]
fn clock_sample_clamps_to_the_limit() {
    let mut clock = Clock::new();
    clock.reset(Duration::from_secs(500));
    assert_eq!(
        clock.sample(Some(Duration::from_secs(60))),
        Duration::from_secs(60)
    );
}

// --- transport ---

#[test]
fn open_starts_playing_the_requested_track() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut player, handle) = player_with(RepeatMode::None, false, false);

    player.open(&dir.path().join("b.mp3")).unwrap();
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.current_track().unwrap().file_name(), "b.mp3");
    assert!(handle.borrow().playing);
    assert_eq!(player.duration(), Some(Duration::from_secs(180)));
}

#[test]
fn open_in_unreadable_directory_stops_playback() {
    let dir = music_dir(&["a.mp3"]);
    let (mut player, _) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    player.open(&dir.path().join("gone").join("x.mp3")).unwrap();
    assert_eq!(player.state(), PlaybackState::Stopped);
    assert!(player.current_track().is_none());
}

#[test]
fn play_at_out_of_range_is_a_no_op() {
    let dir = music_dir(&["a.mp3", "b.mp3"]);
    let (mut player, _) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    player.play_at(99).unwrap();
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.queue().cursor(), Some(0));
}

#[test]
fn next_then_previous_returns_to_the_same_track() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut player, _) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    player.next().unwrap();
    assert_eq!(player.current_track().unwrap().file_name(), "b.mp3");
    player.previous().unwrap();
    assert_eq!(player.current_track().unwrap().file_name(), "a.mp3");
}

#[test]
fn repeat_one_reselects_the_same_slot() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut player, _) = player_with(RepeatMode::One, false, false);
    player.open(&dir.path().join("b.mp3")).unwrap();

    player.next().unwrap();
    assert_eq!(player.queue().cursor(), Some(1));
    player.previous().unwrap();
    assert_eq!(player.queue().cursor(), Some(1));
    assert_eq!(player.state(), PlaybackState::Playing);
}

#[test]
fn exhausting_the_queue_stops_and_clears_the_active_track() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut player, handle) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("c.mp3")).unwrap();

    player.next().unwrap();
    assert_eq!(player.state(), PlaybackState::Stopped);
    assert!(player.current_track().is_none());
    assert!(!handle.borrow().playing);
    assert!(handle.borrow().loaded.is_none());
    assert_eq!(handle.borrow().halts, 1);
}

#[test]
fn directory_repeat_wraps_to_the_first_slot() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut player, _) = player_with(RepeatMode::Directory, false, false);
    player.open(&dir.path().join("c.mp3")).unwrap();

    player.next().unwrap();
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.queue().cursor(), Some(0));
    assert_eq!(player.current_track().unwrap().file_name(), "a.mp3");
}

#[test]
fn directory_repeat_comes_back_around_after_len_steps() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut player, _) = player_with(RepeatMode::Directory, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    for _ in 0..3 {
        player.next().unwrap();
    }
    assert_eq!(player.queue().cursor(), Some(0));
}

#[test]
fn previous_at_queue_start_is_a_no_op_without_repeat() {
    let dir = music_dir(&["a.mp3", "b.mp3"]);
    let (mut player, _) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    player.previous().unwrap();
    assert_eq!(player.queue().cursor(), Some(0));
    assert_eq!(player.state(), PlaybackState::Playing);
}

#[test]
fn reshuffle_on_end_replays_from_the_top_of_a_fresh_order() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut player, _) = player_with(RepeatMode::None, false, true);
    player.open(&dir.path().join("c.mp3")).unwrap();

    player.next().unwrap();
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.queue().cursor(), Some(0));
    assert!(is_permutation(player.queue().order(), 3));
}

#[test]
fn seek_clamps_to_both_ends() {
    let dir = music_dir(&["a.mp3"]);
    let (mut player, handle) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    player.seek(i64::MAX).unwrap();
    assert_eq!(player.position(), Duration::from_secs(180));
    assert_eq!(handle.borrow().position, Duration::from_secs(180));

    player.seek(i64::MIN).unwrap();
    assert!(player.position() < Duration::from_secs(1));
    assert_eq!(handle.borrow().position, Duration::ZERO);
}

#[test]
fn seek_while_stopped_is_a_no_op() {
    let (mut player, handle) = player_with(RepeatMode::None, false, false);
    player.seek(30).unwrap();
    assert_eq!(player.position(), Duration::ZERO);
    assert_eq!(handle.borrow().position, Duration::ZERO);
}

#[test]
fn pause_freezes_position_and_resume_continues() {
    let dir = music_dir(&["a.mp3"]);
    let (mut player, handle) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    handle.borrow_mut().position = Duration::from_secs(42);
    player.toggle_pause();
    assert_eq!(player.state(), PlaybackState::Paused);
    assert!(!handle.borrow().playing);

    let a = player.position();
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(player.position(), a);
    assert_eq!(a, Duration::from_secs(42));

    player.toggle_pause();
    assert_eq!(player.state(), PlaybackState::Playing);
    assert!(player.position() >= a);
}

#[test]
fn finished_flag_advances_to_the_next_track_once() {
    let dir = music_dir(&["a.mp3", "b.mp3"]);
    let (mut player, handle) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    assert!(!player.poll_finished().unwrap());

    handle.borrow_mut().finished = true;
    assert!(player.poll_finished().unwrap());
    assert_eq!(player.current_track().unwrap().file_name(), "b.mp3");

    // flag was consumed
    assert!(!player.poll_finished().unwrap());
}

#[test]
fn unplayable_track_is_skipped_on_next() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut player, handle) = player_with(RepeatMode::None, false, false);
    handle.borrow_mut().fail_substring = Some("b.mp3".into());

    player.open(&dir.path().join("a.mp3")).unwrap();
    player.next().unwrap();

    assert_eq!(player.current_track().unwrap().file_name(), "c.mp3");
    assert_eq!(player.state(), PlaybackState::Playing);

    // only the playable tracks actually reached the backend
    let loads: Vec<String> = handle
        .borrow()
        .loads
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(loads, vec!["a.mp3", "c.mp3"]);
}

#[test]
fn a_directory_of_unplayable_tracks_ends_stopped() {
    let dir = music_dir(&["a.mp3", "b.mp3"]);
    let (mut player, handle) = player_with(RepeatMode::Directory, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    handle.borrow_mut().fail_substring = Some(".mp3".into());
    assert!(player.next().is_err());
    assert_eq!(player.state(), PlaybackState::Stopped);
}

#[test]
fn load_failure_on_play_at_leaves_current_playback_alone() {
    let dir = music_dir(&["a.mp3", "bad.mp3"]);
    let (mut player, handle) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("a.mp3")).unwrap();

    handle.borrow_mut().fail_substring = Some("bad".into());
    assert!(player.play_at(1).is_err());
    assert_eq!(player.state(), PlaybackState::Playing);
    assert_eq!(player.current_track().unwrap().file_name(), "a.mp3");
}

#[test]
fn toggle_shuffle_keeps_the_cursor_on_the_active_track() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3", "d.mp3"]);
    let (mut player, _) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("c.mp3")).unwrap();

    player.toggle_shuffle();
    assert!(player.shuffle());
    assert_eq!(player.current_track().unwrap().file_name(), "c.mp3");
    assert!(is_permutation(player.queue().order(), 4));

    player.toggle_shuffle();
    assert!(!player.shuffle());
    assert_eq!(player.current_track().unwrap().file_name(), "c.mp3");
    assert_eq!(player.queue().cursor(), Some(2));
}

#[test]
fn play_first_and_last_jump_to_the_order_ends() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let (mut player, _) = player_with(RepeatMode::None, false, false);
    player.open(&dir.path().join("b.mp3")).unwrap();

    player.play_last().unwrap();
    assert_eq!(player.queue().cursor(), Some(2));
    player.play_first().unwrap();
    assert_eq!(player.queue().cursor(), Some(0));
}

#[test]
fn volume_adjust_clamps_to_percent_range() {
    let (mut player, handle) = player_with(RepeatMode::None, false, false);
    assert_eq!(player.volume(), 100);

    player.adjust_volume(5);
    assert_eq!(player.volume(), 100);

    for _ in 0..30 {
        player.adjust_volume(-5);
    }
    assert_eq!(player.volume(), 0);
    assert_eq!(handle.borrow().volume, 0);

    player.adjust_volume(1);
    assert_eq!(player.volume(), 1);
}

#[test]
fn cycle_repeat_goes_none_directory_one() {
    let (mut player, _) = player_with(RepeatMode::None, false, false);
    assert_eq!(player.repeat(), RepeatMode::None);
    player.cycle_repeat();
    assert_eq!(player.repeat(), RepeatMode::Directory);
    player.cycle_repeat();
    assert_eq!(player.repeat(), RepeatMode::One);
    player.cycle_repeat();
    assert_eq!(player.repeat(), RepeatMode::None);
}

#[test]
fn slot_of_path_reports_queue_positions() {
    let dir = music_dir(&["a.mp3", "b.mp3", "c.mp3"]);
    let q = Queue::from_track(&dir.path().join("a.mp3"), false);

    assert_eq!(q.slot_of_path(&dir.path().join("c.mp3")), Some(2));
    assert_eq!(q.slot_of_path(Path::new("/elsewhere/z.mp3")), None);
}
