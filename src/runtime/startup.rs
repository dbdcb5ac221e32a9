use crate::config::Settings;
use crate::player::{AudioBackend, Player};

/// Build the transport with the configured playback defaults applied.
pub fn build_player<B: AudioBackend>(backend: B, cfg: &Settings) -> Player<B> {
    Player::new(
        backend,
        cfg.playback.repeat.into(),
        cfg.playback.shuffle,
        cfg.playback.reshuffle_on_end,
        cfg.volume.initial(),
    )
}
