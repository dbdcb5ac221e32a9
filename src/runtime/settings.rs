use crate::config::Settings;
use crate::player::{AudioBackend, Player};

pub fn load_settings() -> Settings {
    match Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("attacca: invalid config, using defaults: {msg}");
                Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("attacca: failed to load config, using defaults: {e}");
            Settings::default()
        }
    }
}

/// Fold the player's current toggles back into the settings and write
/// them out. Runs after the terminal has been restored.
pub fn persist_settings<B: AudioBackend>(cfg: &mut Settings, player: &Player<B>) {
    cfg.playback.shuffle = player.shuffle();
    cfg.playback.repeat = player.repeat().into();
    cfg.playback.reshuffle_on_end = player.reshuffle_on_end();
    cfg.volume.last = player.volume();

    if let Err(e) = cfg.save() {
        eprintln!("attacca: failed to save config: {e}");
    }
}
