use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::player::RepeatMode;

/// Top-level application settings.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/attacca/config.toml` or
/// `~/.config/attacca/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ATTACCA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
///
/// Unlike most TOML configs this one is written back at shutdown, so the
/// playback toggles and last volume survive across sessions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub volume: VolumeSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory the browser opens in. Falls back to `$HOME`, then `.`.
    pub start_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// What happens at the ends of the queue.
    pub repeat: RepeatSetting,
    /// Re-permute a shuffled queue when it runs out instead of stopping.
    pub reshuffle_on_end: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            shuffle: false,
            repeat: RepeatSetting::None,
            reshuffle_on_end: false,
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatSetting {
    #[serde(alias = "off", alias = "no")]
    None,
    #[serde(alias = "dir", alias = "all")]
    Directory,
    #[serde(alias = "repeat-one", alias = "track")]
    One,
}

impl From<RepeatSetting> for RepeatMode {
    fn from(s: RepeatSetting) -> Self {
        match s {
            RepeatSetting::None => RepeatMode::None,
            RepeatSetting::Directory => RepeatMode::Directory,
            RepeatSetting::One => RepeatMode::One,
        }
    }
}

impl From<RepeatMode> for RepeatSetting {
    fn from(m: RepeatMode) -> Self {
        match m {
            RepeatMode::None => RepeatSetting::None,
            RepeatMode::Directory => RepeatSetting::Directory,
            RepeatMode::One => RepeatSetting::One,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VolumeSettings {
    /// How the starting volume is chosen.
    pub mode: VolumeMode,
    /// Starting volume for `mode = "fixed"`, percent.
    pub fixed: u8,
    /// Volume at last shutdown, percent; used by `mode = "keep-last"`.
    pub last: u8,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            mode: VolumeMode::Default,
            fixed: 100,
            last: 100,
        }
    }
}

impl VolumeSettings {
    /// Resolve the starting volume, clamped to 0..=100.
    pub fn initial(&self) -> u8 {
        let v = match self.mode {
            VolumeMode::Default => 100,
            VolumeMode::KeepLast => self.last,
            VolumeMode::Fixed => self.fixed,
        };
        v.min(100)
    }
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeMode {
    /// Always start at 100%.
    Default,
    /// Start at whatever the volume was at last shutdown.
    #[serde(alias = "keep_last", alias = "last")]
    KeepLast,
    /// Start at the configured `fixed` value.
    #[serde(alias = "explicit")]
    Fixed,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Marker for the parent-directory row.
    pub icon_dir_up: String,
    /// Marker for the now-playing row.
    pub icon_now_playing: String,
    /// Marker for the now-playing row while selected.
    pub icon_now_playing_selected: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ attacca: straight on to the next one ~ ".to_string(),
            icon_dir_up: "/^/".to_string(),
            icon_now_playing: "!-".to_string(),
            icon_now_playing_selected: "!>".to_string(),
        }
    }
}
