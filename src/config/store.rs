use std::fs;
use std::io;

use super::load::resolve_config_path;
use super::schema::Settings;

impl Settings {
    /// Serialize the settings back to the config path, creating parent
    /// directories as needed. Called once at shutdown so playback
    /// toggles and last volume persist across sessions.
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = resolve_config_path() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no config path could be resolved",
            ));
        };

        let rendered = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, rendered)
    }
}
