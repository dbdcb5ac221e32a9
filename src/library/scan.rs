use std::path::Path;

use lofty::prelude::*;
use walkdir::WalkDir;

use super::model::{Entry, Track};

/// Extensions treated as playable audio (case-insensitive, without dot).
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "ogg", "aac", "m4a", "wma", "alac", "aiff", "opus",
];

pub(crate) fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("?")
        .to_string()
}

/// List one directory: subdirectories plus allow-listed audio files,
/// directories first, then by filename case-insensitively.
///
/// A missing or unreadable directory yields an empty listing.
pub fn list_entries(dir: &Path) -> Vec<Entry> {
    let mut entries: Vec<Entry> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter_map(|e| {
            let path = e.path().to_path_buf();
            let is_dir = e.file_type().is_dir();
            if is_dir || is_audio_file(&path) {
                Some(Entry {
                    name: entry_name(&path),
                    path,
                    is_dir,
                })
            } else {
                None
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    entries
}

/// Read one file's tag metadata, falling back to the file stem.
///
/// Tag or decode errors are not fatal here: an untagged (or even
/// unreadable) file still gets a `Track`, and playback failures surface
/// later as recoverable player errors.
pub fn read_track(path: &Path) -> Track {
    let mut title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut duration = None;

    if let Ok(tagged) = lofty::read_from_path(path) {
        duration = Some(tagged.properties().duration());

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(t) = tag.title() {
                let t = t.trim();
                if !t.is_empty() {
                    title = t.to_string();
                }
            }
        }
    }

    Track {
        path: path.to_path_buf(),
        title,
        duration,
    }
}

/// Collect the audio files that live next to `path`, sorted by filename
/// case-insensitively. This is the raw material for a queue.
///
/// A missing or unreadable parent yields an empty list.
pub fn sibling_tracks(path: &Path) -> Vec<Track> {
    let Some(parent) = path.parent() else {
        return Vec::new();
    };

    let mut tracks: Vec<Track> = WalkDir::new(parent)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| !e.file_type().is_dir() && is_audio_file(e.path()))
        .map(|e| read_track(e.path()))
        .collect();

    tracks.sort_by(|a, b| {
        a.file_name()
            .to_lowercase()
            .cmp(&b.file_name().to_lowercase())
    });
    tracks
}
