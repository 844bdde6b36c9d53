// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application settings (`settings.yaml` under the data root).

use super::serialization::{read_document, write_document};
use crate::models::button::DEFAULT_AUTO_DURATION_MS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Media processing executable used for trims, overlays and concatenation.
    pub media_tool: PathBuf,
    /// Probe executable used to read the video duration.
    pub probe_tool: PathBuf,
    pub autosave_interval_secs: u64,
    pub seek_step_ms: u64,
    pub frame_step_ms: u64,
    pub default_auto_duration_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            media_tool: PathBuf::from("ffmpeg"),
            probe_tool: PathBuf::from("ffprobe"),
            autosave_interval_secs: 300,
            seek_step_ms: 5_000,
            frame_step_ms: 40,
            default_auto_duration_ms: DEFAULT_AUTO_DURATION_MS,
        }
    }
}

impl Settings {
    /// Load settings, writing the defaults out when the file is missing.
    /// An unreadable file falls back to defaults without being overwritten.
    pub fn load_or_init(path: &Path) -> Self {
        if !path.exists() {
            let settings = Settings::default();
            if let Err(e) = write_document(&settings, path) {
                log::warn!("Could not write default settings to {}: {}", path.display(), e);
            }
            return settings;
        }
        match read_document(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Settings::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        let settings = Settings::load_or_init(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "media_tool: /opt/ffmpeg/bin/ffmpeg\nseek_step_ms: 10000\n").unwrap();
        let settings = Settings::load_or_init(&path);
        assert_eq!(settings.media_tool, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(settings.seek_step_ms, 10_000);
        assert_eq!(settings.autosave_interval_secs, 300);
    }

    #[test]
    fn test_garbage_falls_back_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "seek_step_ms: [oops").unwrap();
        assert_eq!(Settings::load_or_init(&path), Settings::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "seek_step_ms: [oops");
    }
}
