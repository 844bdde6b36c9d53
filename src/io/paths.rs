// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Filesystem layout under the application data root.

use std::path::{Path, PathBuf};

const ROOT_DIR_NAME: &str = "MatchCut";

/// Resolved folders and files. Constructed once at startup and passed to
/// whatever needs to read or write under the data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform default: Desktop on macOS, Documents on Windows, home elsewhere.
    pub fn platform_default() -> Self {
        let base = if cfg!(target_os = "macos") {
            dirs::desktop_dir()
        } else if cfg!(target_os = "windows") {
            dirs::document_dir()
        } else {
            None
        };
        let base = base
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(ROOT_DIR_NAME))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.root.join("screenshots")
    }

    pub fn clips_dir(&self) -> PathBuf {
        self.root.join("clips")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("exports")
    }

    pub fn database_dir(&self) -> PathBuf {
        self.root.join("database")
    }

    /// Export temporaries; emptied by each job as it finishes.
    pub fn temp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.yaml")
    }

    pub fn button_config_file(&self) -> PathBuf {
        self.root.join("button_config.json")
    }

    pub fn tags_file(&self) -> PathBuf {
        self.database_dir().join("tags.json")
    }

    pub fn teams_file(&self) -> PathBuf {
        self.database_dir().join("teams.json")
    }

    /// Output folder for one category's single-clip renders.
    pub fn category_clips_dir(&self, output_folder: &str) -> PathBuf {
        self.clips_dir().join(output_folder)
    }

    /// Create every folder of the layout. Safe to call repeatedly.
    pub fn ensure_layout(&self) -> std::io::Result<()> {
        for dir in [
            self.projects_dir(),
            self.screenshots_dir(),
            self.clips_dir(),
            self.exports_dir(),
            self.database_dir(),
            self.temp_dir(),
        ] {
            std::fs::create_dir_all(&dir)?;
        }
        log::debug!("Data folders ready under {}", self.root.display());
        Ok(())
    }
}

/// Make a user-supplied name safe to use as a file or folder name.
pub fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}
