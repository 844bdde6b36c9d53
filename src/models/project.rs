// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! A project ties one match video to its button bank, its clips and the
//! formation snapshots recorded from the tactical board.

use super::button::ButtonDefinition;
use super::clip::Clip;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Display names for the two sides of the match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamNames {
    pub local: String,
    pub away: String,
}

impl Default for TeamNames {
    fn default() -> Self {
        Self {
            local: "Local".to_string(),
            away: "Away".to_string(),
        }
    }
}

/// Formation saved at a match-clock position. Player data is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationSnapshot {
    pub match_clock_secs: u64,
    pub formation: String,
    #[serde(default)]
    pub players: serde_json::Value,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    /// Fields written by other tools, preserved on save.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FormationSnapshot {
    pub fn new(match_clock_secs: u64, formation: &str, notes: &str) -> Self {
        Self {
            match_clock_secs,
            formation: formation.to_string(),
            players: serde_json::Value::Array(Vec::new()),
            notes: notes.to_string(),
            captured_at: Some(Utc::now()),
            extra: serde_json::Map::new(),
        }
    }

    /// `MM:SS` of the match clock.
    pub fn clock_label(&self) -> String {
        format!(
            "{}:{:02}",
            self.match_clock_secs / 60,
            self.match_clock_secs % 60
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub name: String,
    pub video_path: PathBuf,
    pub buttons: Vec<ButtonDefinition>,
    pub clips: Vec<Clip>,
    pub formations: Vec<FormationSnapshot>,
    pub team_names: TeamNames,
    pub video_duration_ms: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    /// False when the referenced video could not be found on load.
    pub video_available: bool,
}

impl Project {
    /// Create an empty project.
    pub fn new(name: &str, buttons: Vec<ButtonDefinition>) -> Self {
        let now = Utc::now();
        Self {
            name: name.trim().to_string(),
            video_path: PathBuf::new(),
            buttons,
            clips: Vec::new(),
            formations: Vec::new(),
            team_names: TeamNames::default(),
            video_duration_ms: 0,
            created_at: now,
            modified_at: now,
            video_available: false,
        }
    }

    /// Default name offered for a new project.
    pub fn default_name(now: DateTime<Utc>) -> String {
        format!("Project_{}", now.format("%Y%m%d_%H%M"))
    }

    /// Cheap hash of everything a save would write, minus timestamps.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.name.hash(&mut hasher);
        self.video_path.hash(&mut hasher);
        self.buttons.hash(&mut hasher);
        self.clips.hash(&mut hasher);
        self.team_names.hash(&mut hasher);
        self.formations.len().hash(&mut hasher);
        for formation in &self.formations {
            formation.match_clock_secs.hash(&mut hasher);
            formation.formation.hash(&mut hasher);
            formation.notes.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// One row of the project browser.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub video_path: PathBuf,
    pub video_exists: bool,
    pub clip_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::button::default_buttons;

    fn clip() -> Clip {
        Clip {
            start_ms: 0,
            end_ms: 1_000,
            category: "SALIDA".into(),
            sequence_number: 1,
            name: "SALIDA 1".into(),
            color: "#2980b9".into(),
            tag_ids: Default::default(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_fingerprint_tracks_content_not_timestamps() {
        let mut project = Project::new("Derby", default_buttons());
        let before = project.fingerprint();

        project.modified_at = Utc::now() + chrono::Duration::hours(1);
        assert_eq!(project.fingerprint(), before);

        project.clips.push(clip());
        let with_clip = project.fingerprint();
        assert_ne!(with_clip, before);

        project.clips[0].notes = "pressing trigger".into();
        assert_ne!(project.fingerprint(), with_clip);
    }

    #[test]
    fn test_formation_snapshot_keeps_unknown_fields() {
        let json = r#"{"match_clock_secs": 754, "formation": "4-3-3",
                       "players": [], "token_size": 24}"#;
        let snapshot: FormationSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.clock_label(), "12:34");
        assert_eq!(snapshot.extra["token_size"], 24);

        let back = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(back["token_size"], 24);
    }

    #[test]
    fn test_default_name_uses_timestamp() {
        let now = DateTime::parse_from_rfc3339("2025-03-09T18:45:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(Project::default_name(now), "Project_20250309_1845");
    }
}
