// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project persistence.
//!
//! Each project lives in its own folder under the projects root:
//!
//! ```text
//! projects/<name>/<name>.json
//! projects/<name>/captures/
//! projects/<name>/clips/
//! ```

use super::migrate::{migrate_project, CURRENT_VERSION};
use super::paths::safe_file_name;
use super::serialization::{read_value, write_document};
use crate::error::{ProjectError, ProjectResult};
use crate::models::button::{self, ButtonDefinition};
use crate::models::clip::Clip;
use crate::models::project::{FormationSnapshot, Project, ProjectSummary, TeamNames};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk shape of a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub version: u32,
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub video_path: PathBuf,
    #[serde(default)]
    pub cuts: Vec<Clip>,
    #[serde(default)]
    pub button_config: Vec<ButtonDefinition>,
    #[serde(default)]
    pub metadata: ProjectMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default)]
    pub clip_count: usize,
    #[serde(default)]
    pub video_duration_ms: u64,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub formation_snapshots: Vec<FormationSnapshot>,
    #[serde(default)]
    pub team_names: TeamNames,
    /// Copy of the button bank, used when `button_config` is missing.
    #[serde(default)]
    pub button_config: Vec<ButtonDefinition>,
}

impl ProjectDocument {
    pub fn from_project(project: &Project) -> Self {
        Self {
            version: CURRENT_VERSION,
            name: project.name.clone(),
            created_at: project.created_at,
            video_path: project.video_path.clone(),
            cuts: project.clips.clone(),
            button_config: project.buttons.clone(),
            metadata: ProjectMetadata {
                clip_count: project.clips.len(),
                video_duration_ms: project.video_duration_ms,
                modified_at: Some(project.modified_at),
                formation_snapshots: project.formations.clone(),
                team_names: project.team_names.clone(),
                button_config: project.buttons.clone(),
            },
        }
    }
}

/// Folder holding one project's document and side folders.
pub fn project_dir(projects_root: &Path, name: &str) -> PathBuf {
    projects_root.join(safe_file_name(name))
}

/// Path of a project's document file.
pub fn project_file(projects_root: &Path, name: &str) -> PathBuf {
    let safe = safe_file_name(name);
    projects_root.join(&safe).join(format!("{safe}.json"))
}

/// Write `project` and create its side folders. Returns the document path.
pub fn save_project(project: &Project, projects_root: &Path) -> ProjectResult<PathBuf> {
    if project.name.trim().is_empty() {
        return Err(ProjectError::InvalidProject {
            reason: "project name cannot be empty".into(),
        });
    }
    let folder = project_dir(projects_root, &project.name);
    for side in ["captures", "clips"] {
        std::fs::create_dir_all(folder.join(side))?;
    }

    let path = project_file(projects_root, &project.name);
    write_document(&ProjectDocument::from_project(project), &path)?;
    log::info!(
        "Saved project {} ({} clips) to {}",
        project.name,
        project.clips.len(),
        path.display()
    );
    Ok(path)
}

fn read_project_document(path: &Path) -> ProjectResult<ProjectDocument> {
    if !path.exists() {
        return Err(ProjectError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let mut value = read_value(path)?;
    migrate_project(&mut value)?;

    // Legacy documents may lack a name; fall back to the file stem.
    if let Some(obj) = value.as_object_mut() {
        if !obj.contains_key("name") {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            obj.insert("name".into(), serde_json::Value::String(stem));
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Load a project document, migrating older formats.
///
/// When the recorded video is gone, a file with the same name next to the
/// project document (or directly under `projects_root`) is used instead. If
/// neither exists the project still loads with `video_available == false`.
pub fn load_project(path: &Path, projects_root: &Path) -> ProjectResult<Project> {
    let doc = read_project_document(path)?;

    let buttons = if !doc.button_config.is_empty() {
        doc.button_config
    } else if !doc.metadata.button_config.is_empty() {
        log::info!("Project {} uses the button bank from its metadata", doc.name);
        doc.metadata.button_config
    } else {
        log::warn!("Project {} has no button bank, using defaults", doc.name);
        button::default_buttons()
    };

    let (video_path, video_available) = match resolve_video(&doc.video_path, path, projects_root) {
        Some(found) => {
            if found != doc.video_path {
                log::info!(
                    "Video {} moved, using {}",
                    doc.video_path.display(),
                    found.display()
                );
            }
            (found, true)
        }
        None => {
            if !doc.video_path.as_os_str().is_empty() {
                log::warn!("Video {} not found", doc.video_path.display());
            }
            (doc.video_path, false)
        }
    };

    log::info!("Loaded project {} from {}", doc.name, path.display());
    Ok(Project {
        name: doc.name,
        video_path,
        buttons,
        clips: doc.cuts,
        formations: doc.metadata.formation_snapshots,
        team_names: doc.metadata.team_names,
        video_duration_ms: doc.metadata.video_duration_ms,
        created_at: doc.created_at,
        modified_at: doc.metadata.modified_at.unwrap_or(doc.created_at),
        video_available,
    })
}

/// Find the video a project refers to, trying relocation candidates.
pub fn resolve_video(recorded: &Path, project_file: &Path, projects_root: &Path) -> Option<PathBuf> {
    if recorded.as_os_str().is_empty() {
        return None;
    }
    if recorded.is_file() {
        return Some(recorded.to_path_buf());
    }
    let file_name = bare_file_name(recorded)?;
    let candidates = [
        project_file.parent().map(|dir| dir.join(&file_name)),
        Some(projects_root.join(&file_name)),
    ];
    candidates.into_iter().flatten().find(|p| p.is_file())
}

/// Last path component, splitting on both separators so that paths saved on
/// another platform still resolve.
fn bare_file_name(path: &Path) -> Option<String> {
    let text = path.to_string_lossy();
    text.rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Every readable project under `projects_root`, newest first. Unreadable
/// documents are skipped.
pub fn list_projects(projects_root: &Path) -> Vec<ProjectSummary> {
    let Ok(entries) = std::fs::read_dir(projects_root) else {
        return Vec::new();
    };

    let mut summaries = Vec::new();
    for folder in entries.flatten().map(|e| e.path()).filter(|p| p.is_dir()) {
        let Ok(files) = std::fs::read_dir(&folder) else {
            continue;
        };
        for file in files.flatten().map(|e| e.path()) {
            if file.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_project_document(&file) {
                Ok(doc) => {
                    let video_exists =
                        resolve_video(&doc.video_path, &file, projects_root).is_some();
                    summaries.push(ProjectSummary {
                        name: doc.name,
                        path: file,
                        created_at: doc.created_at,
                        video_path: doc.video_path,
                        video_exists,
                        clip_count: doc.cuts.len(),
                    });
                }
                Err(e) => log::debug!("Skipping {}: {}", file.display(), e),
            }
        }
    }
    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.name.cmp(&b.name)));
    summaries
}

/// Remove a project's folder and everything in it.
pub fn delete_project(projects_root: &Path, name: &str) -> ProjectResult<()> {
    let folder = project_dir(projects_root, name);
    if !folder.is_dir() {
        return Err(ProjectError::NotFound { path: folder });
    }
    std::fs::remove_dir_all(&folder)?;
    log::info!("Deleted project {}", name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::FormationSnapshot;

    fn clip(category: &str, start_ms: u64, end_ms: u64, n: u32) -> Clip {
        Clip {
            start_ms,
            end_ms,
            category: category.into(),
            sequence_number: n,
            name: format!("{category} {n}"),
            color: "#2980b9".into(),
            tag_ids: [1].into_iter().collect(),
            notes: "press after turnover".into(),
        }
    }

    fn sample_project(video: PathBuf) -> Project {
        let mut project = Project::new("Derby", button::default_buttons());
        project.video_path = video;
        project.video_duration_ms = 5_400_000;
        project.clips = vec![
            clip("SALIDA", 5_000, 12_000, 1),
            clip("TRANSICIÓN", 60_000, 70_000, 1),
        ];
        project.formations = vec![FormationSnapshot::new(754, "4-3-3", "high line")];
        project.team_names = TeamNames {
            local: "Boca".into(),
            away: "River".into(),
        };
        project
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("projects");
        let video = dir.path().join("match.mp4");
        std::fs::write(&video, b"not really a video").unwrap();

        let project = sample_project(video.clone());
        let path = save_project(&project, &root).unwrap();
        assert_eq!(path, root.join("Derby").join("Derby.json"));
        assert!(root.join("Derby").join("captures").is_dir());
        assert!(root.join("Derby").join("clips").is_dir());

        let loaded = load_project(&path, &root).unwrap();
        assert_eq!(loaded.clips, project.clips);
        assert_eq!(loaded.buttons, project.buttons);
        assert_eq!(loaded.formations, project.formations);
        assert_eq!(loaded.team_names, project.team_names);
        assert_eq!(loaded.video_path, video);
        assert!(loaded.video_available);
        assert_eq!(loaded.fingerprint(), project.fingerprint());
    }

    #[test]
    fn test_missing_video_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("projects");
        let project = sample_project(dir.path().join("gone.mp4"));
        let path = save_project(&project, &root).unwrap();

        let loaded = load_project(&path, &root).unwrap();
        assert!(!loaded.video_available);
        assert_eq!(loaded.video_path, dir.path().join("gone.mp4"));
        assert_eq!(loaded.clips.len(), 2);
    }

    #[test]
    fn test_moved_video_is_found_next_to_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("projects");
        let project = sample_project(PathBuf::from("/old/disk/videos/final.mp4"));
        let path = save_project(&project, &root).unwrap();
        let sibling = root.join("Derby").join("final.mp4");
        std::fs::write(&sibling, b"video").unwrap();

        let loaded = load_project(&path, &root).unwrap();
        assert!(loaded.video_available);
        assert_eq!(loaded.video_path, sibling);
    }

    #[test]
    fn test_windows_paths_resolve_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        std::fs::write(root.join("final.mp4"), b"video").unwrap();
        let found = resolve_video(
            Path::new(r"C:\Users\coach\Videos\final.mp4"),
            &root.join("Derby").join("Derby.json"),
            &root,
        );
        assert_eq!(found, Some(root.join("final.mp4")));
    }

    #[test]
    fn test_legacy_project_loads() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let folder = root.join("Viejo");
        std::fs::create_dir_all(&folder).unwrap();
        let path = folder.join("Viejo.json");
        std::fs::write(
            &path,
            r##"{
                "nombre": "Viejo",
                "fecha_creacion": "2023-05-01 20:00:00",
                "video_path": "",
                "cortes": [
                    {"ini": 1000, "fin": 4000, "nom": "SALIDA", "tiempo": "00:01",
                     "nombre": "SALIDA 1", "color": "#2980b9", "categoria": "SALIDA", "numero": 1}
                ],
                "botonera_config": [
                    ["SALIDA", "#2980b9", "manual", "1", "Salida_Propia", "#3498db"]
                ],
                "metadata": {"total_clips": 1, "video_duracion": 90000}
            }"##,
        )
        .unwrap();

        let project = load_project(&path, &root).unwrap();
        assert_eq!(project.name, "Viejo");
        assert_eq!(project.clips.len(), 1);
        assert_eq!(project.clips[0].end_ms, 4_000);
        assert_eq!(project.buttons.len(), 1);
        assert_eq!(project.video_duration_ms, 90_000);
        assert!(!project.video_available);
        assert_eq!(project.modified_at, project.created_at);
    }

    #[test]
    fn test_metadata_carries_button_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("projects");
        let mut project = sample_project(PathBuf::new());
        project.buttons.truncate(3);
        let path = save_project(&project, &root).unwrap();

        let mut doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["metadata"]["button_config"], doc["button_config"]);

        // Without the top-level bank the metadata copy is used.
        doc["button_config"] = serde_json::json!([]);
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
        let loaded = load_project(&path, &root).unwrap();
        assert_eq!(loaded.buttons, project.buttons);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_project(&dir.path().join("nope.json"), dir.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_listing_skips_broken_documents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        save_project(&sample_project(PathBuf::new()), &root).unwrap();
        let mut other = sample_project(PathBuf::new());
        other.name = "Cup Final".into();
        save_project(&other, &root).unwrap();

        let broken = root.join("Broken");
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(broken.join("Broken.json"), "{ nope").unwrap();

        let summaries = list_projects(&root);
        let mut names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
        names.sort();
        assert_eq!(names, ["Cup Final", "Derby"]);
        assert!(summaries.iter().all(|s| s.clip_count == 2 && !s.video_exists));
        assert!(root.join("Cup_Final").join("Cup_Final.json").is_file());
    }

    #[test]
    fn test_delete_removes_folder() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        save_project(&sample_project(PathBuf::new()), &root).unwrap();
        delete_project(&root, "Derby").unwrap();
        assert!(!root.join("Derby").exists());
        assert!(matches!(
            delete_project(&root, "Derby"),
            Err(ProjectError::NotFound { .. })
        ));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = sample_project(PathBuf::new());
        project.name = "  ".into();
        assert!(matches!(
            save_project(&project, dir.path()),
            Err(ProjectError::InvalidProject { .. })
        ));
    }
}
