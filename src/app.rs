// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! The app owns the clip registry, the playback clock and the open project,
//! forwards user intent from the UI panels to them, and polls background
//! render/export workers once per frame.

use crate::error::CutError;
use crate::io::autosave::AutoSaver;
use crate::io::config;
use crate::io::export::{self, ExportEvent, ExportJob};
use crate::io::media::{MediaTool, ProcessRunner, ToolRunner};
use crate::io::paths::{safe_file_name, AppPaths};
use crate::io::project::{delete_project, list_projects, load_project, save_project};
use crate::io::serialization::write_document;
use crate::io::settings::Settings;
use crate::models::button::ButtonDefinition;
use crate::models::clip::Clip;
use crate::models::playback::PlaybackClock;
use crate::models::project::{Project, TeamNames};
use crate::models::registry::{ClipRegistry, CutOutcome};
use crate::models::tag::TagCatalog;
use crate::ui::clip_panel::{self, ClipAction, ClipPanelState};
use crate::ui::config_editor::ConfigEditor;
use crate::ui::dialogs::{
    self, BrowserAction, CatalogForm, ClipEditor, ConfirmChoice, ExportOptions, FormationAction,
    FormationForm, NamePrompt, Notices, PendingAction, ProjectBrowser,
};
use crate::ui::playlist::{Playlist, PlaylistRequest};
use crate::ui::timeline::{self, TimelineView};
use crate::ui::toolbar::{self, TransportAction};
use crate::ui::{button_bank, video_view};
use crate::util::time::format_time;
use anyhow::{ensure, Context as _};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "m4v", "mts", "wmv"];
const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];
const JSON_EXTENSIONS: &[&str] = &["json"];

/// Half period of the armed-button blink.
const BLINK_MS: u128 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobKind {
    Render,
    Export,
    Screenshot,
}

/// A background worker and its last reported progress.
struct Job {
    kind: JobKind,
    label: String,
    progress: u8,
    receiver: Receiver<ExportEvent>,
}

/// Which auxiliary windows are open.
#[derive(Debug, Default)]
struct Windows {
    config: bool,
    playlist: bool,
    export: bool,
    catalogs: bool,
    formations: bool,
    browser: bool,
    save_as: bool,
    clip_editor: bool,
}

/// Map a key to the character a button hotkey would use.
pub fn hotkey_char(key: egui::Key) -> Option<char> {
    let mut chars = key.name().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

/// Main application state.
pub struct AnalyzerApp {
    paths: AppPaths,
    settings: Settings,
    tool: MediaTool,
    runner: Arc<dyn ToolRunner>,

    project: Project,
    /// Where the project was last saved; autosave is off until it is set.
    project_path: Option<PathBuf>,
    registry: ClipRegistry,
    tags: TagCatalog,
    teams: TeamNames,
    clock: PlaybackClock,
    autosaver: AutoSaver,

    timeline: TimelineView,
    clip_panel: ClipPanelState,
    playlist: Playlist,
    windows: Windows,
    config_editor: Option<ConfigEditor>,
    export_options: ExportOptions,
    browser: ProjectBrowser,
    save_as: NamePrompt,
    clip_editor: Option<ClipEditor>,
    formation_form: FormationForm,
    catalog_form: CatalogForm,
    notices: Notices,
    pending: Option<PendingAction>,
    goto_text: String,

    jobs: Vec<Job>,
    probe: Option<Receiver<Result<u64, String>>>,
    status: String,
    started: Instant,
}

impl AnalyzerApp {
    /// Create the application with catalogs and buttons loaded from `paths`.
    pub fn new(paths: AppPaths, settings: Settings) -> Self {
        let buttons = config::load_buttons(&paths.button_config_file());
        let tags = config::load_tags(&paths.tags_file());
        let teams = config::load_teams(&paths.teams_file());
        let tool = MediaTool::new(settings.media_tool.clone(), settings.probe_tool.clone());
        let now = Instant::now();

        let mut project = Project::new(&Project::default_name(Utc::now()), buttons.clone());
        project.team_names = teams.clone();
        log::info!("Started with {} buttons and {} tags", buttons.len(), tags.tags().len());

        Self {
            autosaver: AutoSaver::new(settings.autosave_interval_secs, now),
            paths,
            settings,
            tool,
            runner: Arc::new(ProcessRunner),
            save_as: NamePrompt::new(project.name.clone()),
            project,
            project_path: None,
            registry: ClipRegistry::new(buttons),
            tags,
            teams,
            clock: PlaybackClock::default(),
            timeline: TimelineView::default(),
            clip_panel: ClipPanelState::default(),
            playlist: Playlist::default(),
            windows: Windows::default(),
            config_editor: None,
            export_options: ExportOptions::default(),
            browser: ProjectBrowser::default(),
            clip_editor: None,
            formation_form: FormationForm::default(),
            catalog_form: CatalogForm::default(),
            notices: Notices::default(),
            pending: None,
            goto_text: String::new(),
            jobs: Vec::new(),
            probe: None,
            status: "Open a video to start cutting".into(),
            started: now,
        }
    }

    // ------------------------------------------------------------ project

    /// Copy the live registry and catalogs into the project record.
    fn sync_project(&mut self) {
        self.project.buttons = self.registry.buttons();
        self.project.clips = self.registry.all_clips();
        self.project.team_names = self.teams.clone();
        if self.clock.duration_ms() > 0 {
            self.project.video_duration_ms = self.clock.duration_ms();
        }
    }

    /// Drop every clip and pending cut. The playlist keeps its own copies.
    fn clear_clips(&mut self) {
        let count = self.registry.total_clips();
        self.registry.clear();
        self.close_clip_editor();
        self.autosaver.mark_dirty();
        log::info!("Cleared {} clips", count);
        self.status = format!("Cleared {count} clips");
    }

    fn save_current(&mut self) -> bool {
        self.sync_project();
        self.project.modified_at = Utc::now();
        match save_project(&self.project, &self.paths.projects_dir()) {
            Ok(path) => {
                self.autosaver.mark_saved(Instant::now(), self.project.fingerprint());
                self.status = format!("Saved {}", path.display());
                self.project_path = Some(path);
                true
            }
            Err(e) => {
                log::error!("Saving {} failed: {}", self.project.name, e);
                self.notices.error("Save failed", e.to_string());
                false
            }
        }
    }

    fn autosave(&mut self, now: Instant) {
        if self.project_path.is_none() || !self.autosaver.is_due(now) {
            return;
        }
        self.sync_project();
        let fingerprint = self.project.fingerprint();
        if !self.autosaver.poll(now, || fingerprint) {
            return;
        }
        self.project.modified_at = Utc::now();
        match save_project(&self.project, &self.paths.projects_dir()) {
            Ok(path) => {
                log::info!("Autosaved {}", path.display());
                self.autosaver.mark_saved(now, fingerprint);
                self.status = format!("Autosaved {}", self.project.name);
            }
            Err(e) => {
                log::warn!("Autosave failed: {}", e);
                self.autosaver.defer(now);
            }
        }
    }

    /// Run `action` now, or ask about unsaved changes first.
    fn request(&mut self, action: PendingAction) {
        if self.autosaver.is_dirty() {
            self.pending = Some(action);
        } else {
            self.perform(action);
        }
    }

    fn perform(&mut self, action: PendingAction) {
        match action {
            PendingAction::NewProject => self.new_project(),
            PendingAction::OpenProject(path) => self.open_project(&path),
        }
    }

    fn resolve_pending(&mut self, choice: ConfirmChoice) {
        let Some(action) = self.pending.take() else {
            return;
        };
        match choice {
            ConfirmChoice::Save => {
                if self.save_current() {
                    self.perform(action);
                }
            }
            ConfirmChoice::Discard => self.perform(action),
            ConfirmChoice::Cancel => {}
        }
    }

    fn reset_session(&mut self) {
        self.project_path = None;
        self.clock = PlaybackClock::default();
        self.playlist = Playlist::default();
        self.close_clip_editor();
        self.probe = None;
        self.autosaver = AutoSaver::new(self.settings.autosave_interval_secs, Instant::now());
    }

    fn new_project(&mut self) {
        let buttons = self.registry.buttons();
        self.reset_session();
        self.project = Project::new(&Project::default_name(Utc::now()), buttons.clone());
        self.project.team_names = self.teams.clone();
        self.registry = ClipRegistry::new(buttons);
        self.status = format!("New project {}", self.project.name);
        log::info!("Started new project {}", self.project.name);
    }

    fn open_project(&mut self, path: &Path) {
        let project = match load_project(path, &self.paths.projects_dir()) {
            Ok(project) => project,
            Err(e) => {
                log::error!("Opening {} failed: {}", path.display(), e);
                self.notices.error("Could not open project", e.to_string());
                return;
            }
        };

        self.reset_session();
        let mut registry = ClipRegistry::new(project.buttons.clone());
        let dropped = registry.restore(project.clips.clone());
        if dropped > 0 {
            self.notices.warn(
                "Some clips were skipped",
                format!("{dropped} clips had an empty time range or belong to buttons that no longer exist."),
            );
        }
        if project.team_names != TeamNames::default() {
            self.teams = project.team_names.clone();
        }
        self.clock.load(project.video_duration_ms);
        if project.video_available {
            self.start_probe(project.video_path.clone());
        } else if !project.video_path.as_os_str().is_empty() {
            self.notices.warn(
                "Video not found",
                format!(
                    "{} could not be found. Use File > Open video to relink it.",
                    project.video_path.display()
                ),
            );
        }

        self.registry = registry;
        self.project = project;
        self.project_path = Some(path.to_path_buf());
        self.save_as = NamePrompt::new(self.project.name.clone());
        self.sync_project();
        self.autosaver.mark_saved(Instant::now(), self.project.fingerprint());
        self.status = format!(
            "Opened {} ({} clips)",
            self.project.name,
            self.registry.total_clips()
        );
    }

    fn open_browser(&mut self) {
        self.browser = ProjectBrowser::new(list_projects(&self.paths.projects_dir()));
        self.windows.browser = true;
    }

    fn delete_project(&mut self, name: &str) {
        match delete_project(&self.paths.projects_dir(), name) {
            Ok(()) => {
                if name == self.project.name {
                    self.project_path = None;
                }
                self.status = format!("Deleted project {name}");
            }
            Err(e) => self.notices.error("Could not delete project", e.to_string()),
        }
        self.browser = ProjectBrowser::new(list_projects(&self.paths.projects_dir()));
    }

    fn export_clip_list(&mut self, path: PathBuf) {
        match write_document(&self.registry.all_clips(), &path) {
            Ok(()) => {
                log::info!("Exported clip list to {}", path.display());
                self.status = format!("Clip list written to {}", path.display());
            }
            Err(e) => {
                log::error!("Failed to export clip list: {}", e);
                self.notices.error("Clip list export failed", e.to_string());
            }
        }
    }

    // -------------------------------------------------------------- video

    fn set_video(&mut self, path: PathBuf) {
        log::info!("Opened video {}", path.display());
        self.project.video_available = path.is_file();
        self.project.video_path = path.clone();
        self.clock.set_duration(self.project.video_duration_ms);
        self.start_probe(path);
        self.autosaver.mark_dirty();
    }

    fn start_probe(&mut self, video: PathBuf) {
        self.probe = Some(export::spawn_probe(video, self.tool.clone(), Arc::clone(&self.runner)));
    }

    fn pick_video(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Video", VIDEO_EXTENSIONS)
            .pick_file()
        {
            self.set_video(path);
        }
    }

    /// The project's video, if it can be handed to the media tool.
    fn require_video(&self) -> anyhow::Result<PathBuf> {
        ensure!(
            !self.project.video_path.as_os_str().is_empty(),
            "No video is loaded"
        );
        ensure!(
            self.project.video_available,
            "Video file {} is missing",
            self.project.video_path.display()
        );
        Ok(self.project.video_path.clone())
    }

    fn poll_probe(&mut self) {
        let Some(receiver) = &self.probe else {
            return;
        };
        let result = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err("probe worker stopped".into()),
        };
        self.probe = None;
        match result {
            Ok(duration_ms) => {
                log::info!("Video duration {} ms", duration_ms);
                self.clock.set_duration(duration_ms);
                if self.project.video_duration_ms != duration_ms {
                    self.project.video_duration_ms = duration_ms;
                    self.autosaver.mark_dirty();
                }
                self.status = format!("Video ready, {}", format_time(duration_ms));
            }
            Err(e) => {
                log::warn!("Could not probe video duration: {}", e);
                self.notices.warn("Could not read the video duration", e);
            }
        }
    }

    // --------------------------------------------------------------- cuts

    fn press_button(&mut self, category: &str) {
        let result = self.registry.press(category, self.clock.position_ms());
        self.apply_cut(result);
    }

    fn apply_cut(&mut self, result: Result<CutOutcome, CutError>) {
        match result {
            Ok(CutOutcome::Armed { category, start_ms }) => {
                self.status = format!(
                    "{category} recording from {}",
                    format_time(start_ms)
                );
            }
            Ok(CutOutcome::Created(clip)) => {
                log::info!("Created {} [{} - {}]", clip.name, clip.start_ms, clip.end_ms);
                self.status = format!("Created {}", clip.list_label());
                self.autosaver.mark_dirty();
                if self.project.video_available {
                    self.render_in_background(clip);
                }
            }
            Err(e) => {
                self.status = e.to_string();
                self.notices.warn("Cut not recorded", e.to_string());
            }
        }
    }

    fn render_in_background(&mut self, clip: Clip) {
        let video = match self.require_video() {
            Ok(video) => video,
            Err(e) => {
                self.notices.warn("Cannot render clip", format!("{e:#}"));
                return;
            }
        };
        let folder = match self.registry.button(&clip.category) {
            Some(button) => self.paths.category_clips_dir(&button.output_folder),
            None => self.paths.clips_dir(),
        };
        let label = format!("Render {}", clip.name);
        let receiver = export::spawn_render(video, clip, folder, self.tool.clone(), Arc::clone(&self.runner));
        self.push_job(JobKind::Render, label, receiver);
    }

    fn clip_at(&self, category: &str, index: usize) -> Option<Clip> {
        self.registry.clips(category).get(index).cloned()
    }

    fn handle_clip_action(&mut self, action: ClipAction) {
        match action {
            ClipAction::Jump { category, index } => {
                if let Some(clip) = self.clip_at(&category, index) {
                    self.clock.seek(clip.start_ms);
                    self.clock.play();
                }
            }
            ClipAction::Render { category, index } => {
                if let Some(clip) = self.clip_at(&category, index) {
                    self.render_in_background(clip);
                }
            }
            ClipAction::Edit { category, index } => {
                if let Some(clip) = self.clip_at(&category, index) {
                    self.clip_editor = Some(ClipEditor::new(&clip));
                    self.windows.clip_editor = true;
                }
            }
            ClipAction::AddToPlaylist { category, index } => {
                if let Some(clip) = self.clip_at(&category, index) {
                    let name = clip.name.clone();
                    if self.playlist.add(clip) {
                        self.status = format!("{name} added to the playlist");
                    }
                    self.windows.playlist = true;
                }
            }
            ClipAction::Delete { category, index } => match self.registry.remove(&category, index) {
                Ok(clip) => {
                    let editing = self
                        .clip_editor
                        .as_ref()
                        .is_some_and(|e| e.category == clip.category && e.sequence_number == clip.sequence_number);
                    if editing {
                        self.close_clip_editor();
                    }
                    self.status = format!("Deleted {}", clip.name);
                    self.autosaver.mark_dirty();
                }
                Err(e) => self.notices.error("Could not delete clip", e.to_string()),
            },
        }
    }

    /// A timeline click jumps there and resumes playback.
    fn seek_from_timeline(&mut self, position_ms: u64) {
        self.clock.seek(position_ms);
        self.clock.play();
    }

    fn close_clip_editor(&mut self) {
        self.clip_editor = None;
        self.windows.clip_editor = false;
    }

    fn apply_clip_edit(&mut self, edit: ClipEditor) {
        let result = self.registry.update_clip(
            &edit.category,
            edit.sequence_number,
            &edit.name,
            &edit.notes,
            edit.tag_ids,
        );
        match result {
            Ok(()) => self.autosaver.mark_dirty(),
            Err(e) => self.notices.error("Could not update clip", e.to_string()),
        }
    }

    fn apply_buttons(&mut self, buttons: Vec<ButtonDefinition>) {
        if let Err(e) = config::save_buttons(&self.paths.button_config_file(), &buttons) {
            log::error!("Saving button configuration failed: {}", e);
            self.notices.error("Could not save the button configuration", e.to_string());
        }
        self.close_clip_editor();
        let dropped = self.registry.reconfigure(buttons);
        if dropped > 0 {
            self.notices.warn(
                "Clips removed",
                format!("{dropped} clips belonged to removed buttons and were dropped."),
            );
        }
        self.autosaver.mark_dirty();
        self.status = "Button configuration applied".into();
    }

    // ----------------------------------------------------- workers

    fn push_job(&mut self, kind: JobKind, label: String, receiver: Receiver<ExportEvent>) {
        log::info!("Started {}", label);
        self.jobs.push(Job {
            kind,
            label,
            progress: 0,
            receiver,
        });
    }

    fn start_export(&mut self, options: ExportOptions) {
        let video = match self.require_video() {
            Ok(video) => video,
            Err(e) => {
                self.notices.warn("Cannot export", format!("{e:#}"));
                return;
            }
        };
        let output = self.paths.exports_dir().join(options.file_name());
        let mut job = ExportJob::new(&video, self.registry.all_clips(), output, self.paths.temp_dir());
        job.codec = options.codec;
        job.overlay = options.overlay;
        let label = format!("Export {}", options.file_name());
        let receiver = export::spawn_export(job, self.tool.clone(), Arc::clone(&self.runner));
        self.push_job(JobKind::Export, label, receiver);
        self.windows.export = false;
    }

    fn start_playlist(&mut self, request: PlaylistRequest) {
        let video = match self.require_video() {
            Ok(video) => video,
            Err(e) => {
                self.notices.warn("Cannot render playlist", format!("{e:#}"));
                return;
            }
        };
        let file_name = format!("{}.mp4", safe_file_name(&request.name));
        let output = self.paths.clips_dir().join(&file_name);
        let mut job = ExportJob::new(&video, request.clips, output, self.paths.temp_dir());
        job.overlay = request.overlay;
        let receiver = export::spawn_export(job, self.tool.clone(), Arc::clone(&self.runner));
        self.push_job(JobKind::Export, format!("Playlist {file_name}"), receiver);
    }

    fn capture_screenshot(&mut self) {
        let started = self.require_video().context("Cannot take a screenshot").map(|video| {
            export::spawn_capture(
                video,
                self.clock.position_ms(),
                self.paths.screenshots_dir(),
                self.tool.clone(),
                Arc::clone(&self.runner),
            )
        });
        match started {
            Ok(receiver) => {
                let label = format!("Screenshot at {}", format_time(self.clock.position_ms()));
                self.push_job(JobKind::Screenshot, label, receiver);
            }
            Err(e) => self.notices.warn("Screenshot", format!("{e:#}")),
        }
    }

    fn poll_jobs(&mut self) {
        let mut outcomes = Vec::new();
        self.jobs.retain_mut(|job| loop {
            match job.receiver.try_recv() {
                Ok(ExportEvent::Progress(p)) => job.progress = p,
                Ok(ExportEvent::Finished(path)) => {
                    outcomes.push((job.kind, job.label.clone(), Ok(path)));
                    break false;
                }
                Ok(ExportEvent::Failed(message)) => {
                    outcomes.push((job.kind, job.label.clone(), Err(message)));
                    break false;
                }
                Err(TryRecvError::Empty) => break true,
                Err(TryRecvError::Disconnected) => {
                    outcomes.push((job.kind, job.label.clone(), Err("worker stopped unexpectedly".into())));
                    break false;
                }
            }
        });

        for (kind, label, outcome) in outcomes {
            match (kind, outcome) {
                (JobKind::Export, Ok(path)) => {
                    self.notices.info("Export finished", format!("{}", path.display()));
                    self.status = format!("{label} finished");
                }
                (_, Ok(path)) => self.status = format!("{label}: {}", path.display()),
                (_, Err(message)) => self.notices.error(format!("{label} failed"), message),
            }
        }
    }

    // ----------------------------------------------------------- input

    fn apply_transport(&mut self, action: TransportAction) {
        match action {
            TransportAction::TogglePlay => self.clock.toggle(),
            TransportAction::Seek(delta) | TransportAction::Step(delta) => self.clock.step(delta),
            TransportAction::Slower => self.clock.slower(),
            TransportAction::Faster => self.clock.faster(),
            TransportAction::GoTo(ms) => self.clock.seek(ms),
            TransportAction::Screenshot => self.capture_screenshot(),
            TransportAction::MarkStart => {
                let result = self.registry.mark_start(self.clock.position_ms());
                self.apply_cut(result);
            }
            TransportAction::MarkEnd => {
                let result = self.registry.mark_end(self.clock.position_ms());
                self.apply_cut(result);
            }
        }
    }

    fn handle_hotkeys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || self.pending.is_some() {
            return;
        }
        let events = ctx.input(|i| i.events.clone());
        let seek = self.settings.seek_step_ms as i64;
        let frame = self.settings.frame_step_ms as i64;

        for event in events {
            let egui::Event::Key {
                key,
                pressed: true,
                repeat,
                modifiers,
                ..
            } = event
            else {
                continue;
            };

            if modifiers.command {
                match key {
                    egui::Key::S if !repeat => {
                        self.save_current();
                    }
                    egui::Key::T if !repeat => self.windows.formations = true,
                    _ => {}
                }
                continue;
            }

            // Button hotkeys take precedence over the fixed letter keys.
            let button = hotkey_char(key)
                .and_then(|c| self.registry.button_for_hotkey(c))
                .map(|b| b.name.clone());
            if let Some(category) = button {
                if !repeat {
                    self.press_button(&category);
                }
                continue;
            }

            let action = match key {
                egui::Key::Space if !repeat => Some(TransportAction::TogglePlay),
                egui::Key::ArrowLeft => Some(TransportAction::Seek(-seek)),
                egui::Key::ArrowRight => Some(TransportAction::Seek(seek)),
                egui::Key::Comma => Some(TransportAction::Step(-frame)),
                egui::Key::Period => Some(TransportAction::Step(frame)),
                egui::Key::ArrowUp if !repeat => Some(TransportAction::Faster),
                egui::Key::ArrowDown if !repeat => Some(TransportAction::Slower),
                egui::Key::OpenBracket if !repeat => Some(TransportAction::MarkStart),
                egui::Key::CloseBracket if !repeat => Some(TransportAction::MarkEnd),
                egui::Key::V if !repeat => {
                    self.clock.cycle_speed();
                    None
                }
                _ => None,
            };
            if let Some(action) = action {
                self.apply_transport(action);
            }
        }
    }

    // ----------------------------------------------------------- panels

    fn menu_bar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("New project").clicked() {
                    self.request(PendingAction::NewProject);
                    ui.close_menu();
                }
                if ui.button("Open project...").clicked() {
                    self.open_browser();
                    ui.close_menu();
                }
                if ui.button("Save (Ctrl+S)").clicked() {
                    self.save_current();
                    ui.close_menu();
                }
                if ui.button("Save as...").clicked() {
                    self.save_as = NamePrompt::new(self.project.name.clone());
                    self.windows.save_as = true;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Open video...").clicked() {
                    ui.close_menu();
                    self.pick_video();
                }
                ui.menu_button("Export clip list", |ui| {
                    let stem = safe_file_name(&self.project.name);
                    for (label, filter, extensions) in [
                        ("As YAML...", "YAML", YAML_EXTENSIONS),
                        ("As JSON...", "JSON", JSON_EXTENSIONS),
                    ] {
                        if ui.button(label).clicked() {
                            ui.close_menu();
                            if let Some(path) = rfd::FileDialog::new()
                                .add_filter(filter, extensions)
                                .set_file_name(format!("{stem}_clips.{}", extensions[0]))
                                .save_file()
                            {
                                self.export_clip_list(path);
                            }
                        }
                    }
                });
                ui.separator();
                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Tools", |ui| {
                if ui.button("Button configuration...").clicked() {
                    self.config_editor = Some(
                        ConfigEditor::new(self.registry.buttons())
                            .with_auto_default(self.settings.default_auto_duration_ms),
                    );
                    self.windows.config = true;
                    ui.close_menu();
                }
                if ui.button("Playlist...").clicked() {
                    self.windows.playlist = true;
                    ui.close_menu();
                }
                if ui.button("Export project...").clicked() {
                    self.export_options = ExportOptions::default();
                    self.windows.export = true;
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Tags and teams...").clicked() {
                    self.windows.catalogs = true;
                    ui.close_menu();
                }
                if ui.button("Formations (Ctrl+T)...").clicked() {
                    self.windows.formations = true;
                    ui.close_menu();
                }
                ui.separator();
                let mut autosave = self.autosaver.is_enabled();
                let can_autosave = self.settings.autosave_interval_secs > 0;
                if ui
                    .add_enabled(can_autosave, egui::Checkbox::new(&mut autosave, "Autosave"))
                    .changed()
                {
                    self.autosaver.set_enabled(autosave);
                }
                let has_clips = self.registry.total_clips() > 0;
                if ui.add_enabled(has_clips, egui::Button::new("Clear all clips")).clicked() {
                    self.clear_clips();
                    ui.close_menu();
                }
            });

            ui.menu_button("Statistics", |ui| {
                for (category, count) in self.registry.stats() {
                    ui.label(format!("{category}: {count}"));
                }
                ui.separator();
                ui.label(egui::RichText::new(format!("Total: {}", self.registry.total_clips())).strong());
            });
        });
    }

    fn status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let dirty = if self.autosaver.is_dirty() { "● " } else { "" };
            ui.label(egui::RichText::new(format!("{dirty}{}", self.project.name)).strong());
            ui.separator();
            ui.label(&self.status);
            for job in &self.jobs {
                ui.separator();
                ui.label(&job.label);
                ui.add(
                    egui::ProgressBar::new(f32::from(job.progress) / 100.0)
                        .desired_width(120.0)
                        .show_percentage(),
                );
            }
        });
    }

    fn show_windows(&mut self, ctx: &egui::Context) {
        if let Some(editor) = self.config_editor.as_mut() {
            if let Some(buttons) = editor.show(ctx, &mut self.windows.config, &self.tags) {
                self.apply_buttons(buttons);
            }
            if !self.windows.config {
                self.config_editor = None;
            }
        }

        if let Some(request) = self.playlist.show(ctx, &mut self.windows.playlist, &self.tags, &self.registry) {
            self.start_playlist(request);
        }

        if let Some(options) = self
            .export_options
            .show(ctx, &mut self.windows.export, self.registry.total_clips())
        {
            self.start_export(options);
        }

        let changes = self
            .catalog_form
            .show(ctx, &mut self.windows.catalogs, &mut self.tags, &mut self.teams);
        if changes.tags {
            if let Err(e) = config::save_tags(&self.paths.tags_file(), &self.tags) {
                log::error!("Saving tags failed: {}", e);
                self.notices.error("Could not save tags", e.to_string());
            }
        }
        if changes.teams {
            if let Err(e) = config::save_teams(&self.paths.teams_file(), &self.teams) {
                log::error!("Saving team names failed: {}", e);
                self.notices.error("Could not save team names", e.to_string());
            }
            self.autosaver.mark_dirty();
        }

        let formation = self.formation_form.show(
            ctx,
            &mut self.windows.formations,
            &self.project.formations,
            self.clock.position_ms(),
        );
        match formation {
            Some(FormationAction::Add(snapshot)) => {
                log::info!("Saved formation {} at {}'", snapshot.formation, snapshot.clock_label());
                self.project.formations.push(snapshot);
                self.autosaver.mark_dirty();
            }
            Some(FormationAction::Delete(index)) if index < self.project.formations.len() => {
                self.project.formations.remove(index);
                self.autosaver.mark_dirty();
            }
            _ => {}
        }

        match self.browser.show(ctx, &mut self.windows.browser) {
            Some(BrowserAction::Open(path)) => {
                self.windows.browser = false;
                self.request(PendingAction::OpenProject(path));
            }
            Some(BrowserAction::Delete(name)) => self.delete_project(&name),
            None => {}
        }

        if let Some(name) = self.save_as.show(ctx, "Save project as", &mut self.windows.save_as) {
            self.project.name = name;
            self.save_current();
        }

        if let Some(editor) = self.clip_editor.as_mut() {
            if let Some(edit) = editor.show(ctx, &mut self.windows.clip_editor, &self.tags) {
                self.apply_clip_edit(edit);
            }
            if !self.windows.clip_editor {
                self.clip_editor = None;
            }
        }

        if self.pending.is_some() {
            if let Some(choice) = dialogs::show_unsaved_prompt(ctx) {
                self.resolve_pending(choice);
            }
        }
        self.notices.show(ctx);
    }
}

impl eframe::App for AnalyzerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.clock.tick(now);
        self.poll_probe();
        self.poll_jobs();
        self.handle_hotkeys(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_bar(ui));

        let transport = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    &self.clock,
                    self.settings.seek_step_ms,
                    self.settings.frame_step_ms,
                    &mut self.goto_text,
                    &mut self.timeline,
                )
            })
            .inner;
        if let Some(action) = transport {
            self.apply_transport(action);
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.status_bar(ui));

        let blink_on = (now.duration_since(self.started).as_millis() / BLINK_MS) % 2 == 0;
        let pressed = egui::TopBottomPanel::bottom("button_bank")
            .show(ctx, |ui| button_bank::show(ui, &self.registry, &self.teams, blink_on))
            .inner;
        if let Some(category) = pressed {
            self.press_button(&category);
        }

        let marks = self.registry.marks();
        let seek = egui::TopBottomPanel::bottom("timeline")
            .resizable(false)
            .show(ctx, |ui| {
                timeline::show(
                    ui,
                    &self.timeline,
                    self.clock.duration_ms(),
                    self.clock.position_ms(),
                    self.clock.is_playing(),
                    self.registry.segments(),
                    &marks,
                )
            })
            .inner;
        if let Some(position_ms) = seek {
            self.seek_from_timeline(position_ms);
        }

        let clip_action = egui::SidePanel::right("clips")
            .default_width(300.0)
            .show(ctx, |ui| {
                clip_panel::show(ui, &mut self.clip_panel, &self.registry, &self.tags, &self.teams)
            })
            .inner;
        if let Some(action) = clip_action {
            self.handle_clip_action(action);
        }

        let pick = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let video = (!self.project.video_path.as_os_str().is_empty())
                    .then_some(self.project.video_path.as_path());
                video_view::show(ui, video, self.project.video_available, &self.clock)
            })
            .inner;
        if pick {
            self.pick_video();
        }

        self.show_windows(ctx);
        self.autosave(now);

        if ctx.input(|i| i.viewport().close_requested())
            && self.autosaver.is_dirty()
            && self.project_path.is_some()
        {
            self.save_current();
        }

        let busy = self.clock.is_playing() || !self.jobs.is_empty() || self.probe.is_some() || !marks.is_empty();
        ctx.request_repaint_after(if busy {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(500)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app() -> (TempDir, AnalyzerApp) {
        let dir = TempDir::new().unwrap();
        let app = AnalyzerApp::new(AppPaths::new(dir.path()), Settings::default());
        (dir, app)
    }

    #[test]
    fn test_timeline_click_seeks_and_resumes() {
        let (_dir, mut app) = app();
        app.clock.load(90_000);
        assert!(!app.clock.is_playing());

        app.seek_from_timeline(30_000);
        assert_eq!(app.clock.position_ms(), 30_000);
        assert!(app.clock.is_playing());
    }

    #[test]
    fn test_deleting_the_edited_clip_closes_the_editor() {
        let (_dir, mut app) = app();
        for position in [20_000, 40_000] {
            app.registry.press("TRANSICIÓN", position).unwrap();
        }
        let edit = |index| ClipAction::Edit {
            category: "TRANSICIÓN".into(),
            index,
        };
        let delete = |index| ClipAction::Delete {
            category: "TRANSICIÓN".into(),
            index,
        };

        // Removing an earlier clip leaves the editor on its own clip.
        app.handle_clip_action(edit(1));
        app.handle_clip_action(delete(0));
        let mut editor = app.clip_editor.clone().unwrap();
        assert_eq!(editor.sequence_number, 2);
        editor.notes = "edited".into();
        app.apply_clip_edit(editor);
        assert_eq!(app.registry.clips("TRANSICIÓN")[0].notes, "edited");

        app.handle_clip_action(delete(0));
        assert!(app.clip_editor.is_none());
        assert!(!app.windows.clip_editor);
    }

    #[test]
    fn test_hotkey_chars_for_letters_and_digits() {
        assert_eq!(hotkey_char(egui::Key::A), Some('A'));
        assert_eq!(hotkey_char(egui::Key::Num7), Some('7'));
        assert_eq!(hotkey_char(egui::Key::Space), None);
        assert_eq!(hotkey_char(egui::Key::ArrowLeft), None);
    }
}
