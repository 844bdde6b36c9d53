// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Smaller windows: export options, project browser, save-as, clip editor,
//! formation snapshots, tag and team catalogs, confirmations and notices.

use crate::io::media::{Container, ExportCodec};
use crate::models::clip::Clip;
use crate::models::project::{FormationSnapshot, ProjectSummary, TeamNames};
use crate::models::tag::TagCatalog;
use crate::util::color::{parse_hex, to_color32, to_hex, FALLBACK_RGB};
use crate::util::time::{format_time, parse_time};
use chrono::{DateTime, Local};
use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;

/// Default file stem offered for a batch export.
pub fn default_export_name(now: DateTime<Local>) -> String {
    format!("Export_{}", now.format("%Y%m%d_%H%M"))
}

// ---------------------------------------------------------------- export

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub name: String,
    pub container: Container,
    pub codec: ExportCodec,
    pub overlay: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            name: default_export_name(Local::now()),
            container: Container::Mp4,
            codec: ExportCodec::Copy,
            overlay: false,
        }
    }
}

impl ExportOptions {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name.trim(), self.container.extension())
    }

    /// Returns the options when the user starts the export.
    pub fn show(&mut self, ctx: &egui::Context, open: &mut bool, clip_count: usize) -> Option<ExportOptions> {
        let mut start = None;
        egui::Window::new("Export project")
            .open(open)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("{clip_count} clips across all categories"));
                egui::Grid::new("export_form").num_columns(2).show(ui, |ui| {
                    ui.label("File name");
                    ui.text_edit_singleline(&mut self.name);
                    ui.end_row();

                    ui.label("Format");
                    egui::ComboBox::from_id_source("export_container")
                        .selected_text(self.container.extension())
                        .show_ui(ui, |ui| {
                            for container in Container::ALL {
                                ui.selectable_value(&mut self.container, container, container.extension());
                            }
                        });
                    ui.end_row();

                    ui.label("Codec");
                    egui::ComboBox::from_id_source("export_codec")
                        .selected_text(self.codec.label())
                        .show_ui(ui, |ui| {
                            for codec in ExportCodec::ALL {
                                ui.selectable_value(&mut self.codec, codec, codec.label());
                            }
                        });
                    ui.end_row();
                });
                ui.checkbox(&mut self.overlay, "Burn in clip name and time");

                let ready = clip_count > 0 && !self.name.trim().is_empty();
                if ui.add_enabled(ready, egui::Button::new("🚀 Export")).clicked() {
                    start = Some(self.clone());
                }
            });
        start
    }
}

// ------------------------------------------------------- project browser

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserAction {
    Open(PathBuf),
    Delete(String),
}

#[derive(Debug, Default)]
pub struct ProjectBrowser {
    pub summaries: Vec<ProjectSummary>,
    selected: Option<usize>,
    confirm_delete: bool,
}

impl ProjectBrowser {
    pub fn new(summaries: Vec<ProjectSummary>) -> Self {
        Self {
            summaries,
            selected: None,
            confirm_delete: false,
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, open: &mut bool) -> Option<BrowserAction> {
        let mut action = None;
        egui::Window::new("Open project")
            .open(open)
            .default_size([560.0, 380.0])
            .show(ctx, |ui| {
                if self.summaries.is_empty() {
                    ui.label("No saved projects yet.");
                    return;
                }
                egui::ScrollArea::vertical()
                    .id_source("project_list")
                    .max_height(300.0)
                    .show(ui, |ui| {
                        for (i, summary) in self.summaries.iter().enumerate() {
                            let video = summary
                                .video_path
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_else(|| "no video".into());
                            let missing = if summary.video_exists || summary.video_path.as_os_str().is_empty() {
                                ""
                            } else {
                                "  (video missing)"
                            };
                            let text = format!(
                                "📁 {}\n📅 {}   🎬 {}{}   ✂ {} clips",
                                summary.name,
                                summary.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                                video,
                                missing,
                                summary.clip_count
                            );
                            let response = ui.selectable_label(self.selected == Some(i), text);
                            if response.clicked() {
                                self.selected = Some(i);
                                self.confirm_delete = false;
                            }
                            if response.double_clicked() {
                                action = Some(BrowserAction::Open(summary.path.clone()));
                            }
                        }
                    });
                ui.separator();
                let chosen = self.selected.and_then(|i| self.summaries.get(i));
                ui.horizontal(|ui| {
                    if ui.add_enabled(chosen.is_some(), egui::Button::new("Open")).clicked() {
                        action = chosen.map(|s| BrowserAction::Open(s.path.clone()));
                    }
                    if self.confirm_delete {
                        ui.label("Delete the project folder and everything in it?");
                        if ui.button("Yes, delete").clicked() {
                            action = chosen.map(|s| BrowserAction::Delete(s.name.clone()));
                        }
                        if ui.button("No").clicked() {
                            self.confirm_delete = false;
                        }
                    } else if ui.add_enabled(chosen.is_some(), egui::Button::new("🗑 Delete")).clicked() {
                        self.confirm_delete = true;
                    }
                });
            });
        if matches!(action, Some(BrowserAction::Delete(_))) {
            self.confirm_delete = false;
            self.selected = None;
        }
        action
    }
}

// ---------------------------------------------------------------- save as

/// Single text prompt used for save-as.
#[derive(Debug, Clone)]
pub struct NamePrompt {
    pub name: String,
}

impl NamePrompt {
    pub fn new(name: String) -> Self {
        Self { name }
    }

    pub fn show(&mut self, ctx: &egui::Context, title: &str, open: &mut bool) -> Option<String> {
        let mut confirmed = None;
        let mut close = false;
        egui::Window::new(title)
            .open(open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let field = ui.text_edit_singleline(&mut self.name);
                let entered = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    let valid = !self.name.trim().is_empty();
                    if (ui.add_enabled(valid, egui::Button::new("Save")).clicked() || entered) && valid {
                        confirmed = Some(self.name.trim().to_string());
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        if close {
            *open = false;
        }
        confirmed
    }
}

// ------------------------------------------------------------ clip editor

/// Rename, retag and annotate one clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipEditor {
    pub category: String,
    pub sequence_number: u32,
    pub name: String,
    pub notes: String,
    pub tag_ids: BTreeSet<u32>,
}

impl ClipEditor {
    pub fn new(clip: &Clip) -> Self {
        Self {
            category: clip.category.clone(),
            sequence_number: clip.sequence_number,
            name: clip.name.clone(),
            notes: clip.notes.clone(),
            tag_ids: clip.tag_ids.clone(),
        }
    }

    /// Returns itself when the user applies the edit.
    pub fn show(&mut self, ctx: &egui::Context, open: &mut bool, tags: &TagCatalog) -> Option<ClipEditor> {
        let mut applied = None;
        let mut close = false;
        egui::Window::new("Edit clip")
            .open(open)
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(&self.category).weak());
                ui.horizontal(|ui| {
                    ui.label("Name");
                    ui.text_edit_singleline(&mut self.name);
                });
                ui.label("Notes");
                ui.add(egui::TextEdit::multiline(&mut self.notes).desired_rows(4));
                ui.label("Tags");
                ui.horizontal_wrapped(|ui| {
                    for tag in tags.tags() {
                        let mut on = self.tag_ids.contains(&tag.id);
                        let label = egui::RichText::new(&tag.name).color(to_color32(&tag.color));
                        if ui.checkbox(&mut on, label).changed() {
                            if on {
                                self.tag_ids.insert(tag.id);
                            } else {
                                self.tag_ids.remove(&tag.id);
                            }
                        }
                    }
                });
                ui.horizontal(|ui| {
                    let valid = !self.name.trim().is_empty();
                    if ui.add_enabled(valid, egui::Button::new("Apply")).clicked() {
                        applied = Some(self.clone());
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        if close {
            *open = false;
        }
        applied
    }
}

// ------------------------------------------------------------- formations

#[derive(Debug, Clone, PartialEq)]
pub enum FormationAction {
    Add(FormationSnapshot),
    Delete(usize),
}

#[derive(Debug, Clone, Default)]
pub struct FormationForm {
    pub clock: String,
    pub formation: String,
    pub notes: String,
}

impl FormationForm {
    /// Build a snapshot, defaulting the clock to `position_ms`.
    pub fn snapshot(&self, position_ms: u64) -> Option<FormationSnapshot> {
        let formation = self.formation.trim();
        if formation.is_empty() {
            return None;
        }
        let clock_ms = if self.clock.trim().is_empty() {
            position_ms
        } else {
            parse_time(&self.clock)?
        };
        Some(FormationSnapshot::new(clock_ms / 1000, formation, self.notes.trim()))
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        open: &mut bool,
        snapshots: &[FormationSnapshot],
        position_ms: u64,
    ) -> Option<FormationAction> {
        let mut action = None;
        egui::Window::new("Formations")
            .open(open)
            .default_width(380.0)
            .show(ctx, |ui| {
                egui::Grid::new("formation_form").num_columns(2).show(ui, |ui| {
                    ui.label("Match clock");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.clock)
                            .hint_text(format_time(position_ms))
                            .desired_width(80.0),
                    );
                    ui.end_row();
                    ui.label("Formation");
                    ui.add(egui::TextEdit::singleline(&mut self.formation).hint_text("4-3-3"));
                    ui.end_row();
                    ui.label("Notes");
                    ui.text_edit_singleline(&mut self.notes);
                    ui.end_row();
                });
                let snapshot = self.snapshot(position_ms);
                if ui
                    .add_enabled(snapshot.is_some(), egui::Button::new("➕ Save formation"))
                    .clicked()
                {
                    action = snapshot.map(FormationAction::Add);
                    *self = FormationForm::default();
                }

                ui.separator();
                if snapshots.is_empty() {
                    ui.label("No formations saved.");
                }
                for (i, snapshot) in snapshots.iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(format!("{}'  {}", snapshot.clock_label(), snapshot.formation));
                        if !snapshot.notes.is_empty() {
                            ui.label(egui::RichText::new(&snapshot.notes).weak());
                        }
                        if ui.small_button("🗑").clicked() {
                            action = Some(FormationAction::Delete(i));
                        }
                    });
                }
            });
        action
    }
}

// --------------------------------------------------------------- catalogs

/// What changed in the catalogs window, so the caller knows what to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogChanges {
    pub tags: bool,
    pub teams: bool,
}

#[derive(Debug, Clone)]
pub struct CatalogForm {
    pub tag_name: String,
    pub tag_color: [u8; 3],
    pub tag_category: String,
    /// Tag being renamed and the name typed so far.
    pub renaming: Option<(u32, String)>,
}

impl Default for CatalogForm {
    fn default() -> Self {
        Self {
            tag_name: String::new(),
            tag_color: FALLBACK_RGB,
            tag_category: String::new(),
            renaming: None,
        }
    }
}

impl CatalogForm {
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        open: &mut bool,
        tags: &mut TagCatalog,
        teams: &mut TeamNames,
    ) -> CatalogChanges {
        let mut changes = CatalogChanges::default();
        egui::Window::new("Tags and teams")
            .open(open)
            .default_width(400.0)
            .show(ctx, |ui| {
                ui.heading("Teams");
                egui::Grid::new("teams_form").num_columns(2).show(ui, |ui| {
                    ui.label("Local");
                    changes.teams |= ui.text_edit_singleline(&mut teams.local).lost_focus();
                    ui.end_row();
                    ui.label("Away");
                    changes.teams |= ui.text_edit_singleline(&mut teams.away).lost_focus();
                    ui.end_row();
                });

                ui.separator();
                ui.heading("Tags");
                let mut remove = None;
                let mut recolor = None;
                let mut rename = None;
                let mut start_rename = None;
                let mut cancel_rename = false;
                for tag in tags.tags() {
                    ui.horizontal(|ui| {
                        let mut rgb = parse_hex(&tag.color).unwrap_or(FALLBACK_RGB);
                        if ui.color_edit_button_srgb(&mut rgb).changed() {
                            recolor = Some((tag.id, to_hex(rgb)));
                        }
                        match &mut self.renaming {
                            Some((id, name)) if *id == tag.id => {
                                let edit = ui.add(egui::TextEdit::singleline(name).desired_width(120.0));
                                let valid = !name.trim().is_empty();
                                let enter = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                                if ui.add_enabled(valid, egui::Button::new("OK")).clicked() || (enter && valid) {
                                    rename = Some((tag.id, name.clone()));
                                }
                                if ui.small_button("✖").clicked() {
                                    cancel_rename = true;
                                }
                            }
                            _ => {
                                ui.label(&tag.name);
                                if !tag.category.is_empty() {
                                    ui.label(egui::RichText::new(&tag.category).weak());
                                }
                                if ui.small_button("✏").on_hover_text("Rename").clicked() {
                                    start_rename = Some((tag.id, tag.name.clone()));
                                }
                            }
                        }
                        if ui.small_button("🗑").clicked() {
                            remove = Some(tag.id);
                        }
                    });
                }
                if let Some(started) = start_rename {
                    self.renaming = Some(started);
                }
                if let Some((id, name)) = rename {
                    changes.tags |= tags.rename(id, &name);
                    self.renaming = None;
                }
                if cancel_rename {
                    self.renaming = None;
                }
                if let Some((id, color)) = recolor {
                    changes.tags |= tags.recolor(id, &color);
                }
                if let Some(id) = remove {
                    if self.renaming.as_ref().is_some_and(|(r, _)| *r == id) {
                        self.renaming = None;
                    }
                    changes.tags |= tags.remove(id).is_some();
                }

                ui.horizontal(|ui| {
                    ui.color_edit_button_srgb(&mut self.tag_color);
                    ui.add(egui::TextEdit::singleline(&mut self.tag_name).hint_text("New tag").desired_width(120.0));
                    ui.add(egui::TextEdit::singleline(&mut self.tag_category).hint_text("Group").desired_width(90.0));
                    let valid = !self.tag_name.trim().is_empty();
                    if ui.add_enabled(valid, egui::Button::new("Add")).clicked() {
                        tags.add(&self.tag_name, &to_hex(self.tag_color), &self.tag_category);
                        self.tag_name.clear();
                        changes.tags = true;
                    }
                });
            });
        changes
    }
}

// ---------------------------------------------------- confirm and notices

/// What to do once unsaved changes are dealt with.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    NewProject,
    OpenProject(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    Save,
    Discard,
    Cancel,
}

/// Ask whether to save before the current project is replaced.
pub fn show_unsaved_prompt(ctx: &egui::Context) -> Option<ConfirmChoice> {
    let mut choice = None;
    egui::Window::new("Unsaved changes")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label("The current project has unsaved changes. Save them first?");
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    choice = Some(ConfirmChoice::Save);
                }
                if ui.button("Don't save").clicked() {
                    choice = Some(ConfirmChoice::Discard);
                }
                if ui.button("Cancel").clicked() {
                    choice = Some(ConfirmChoice::Cancel);
                }
            });
        });
    choice
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

/// Notices shown one at a time, oldest first.
#[derive(Debug, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
}

impl Notices {
    pub fn push(&mut self, level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) {
        self.queue.push_back(Notice {
            level,
            title: title.into(),
            message: message.into(),
        });
    }

    pub fn info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NoticeLevel::Info, title, message);
    }

    pub fn warn(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, title, message);
    }

    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NoticeLevel::Error, title, message);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.queue.front() else {
            return;
        };
        let (icon, color) = match notice.level {
            NoticeLevel::Info => ("ℹ", egui::Color32::from_rgb(0x34, 0x98, 0xdb)),
            NoticeLevel::Warning => ("⚠", egui::Color32::from_rgb(0xf3, 0x9c, 0x12)),
            NoticeLevel::Error => ("✖", egui::Color32::from_rgb(0xe7, 0x4c, 0x3c)),
        };
        let mut dismissed = false;
        egui::Window::new(format!("{icon} {}", notice.title))
            .id(egui::Id::new("notice_window"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.colored_label(color, &notice.message);
                if self.queue.len() > 1 {
                    ui.label(egui::RichText::new(format!("{} more", self.queue.len() - 1)).weak());
                }
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.queue.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_defaults() {
        let now = Local.with_ymd_and_hms(2025, 3, 9, 18, 45, 0).unwrap();
        assert_eq!(default_export_name(now), "Export_20250309_1845");

        let options = ExportOptions {
            name: " Final ".into(),
            container: Container::Mov,
            ..Default::default()
        };
        assert_eq!(options.file_name(), "Final.mov");
    }

    #[test]
    fn test_formation_form_uses_clock_or_position() {
        let form = FormationForm {
            clock: String::new(),
            formation: "4-4-2".into(),
            notes: " low block ".into(),
        };
        let snapshot = form.snapshot(754_900).unwrap();
        assert_eq!(snapshot.match_clock_secs, 754);
        assert_eq!(snapshot.notes, "low block");

        let form = FormationForm {
            clock: "45:10".into(),
            ..form
        };
        assert_eq!(form.snapshot(0).unwrap().match_clock_secs, 2_710);

        let form = FormationForm {
            clock: "soon".into(),
            ..form
        };
        assert!(form.snapshot(0).is_none());
        assert!(FormationForm::default().snapshot(0).is_none());
    }

    #[test]
    fn test_clip_editor_copies_clip_fields() {
        let clip = Clip {
            start_ms: 0,
            end_ms: 1_000,
            category: "SALIDA".into(),
            sequence_number: 1,
            name: "SALIDA 1".into(),
            color: "#2980b9".into(),
            tag_ids: [2, 4].into_iter().collect(),
            notes: "switch of play".into(),
        };
        let editor = ClipEditor::new(&clip);
        assert_eq!(editor.sequence_number, 1);
        assert_eq!(editor.tag_ids, clip.tag_ids);
        assert_eq!(editor.notes, clip.notes);
    }

    #[test]
    fn test_notices_queue_in_order() {
        let mut notices = Notices::default();
        notices.info("Saved", "Project saved");
        notices.error("Export", "ffmpeg failed");
        assert_eq!(notices.len(), 2);
        assert_eq!(notices.queue[0].title, "Saved");
        assert_eq!(notices.queue[1].level, NoticeLevel::Error);
    }
}
