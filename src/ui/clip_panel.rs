// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Clip lists, grouped by team and category.
//!
//! Each category shows its clips in creation order with a context menu for
//! the per-clip operations. Double-clicking a clip jumps to it.

use crate::models::button::Team;
use crate::models::clip::Clip;
use crate::models::project::TeamNames;
use crate::models::registry::ClipRegistry;
use crate::models::tag::TagCatalog;
use crate::util::color::to_color32;
use std::collections::BTreeSet;

/// Per-clip operations requested from the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipAction {
    Jump { category: String, index: usize },
    Render { category: String, index: usize },
    Edit { category: String, index: usize },
    AddToPlaylist { category: String, index: usize },
    Delete { category: String, index: usize },
}

#[derive(Debug, Default)]
pub struct ClipPanelState {
    /// Only clips carrying one of these tags are listed; empty lists all.
    pub tag_filter: BTreeSet<u32>,
}

pub fn show(
    ui: &mut egui::Ui,
    state: &mut ClipPanelState,
    registry: &ClipRegistry,
    tags: &TagCatalog,
    teams: &TeamNames,
) -> Option<ClipAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.heading("Clips");
        ui.label(format!("({} total)", registry.total_clips()));
    });
    tag_filter(ui, state, tags);
    ui.separator();

    egui::ScrollArea::vertical()
        .id_source("clip_lists")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for (team, title) in [
                (Team::Local, teams.local.as_str()),
                (Team::Away, teams.away.as_str()),
                (Team::Both, "Both"),
            ] {
                let categories: Vec<_> = registry
                    .categories()
                    .iter()
                    .filter(|c| c.button.team == team)
                    .collect();
                if categories.is_empty() {
                    continue;
                }
                ui.label(egui::RichText::new(title).strong().size(15.0));
                for category in categories {
                    let name = &category.button.name;
                    let header = format!("{}  ({})", name, category.clips.len());
                    egui::CollapsingHeader::new(
                        egui::RichText::new(header).color(to_color32(&category.button.fill_color)),
                    )
                    .id_source(("category", name))
                    .default_open(true)
                    .show(ui, |ui| {
                        for (index, clip) in category.clips.iter().enumerate() {
                            if !clip.matches_tags(&state.tag_filter) {
                                continue;
                            }
                            if let Some(a) = clip_row(ui, clip, index, tags) {
                                action = Some(a);
                            }
                        }
                    });
                }
                ui.add_space(6.0);
            }
        });

    action
}

fn tag_filter(ui: &mut egui::Ui, state: &mut ClipPanelState, tags: &TagCatalog) {
    let summary = if state.tag_filter.is_empty() {
        "All tags".to_string()
    } else {
        tags.names(&state.tag_filter).join(", ")
    };
    ui.horizontal(|ui| {
        ui.label("Filter:");
        ui.menu_button(summary, |ui| {
            for tag in tags.tags() {
                let mut on = state.tag_filter.contains(&tag.id);
                if ui.checkbox(&mut on, &tag.name).changed() {
                    if on {
                        state.tag_filter.insert(tag.id);
                    } else {
                        state.tag_filter.remove(&tag.id);
                    }
                }
            }
            ui.separator();
            if ui.button("Clear").clicked() {
                state.tag_filter.clear();
                ui.close_menu();
            }
        });
    });
}

fn clip_row(ui: &mut egui::Ui, clip: &Clip, index: usize, tags: &TagCatalog) -> Option<ClipAction> {
    let mut action = None;
    let category = clip.category.clone();

    let text = egui::RichText::new(clip.list_label()).color(to_color32(&clip.color));
    let response = ui.selectable_label(false, text);
    let mut hover = format!("{} s", clip.duration_ms() / 1000);
    let tag_names = tags.names(&clip.tag_ids);
    if !tag_names.is_empty() {
        hover.push_str(&format!("\nTags: {}", tag_names.join(", ")));
    }
    if !clip.notes.is_empty() {
        hover.push_str(&format!("\n{}", clip.notes));
    }
    let response = response.on_hover_text(hover);

    if response.double_clicked() {
        action = Some(ClipAction::Jump {
            category: category.clone(),
            index,
        });
    }
    response.context_menu(|ui| {
        let entries = [
            ("▶ Go to clip", ClipAction::Jump { category: category.clone(), index }),
            ("🎬 Render clip", ClipAction::Render { category: category.clone(), index }),
            ("✏ Rename, tags and notes", ClipAction::Edit { category: category.clone(), index }),
            ("➕ Add to playlist", ClipAction::AddToPlaylist { category: category.clone(), index }),
            ("🗑 Delete", ClipAction::Delete { category: category.clone(), index }),
        ];
        for (label, entry) in entries {
            if ui.button(label).clicked() {
                action = Some(entry);
                ui.close_menu();
            }
        }
    });
    action
}
