// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Playlist window: an ordered, tag-filterable selection of clips that is
//! concatenated into one file.

use crate::models::clip::Clip;
use crate::models::registry::ClipRegistry;
use crate::models::tag::TagCatalog;
use crate::util::color::to_color32;
use std::collections::BTreeSet;

pub const DEFAULT_PLAYLIST_NAME: &str = "PLAYLIST";

/// A confirmed playlist render request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistRequest {
    pub clips: Vec<Clip>,
    pub name: String,
    pub overlay: bool,
}

#[derive(Debug, Clone)]
pub struct Playlist {
    items: Vec<Clip>,
    selected: Option<usize>,
    pub name: String,
    pub overlay: bool,
    pub tag_filter: BTreeSet<u32>,
}

impl Default for Playlist {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            name: DEFAULT_PLAYLIST_NAME.to_string(),
            overlay: false,
            tag_filter: BTreeSet::new(),
        }
    }
}

impl Playlist {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a clip unless the same range of the same category is present.
    pub fn add(&mut self, clip: Clip) -> bool {
        let duplicate = self.items.iter().any(|c| {
            c.category == clip.category && c.start_ms == clip.start_ms && c.end_ms == clip.end_ms
        });
        if duplicate {
            return false;
        }
        self.items.push(clip);
        true
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.items.len() {
            return false;
        }
        self.items.swap(index, index - 1);
        self.selected = Some(index - 1);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.items.len() {
            return false;
        }
        self.items.swap(index, index + 1);
        self.selected = Some(index + 1);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<Clip> {
        if index >= self.items.len() {
            return None;
        }
        let clip = self.items.remove(index);
        self.selected = match self.items.len() {
            0 => None,
            n => Some(index.min(n - 1)),
        };
        Some(clip)
    }

    /// Pick up renames, retags and notes made in the registry since the
    /// clips were added. Clips deleted from the registry keep their copy.
    pub fn refresh(&mut self, registry: &ClipRegistry) -> usize {
        let mut updated = 0;
        for item in &mut self.items {
            let current = registry
                .position(&item.category, item.sequence_number)
                .and_then(|index| registry.clips(&item.category).get(index));
            if let Some(current) = current {
                if current != item {
                    *item = current.clone();
                    updated += 1;
                }
            }
        }
        updated
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.selected = None;
    }

    /// Clips that pass the tag filter, in playlist order.
    pub fn filtered(&self) -> Vec<Clip> {
        self.items
            .iter()
            .filter(|c| c.matches_tags(&self.tag_filter))
            .cloned()
            .collect()
    }

    /// Build the render request, if there is anything to render.
    pub fn request(&self) -> Option<PlaylistRequest> {
        let clips = self.filtered();
        let name = self.name.trim();
        if clips.is_empty() || name.is_empty() {
            return None;
        }
        Some(PlaylistRequest {
            clips,
            name: name.to_string(),
            overlay: self.overlay,
        })
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        open: &mut bool,
        tags: &TagCatalog,
        registry: &ClipRegistry,
    ) -> Option<PlaylistRequest> {
        if *open {
            self.refresh(registry);
        }
        let mut request = None;
        egui::Window::new("Playlist")
            .open(open)
            .default_width(420.0)
            .show(ctx, |ui| {
                if self.is_empty() {
                    ui.label("Right-click a clip in the lists to add it here.");
                } else {
                    ui.label(format!("Clip order ({} clips):", self.len()));
                }
                egui::ScrollArea::vertical()
                    .id_source("playlist_items")
                    .max_height(300.0)
                    .show(ui, |ui| {
                        for (i, clip) in self.items.iter().enumerate() {
                            let visible = clip.matches_tags(&self.tag_filter);
                            let mut text = egui::RichText::new(format!("{}. {}", i + 1, clip.list_label()))
                                .color(to_color32(&clip.color));
                            if !visible {
                                text = text.strikethrough().weak();
                            }
                            if ui.selectable_label(self.selected == Some(i), text).clicked() {
                                self.selected = Some(i);
                            }
                        }
                    });

                ui.horizontal(|ui| {
                    let selected = self.selected;
                    ui.add_enabled_ui(selected.is_some(), |ui| {
                        if let Some(i) = selected {
                            if ui.button("⬆ Up").clicked() {
                                self.move_up(i);
                            }
                            if ui.button("⬇ Down").clicked() {
                                self.move_down(i);
                            }
                            if ui.button("🗑 Remove").clicked() {
                                self.remove(i);
                            }
                        }
                    });
                    if ui.button("Clear").clicked() {
                        self.clear();
                    }
                });

                ui.separator();
                ui.horizontal_wrapped(|ui| {
                    ui.label("Only tags:");
                    for tag in tags.tags() {
                        let mut on = self.tag_filter.contains(&tag.id);
                        if ui.checkbox(&mut on, &tag.name).changed() {
                            if on {
                                self.tag_filter.insert(tag.id);
                            } else {
                                self.tag_filter.remove(&tag.id);
                            }
                        }
                    }
                });
                ui.horizontal(|ui| {
                    ui.label("File name");
                    ui.text_edit_singleline(&mut self.name);
                });
                ui.checkbox(&mut self.overlay, "Burn in clip name and time");

                let ready = self.request();
                let count = ready.as_ref().map_or(0, |r| r.clips.len());
                let render = egui::Button::new(
                    egui::RichText::new(format!("🎬 Render playlist ({count} clips)")).strong(),
                )
                .fill(egui::Color32::from_rgb(0x27, 0xae, 0x60));
                if ui.add_enabled(ready.is_some(), render).clicked() {
                    request = ready;
                }
            });
        request
    }
}
