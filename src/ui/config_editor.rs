// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Button bank configuration window.
//!
//! Edits happen on a [`ButtonEditor`] working copy; nothing reaches the
//! registry until the whole bank validates and the user saves it.

use crate::models::button::{self, ButtonDefinition, ButtonEditor, CutType, Team};
use crate::models::tag::TagCatalog;
use crate::util::color::{parse_hex, to_hex, FALLBACK_RGB};
use std::collections::BTreeSet;

/// Form fields for one button.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonDraft {
    pub name: String,
    pub hotkey: String,
    pub fill: [u8; 3],
    pub text: [u8; 3],
    pub cut_type: CutType,
    pub team: Team,
    pub output_folder: String,
    pub auto_secs: u64,
    pub tag_ids: BTreeSet<u32>,
}

impl ButtonDraft {
    pub fn from_definition(def: &ButtonDefinition) -> Self {
        Self {
            name: def.name.clone(),
            hotkey: def.hotkey.to_string(),
            fill: parse_hex(&def.fill_color).unwrap_or(FALLBACK_RGB),
            text: parse_hex(&def.text_color).unwrap_or([255, 255, 255]),
            cut_type: def.cut_type,
            team: def.team,
            output_folder: def.output_folder.clone(),
            auto_secs: def.auto_duration_ms / 1000,
            tag_ids: def.tag_ids.clone(),
        }
    }

    /// Build a definition from the form, or say which field is wrong.
    pub fn to_definition(&self) -> Result<ButtonDefinition, String> {
        let name = self.name.trim().to_uppercase();
        if name.is_empty() {
            return Err("Name cannot be empty".into());
        }
        let mut chars = self.hotkey.trim().chars();
        let hotkey = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphanumeric() => c.to_ascii_uppercase(),
            _ => return Err("Hotkey must be a single letter or digit".into()),
        };
        let output_folder = if self.output_folder.trim().is_empty() {
            button::folder_for(&name)
        } else {
            self.output_folder.trim().to_string()
        };
        Ok(ButtonDefinition {
            name,
            fill_color: to_hex(self.fill),
            text_color: to_hex(self.text),
            cut_type: self.cut_type,
            hotkey,
            output_folder,
            team: self.team,
            tag_ids: self.tag_ids.clone(),
            auto_duration_ms: self.auto_secs * 1000,
        })
    }
}

/// Open configuration window state.
#[derive(Debug, Clone)]
pub struct ConfigEditor {
    editor: ButtonEditor,
    draft: Option<ButtonDraft>,
    errors: Vec<String>,
    /// Look-back given to newly added buttons.
    auto_default_ms: u64,
}

impl ConfigEditor {
    pub fn new(buttons: Vec<ButtonDefinition>) -> Self {
        Self {
            editor: ButtonEditor::new(buttons),
            draft: None,
            errors: Vec::new(),
            auto_default_ms: button::DEFAULT_AUTO_DURATION_MS,
        }
    }

    pub fn with_auto_default(mut self, auto_default_ms: u64) -> Self {
        self.auto_default_ms = auto_default_ms.max(1000);
        self
    }

    fn select(&mut self, index: Option<usize>) {
        self.editor.select(index);
        self.draft = self
            .editor
            .selected()
            .and_then(|i| self.editor.definitions().get(i))
            .map(ButtonDraft::from_definition);
    }

    /// Store the form into the selected slot.
    fn apply_draft(&mut self) {
        let (Some(index), Some(draft)) = (self.editor.selected(), &self.draft) else {
            return;
        };
        match draft.to_definition() {
            Ok(def) => {
                self.editor.edit(index, def);
                self.errors.clear();
            }
            Err(e) => self.errors = vec![e],
        }
    }

    fn add_new(&mut self) {
        let hotkey = button::suggest_free_hotkey(self.editor.definitions()).unwrap_or('0');
        let name = format!("BUTTON {}", self.editor.definitions().len() + 1);
        let mut definition = ButtonDefinition::new(&name, CutType::Manual, hotkey, Team::Local);
        definition.auto_duration_ms = self.auto_default_ms;
        self.editor.add(definition);
        self.select(self.editor.selected());
    }

    /// Validate the whole bank. `Some` when it is ready to be applied.
    fn try_finish(&mut self) -> Option<Vec<ButtonDefinition>> {
        match self.editor.clone().finish() {
            Ok(buttons) => Some(buttons),
            Err(errors) => {
                self.errors = errors.iter().map(|e| e.to_string()).collect();
                None
            }
        }
    }

    /// Display the window. Returns the new bank once the user saves it;
    /// clears `open` on save or cancel.
    pub fn show(&mut self, ctx: &egui::Context, open: &mut bool, tags: &TagCatalog) -> Option<Vec<ButtonDefinition>> {
        let mut result = None;
        let mut close = false;
        egui::Window::new("Button configuration")
            .open(open)
            .default_width(620.0)
            .show(ctx, |ui| {
                ui.columns(2, |cols| {
                    self.list_column(&mut cols[0]);
                    self.form_column(&mut cols[1], tags);
                });

                for error in &self.errors {
                    ui.colored_label(egui::Color32::from_rgb(0xe7, 0x4c, 0x3c), error);
                }
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("💾 Save and apply").clicked() {
                        self.apply_draft();
                        if let Some(buttons) = self.try_finish() {
                            result = Some(buttons);
                            close = true;
                        }
                    }
                    if ui.button("Restore defaults").clicked() {
                        *self = ConfigEditor::new(button::default_buttons())
                            .with_auto_default(self.auto_default_ms);
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        if close {
            *open = false;
        }
        result
    }

    fn list_column(&mut self, ui: &mut egui::Ui) {
        let labels = self.editor.labels();
        egui::ScrollArea::vertical()
            .id_source("button_config_list")
            .max_height(320.0)
            .show(ui, |ui| {
                for (i, label) in labels.iter().enumerate() {
                    let selected = self.editor.selected() == Some(i);
                    if ui.selectable_label(selected, label).clicked() {
                        self.apply_draft();
                        self.select(Some(i));
                    }
                }
            });
        ui.horizontal_wrapped(|ui| {
            if ui.button("➕ Add").clicked() {
                self.apply_draft();
                self.add_new();
            }
            if let Some(index) = self.editor.selected() {
                if ui.button("⧉ Duplicate").clicked() {
                    self.apply_draft();
                    if self.editor.duplicate(index).is_none() {
                        self.errors = vec!["No free hotkey left for a copy".into()];
                    }
                    self.select(self.editor.selected());
                }
                if ui.button("⬆").clicked() && self.editor.move_up(index) {
                    self.select(self.editor.selected());
                }
                if ui.button("⬇").clicked() && self.editor.move_down(index) {
                    self.select(self.editor.selected());
                }
                if ui.button("🗑 Remove").clicked() {
                    self.editor.remove(index);
                    self.select(self.editor.selected());
                }
            }
        });
    }

    fn form_column(&mut self, ui: &mut egui::Ui, tags: &TagCatalog) {
        let Some(draft) = self.draft.as_mut() else {
            ui.label("Select a button to edit it.");
            return;
        };
        egui::Grid::new("button_form").num_columns(2).show(ui, |ui| {
            ui.label("Name");
            ui.text_edit_singleline(&mut draft.name);
            ui.end_row();

            ui.label("Hotkey");
            ui.add(egui::TextEdit::singleline(&mut draft.hotkey).desired_width(30.0));
            ui.end_row();

            ui.label("Type");
            ui.horizontal(|ui| {
                ui.radio_value(&mut draft.cut_type, CutType::Manual, "Manual");
                ui.radio_value(&mut draft.cut_type, CutType::Auto, "Auto");
            });
            ui.end_row();

            if draft.cut_type == CutType::Auto {
                ui.label("Look-back");
                ui.add(egui::Slider::new(&mut draft.auto_secs, 1..=120).suffix(" s"));
                ui.end_row();
            }

            ui.label("Team");
            ui.horizontal(|ui| {
                ui.radio_value(&mut draft.team, Team::Local, "Local");
                ui.radio_value(&mut draft.team, Team::Away, "Away");
                ui.radio_value(&mut draft.team, Team::Both, "Both");
            });
            ui.end_row();

            ui.label("Colors");
            ui.horizontal(|ui| {
                ui.color_edit_button_srgb(&mut draft.fill);
                ui.label("fill");
                ui.color_edit_button_srgb(&mut draft.text);
                ui.label("text");
            });
            ui.end_row();

            ui.label("Folder");
            ui.text_edit_singleline(&mut draft.output_folder);
            ui.end_row();

            ui.label("Default tags");
            ui.vertical(|ui| {
                for tag in tags.tags() {
                    let mut on = draft.tag_ids.contains(&tag.id);
                    if ui.checkbox(&mut on, &tag.name).changed() {
                        if on {
                            draft.tag_ids.insert(tag.id);
                        } else {
                            draft.tag_ids.remove(&tag.id);
                        }
                    }
                }
            });
            ui.end_row();
        });
        if ui.button("✔ Apply to button").clicked() {
            self.apply_draft();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_roundtrips_a_definition() {
        for def in button::default_buttons() {
            let back = ButtonDraft::from_definition(&def).to_definition().unwrap();
            assert_eq!(back, def);
        }
    }

    #[test]
    fn test_draft_rejects_bad_hotkeys_and_names() {
        let mut draft = ButtonDraft::from_definition(&button::default_buttons()[0]);
        draft.hotkey = "AB".into();
        assert!(draft.to_definition().is_err());
        draft.hotkey = "-".into();
        assert!(draft.to_definition().is_err());
        draft.hotkey = "q".into();
        assert_eq!(draft.to_definition().unwrap().hotkey, 'Q');
        draft.name = "   ".into();
        assert!(draft.to_definition().is_err());
    }

    #[test]
    fn test_empty_folder_is_derived_from_name() {
        let mut draft = ButtonDraft::from_definition(&button::default_buttons()[0]);
        draft.name = "pressing alto".into();
        draft.output_folder.clear();
        let def = draft.to_definition().unwrap();
        assert_eq!(def.name, "PRESSING ALTO");
        assert_eq!(def.output_folder, "PRESSING_ALTO");
    }

    #[test]
    fn test_duplicate_hotkeys_block_saving() {
        let mut editor = ConfigEditor::new(button::default_buttons());
        editor.select(Some(1));
        if let Some(draft) = editor.draft.as_mut() {
            draft.hotkey = "1".into();
        }
        editor.apply_draft();
        assert!(editor.try_finish().is_none());
        assert!(editor.errors[0].contains("'1'"));
    }

    #[test]
    fn test_added_button_gets_a_free_hotkey() {
        let mut editor = ConfigEditor::new(button::default_buttons()).with_auto_default(15_000);
        editor.add_new();
        let added = editor.editor.definitions().last().unwrap();
        assert_eq!(added.hotkey, '9');
        assert_eq!(added.auto_duration_ms, 15_000);
        assert_eq!(editor.draft.as_ref().unwrap().name, "BUTTON 9");
        assert_eq!(editor.try_finish().unwrap().len(), 9);
    }
}
