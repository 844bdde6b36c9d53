// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Button bank configuration.
//!
//! A `ButtonDefinition` is one configured cut action. Its `name` is also the
//! category that owns the clips it produces and the key of its clip list.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Look-back window used by auto buttons unless configured otherwise.
pub const DEFAULT_AUTO_DURATION_MS: u64 = 10_000;

/// Deterministic order used when suggesting a free hotkey.
const HOTKEY_SCAN_ORDER: &str = "1234567890ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// How a button turns presses into clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutType {
    /// First press marks the start, second press the end.
    Manual,
    /// One press captures a fixed window ending at the press.
    Auto,
}

impl std::fmt::Display for CutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CutType::Manual => write!(f, "manual"),
            CutType::Auto => write!(f, "auto"),
        }
    }
}

/// Which side of the match a button belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Local,
    Away,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonDefinition {
    pub name: String,
    pub fill_color: String,
    pub text_color: String,
    pub cut_type: CutType,
    pub hotkey: char,
    pub output_folder: String,
    pub team: Team,
    #[serde(default)]
    pub tag_ids: BTreeSet<u32>,
    #[serde(default = "default_auto_duration")]
    pub auto_duration_ms: u64,
}

fn default_auto_duration() -> u64 {
    DEFAULT_AUTO_DURATION_MS
}

impl ButtonDefinition {
    /// Create a button with the folder derived from its name.
    pub fn new(name: &str, cut_type: CutType, hotkey: char, team: Team) -> Self {
        let (fill, text) = match team {
            Team::Away => ("#c0392b", "#e74c3c"),
            _ => ("#2980b9", "#3498db"),
        };
        Self {
            name: name.trim().to_uppercase(),
            fill_color: fill.to_string(),
            text_color: text.to_string(),
            cut_type,
            hotkey: hotkey.to_ascii_uppercase(),
            output_folder: folder_for(name),
            team,
            tag_ids: BTreeSet::new(),
            auto_duration_ms: DEFAULT_AUTO_DURATION_MS,
        }
    }

    /// `SALIDA RIVAL` → `SALIDA`, used for default clip names.
    pub fn clip_base_name(&self) -> String {
        self.name.replace(" RIVAL", "").replace('_', " ")
    }

    /// Label shown in the configuration editor list.
    pub fn editor_label(&self, position: usize) -> String {
        format!(
            "{}. {} [{}] - {}",
            position + 1,
            self.name,
            self.hotkey,
            self.cut_type
        )
    }
}

/// Output folder name derived from a button name.
pub fn folder_for(name: &str) -> String {
    name.trim().replace(' ', "_").to_uppercase()
}

/// Built-in bank: four tactical phases for each team.
pub fn default_buttons() -> Vec<ButtonDefinition> {
    let phases = [
        ("SALIDA", CutType::Manual, "Salida"),
        ("DESARROLLO", CutType::Manual, "Desarrollo"),
        ("TRANSICIÓN", CutType::Auto, "Transicion"),
        ("FINALIZACIÓN", CutType::Auto, "Finalizacion"),
    ];

    let mut buttons = Vec::with_capacity(8);
    for (team, suffix, folder_suffix, offset) in [
        (Team::Local, "", "Propia", 0u32),
        (Team::Away, " RIVAL", "Rival", 4u32),
    ] {
        for (i, (phase, cut_type, folder)) in phases.iter().enumerate() {
            let hotkey = char::from_digit(offset + i as u32 + 1, 10).unwrap_or('0');
            let mut button = ButtonDefinition::new(&format!("{phase}{suffix}"), *cut_type, hotkey, team);
            button.output_folder = format!("{folder}_{folder_suffix}");
            buttons.push(button);
        }
    }
    buttons
}

/// Check a configuration before it is persisted or applied.
pub fn validate(definitions: &[ButtonDefinition]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if definitions.is_empty() {
        errors.push(ValidationError::Empty);
        return errors;
    }

    let mut hotkeys: HashMap<char, &str> = HashMap::new();
    let mut names: HashSet<&str> = HashSet::new();
    for (index, def) in definitions.iter().enumerate() {
        if def.name.trim().is_empty() {
            errors.push(ValidationError::BlankName { index: index + 1 });
        } else if !names.insert(def.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: def.name.clone(),
            });
        }

        let key = def.hotkey.to_ascii_uppercase();
        if let Some(first) = hotkeys.get(&key) {
            errors.push(ValidationError::DuplicateHotkey {
                hotkey: key,
                first: first.to_string(),
                second: def.name.clone(),
            });
        } else {
            hotkeys.insert(key, def.name.as_str());
        }

        if def.cut_type == CutType::Auto && def.auto_duration_ms == 0 {
            errors.push(ValidationError::ZeroAutoWindow {
                name: def.name.clone(),
            });
        }
    }
    errors
}

/// First hotkey in scan order not used by any definition.
pub fn suggest_free_hotkey(definitions: &[ButtonDefinition]) -> Option<char> {
    let used: HashSet<char> = definitions
        .iter()
        .map(|d| d.hotkey.to_ascii_uppercase())
        .collect();
    HOTKEY_SCAN_ORDER.chars().find(|c| !used.contains(c))
}

/// Working copy of the bank edited by the configuration dialog.
///
/// Every operation is a plain list edit, so the numbering returned by
/// [`ButtonEditor::labels`] always follows list order.
#[derive(Debug, Clone)]
pub struct ButtonEditor {
    definitions: Vec<ButtonDefinition>,
    selected: Option<usize>,
}

impl ButtonEditor {
    pub fn new(definitions: Vec<ButtonDefinition>) -> Self {
        Self {
            definitions,
            selected: None,
        }
    }

    pub fn definitions(&self) -> &[ButtonDefinition] {
        &self.definitions
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index.filter(|i| *i < self.definitions.len());
    }

    pub fn labels(&self) -> Vec<String> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(i, d)| d.editor_label(i))
            .collect()
    }

    pub fn add(&mut self, definition: ButtonDefinition) {
        self.definitions.push(definition);
        self.selected = Some(self.definitions.len() - 1);
    }

    /// Replace the selected definition.
    pub fn edit(&mut self, index: usize, definition: ButtonDefinition) -> bool {
        match self.definitions.get_mut(index) {
            Some(slot) => {
                *slot = definition;
                true
            }
            None => false,
        }
    }

    /// Copy a definition right after itself with a fresh name and hotkey.
    pub fn duplicate(&mut self, index: usize) -> Option<usize> {
        let mut copy = self.definitions.get(index)?.clone();
        copy.hotkey = suggest_free_hotkey(&self.definitions)?;
        copy.name = self.unique_name(&copy.name);
        self.definitions.insert(index + 1, copy);
        self.selected = Some(index + 1);
        Some(index + 1)
    }

    pub fn remove(&mut self, index: usize) -> Option<ButtonDefinition> {
        if index >= self.definitions.len() {
            return None;
        }
        let removed = self.definitions.remove(index);
        self.selected = if self.definitions.is_empty() {
            None
        } else {
            Some(index.min(self.definitions.len() - 1))
        };
        Some(removed)
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.definitions.len() {
            return false;
        }
        self.definitions.swap(index, index - 1);
        self.selected = Some(index - 1);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.definitions.len() {
            return false;
        }
        self.definitions.swap(index, index + 1);
        self.selected = Some(index + 1);
        true
    }

    /// Validate and hand back the edited bank.
    pub fn finish(self) -> Result<Vec<ButtonDefinition>, Vec<ValidationError>> {
        let errors = validate(&self.definitions);
        if errors.is_empty() {
            Ok(self.definitions)
        } else {
            Err(errors)
        }
    }

    fn unique_name(&self, base: &str) -> String {
        (2..)
            .map(|n| format!("{base} {n}"))
            .find(|candidate| !self.definitions.iter().any(|d| &d.name == candidate))
            .unwrap_or_else(|| base.to_string())
    }
}
