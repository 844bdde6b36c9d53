// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Stores for the button bank, tag catalog and team names.
//!
//! All three documents are optional: a missing or unreadable file yields the
//! built-in default and a warning in the log, never an error.

use super::serialization::{read_document, read_value, write_document};
use crate::error::ConfigError;
use crate::error::DocumentError;
use crate::models::button::{self, ButtonDefinition, DEFAULT_AUTO_DURATION_MS};
use crate::models::project::TeamNames;
use crate::models::tag::TagCatalog;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Load the button bank, falling back to the default bank.
pub fn load_buttons(path: &Path) -> Vec<ButtonDefinition> {
    if !path.exists() {
        log::info!("No button configuration at {}, using defaults", path.display());
        return button::default_buttons();
    }
    match parse_buttons(path) {
        Ok(buttons) => {
            let errors = button::validate(&buttons);
            if errors.is_empty() {
                buttons
            } else {
                log::warn!(
                    "Button configuration {} is invalid ({}), using defaults",
                    path.display(),
                    ConfigError::Invalid(errors)
                );
                button::default_buttons()
            }
        }
        Err(e) => {
            log::warn!("Could not read {}: {}, using defaults", path.display(), e);
            button::default_buttons()
        }
    }
}

fn parse_buttons(path: &Path) -> Result<Vec<ButtonDefinition>, DocumentError> {
    let mut value = read_value(path)?;
    upgrade_button_records(&mut value);
    Ok(serde_json::from_value(value)?)
}

/// Validate and overwrite the stored button bank.
pub fn save_buttons(path: &Path, buttons: &[ButtonDefinition]) -> Result<(), ConfigError> {
    let errors = button::validate(buttons);
    if !errors.is_empty() {
        return Err(ConfigError::Invalid(errors));
    }
    write_document(buttons, path)?;
    log::info!("Saved {} buttons to {}", buttons.len(), path.display());
    Ok(())
}

/// Upgrade stored button records to the current named shape in place.
///
/// Older files store each button as `[name, fill, type, hotkey, folder, text]`
/// and omit team, tags and the auto window. Returns how many records changed.
pub fn upgrade_button_records(records: &mut Value) -> usize {
    let Some(items) = records.as_array_mut() else {
        return 0;
    };
    let mut upgraded = 0;
    for item in items.iter_mut() {
        let changed = match item {
            Value::Array(fields) => {
                let named = positional_to_named(fields);
                *item = Value::Object(named);
                true
            }
            Value::Object(obj) => fill_missing_fields(obj),
            _ => false,
        };
        if changed {
            upgraded += 1;
        }
    }
    if upgraded > 0 {
        log::info!("Upgraded {} legacy button records", upgraded);
    }
    upgraded
}

fn positional_to_named(fields: &[Value]) -> Map<String, Value> {
    let field = |i: usize| fields.get(i).and_then(Value::as_str).unwrap_or_default();

    let name = field(0).to_string();
    let fill = non_empty(field(1), "#2980b9");
    let cut_type = if field(2).eq_ignore_ascii_case("auto") {
        "auto"
    } else {
        "manual"
    };
    let hotkey = field(3).chars().next().unwrap_or(' ').to_ascii_uppercase();
    let folder = non_empty(field(4), &button::folder_for(&name));
    let text = non_empty(field(5), &fill);

    let mut obj = Map::new();
    obj.insert("name".into(), json!(name));
    obj.insert("fill_color".into(), json!(fill));
    obj.insert("text_color".into(), json!(text));
    obj.insert("cut_type".into(), json!(cut_type));
    obj.insert("hotkey".into(), json!(hotkey.to_string()));
    obj.insert("output_folder".into(), json!(folder));
    fill_missing_fields(&mut obj);
    obj
}

fn fill_missing_fields(obj: &mut Map<String, Value>) -> bool {
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let fill = obj
        .get("fill_color")
        .and_then(Value::as_str)
        .unwrap_or("#2980b9")
        .to_string();

    let defaults = [
        ("fill_color", json!(fill)),
        ("text_color", json!(fill)),
        ("cut_type", json!("manual")),
        ("output_folder", json!(button::folder_for(&name))),
        ("team", json!(team_from_name(&name))),
        ("tag_ids", json!([])),
        ("auto_duration_ms", json!(DEFAULT_AUTO_DURATION_MS)),
    ];
    let mut changed = false;
    for (key, value) in defaults {
        if !obj.contains_key(key) {
            obj.insert(key.to_string(), value);
            changed = true;
        }
    }
    changed
}

fn team_from_name(name: &str) -> &'static str {
    if name.to_uppercase().contains("RIVAL") {
        "away"
    } else {
        "local"
    }
}

fn non_empty(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Load the tag catalog, falling back to the default tags.
pub fn load_tags(path: &Path) -> TagCatalog {
    if !path.exists() {
        return TagCatalog::default();
    }
    match read_document::<TagCatalog>(path) {
        Ok(mut catalog) => {
            catalog.normalize();
            catalog
        }
        Err(e) => {
            log::warn!("Could not read tags {}: {}, using defaults", path.display(), e);
            TagCatalog::default()
        }
    }
}

pub fn save_tags(path: &Path, catalog: &TagCatalog) -> Result<(), DocumentError> {
    write_document(catalog, path)
}

/// Load team names, falling back to `Local`/`Away`.
pub fn load_teams(path: &Path) -> TeamNames {
    if !path.exists() {
        return TeamNames::default();
    }
    read_document(path).unwrap_or_else(|e| {
        log::warn!("Could not read teams {}: {}, using defaults", path.display(), e);
        TeamNames::default()
    })
}

pub fn save_teams(path: &Path, teams: &TeamNames) -> Result<(), DocumentError> {
    write_document(teams, path)
}
