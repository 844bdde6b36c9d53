// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project document migration.
//!
//! Version 0 documents carry no `version` field, use Spanish keys and store
//! dates as `YYYY-MM-DD HH:MM:SS`. They are rewritten in place to the
//! current layout before being parsed.

use super::config::upgrade_button_records;
use crate::error::{ProjectError, ProjectResult};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

/// Current project document version.
pub const CURRENT_VERSION: u32 = 1;

const LEGACY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FALLBACK_CLIP_COLOR: &str = "#3498db";

/// Bring a project document up to [`CURRENT_VERSION`]. Returns the version
/// the document was found at.
pub fn migrate_project(value: &mut Value) -> ProjectResult<u32> {
    let obj = value
        .as_object_mut()
        .ok_or_else(|| ProjectError::InvalidProject {
            reason: "project root must be an object".into(),
        })?;

    let version = extract_version(obj)?;
    if version > CURRENT_VERSION {
        return Err(ProjectError::UnsupportedVersion {
            version: version.to_string(),
        });
    }

    if version == 0 {
        log::info!("Migrating project document from version 0");
        migrate_v0_to_v1(obj);
    }

    // Button records may still be positional even in current documents
    // written by hand, so this runs regardless of version.
    if let Some(buttons) = obj.get_mut("button_config") {
        upgrade_button_records(buttons);
    }
    if let Some(buttons) = obj
        .get_mut("metadata")
        .and_then(|m| m.get_mut("button_config"))
    {
        upgrade_button_records(buttons);
    }

    obj.insert("version".into(), json!(CURRENT_VERSION));
    Ok(version)
}

fn extract_version(obj: &Map<String, Value>) -> ProjectResult<u32> {
    match obj.get("version") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| ProjectError::UnsupportedVersion {
                version: n.to_string(),
            }),
        Some(Value::String(s)) => {
            let major = s.split('.').next().unwrap_or_default();
            major
                .trim()
                .parse()
                .map_err(|_| ProjectError::UnsupportedVersion { version: s.clone() })
        }
        Some(other) => Err(ProjectError::InvalidProject {
            reason: format!("version must be a number, found {other}"),
        }),
    }
}

fn migrate_v0_to_v1(obj: &mut Map<String, Value>) {
    rename_keys(
        obj,
        &[
            ("nombre", "name"),
            ("fecha_creacion", "created_at"),
            ("cortes", "cuts"),
            ("botonera_config", "button_config"),
        ],
    );
    convert_date(obj, "created_at");

    if let Some(Value::Array(cuts)) = obj.get_mut("cuts") {
        for (index, cut) in cuts.iter_mut().enumerate() {
            if let Value::Object(cut) = cut {
                migrate_cut(cut, index);
            }
        }
    }

    let metadata = obj
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(metadata) = metadata {
        migrate_metadata(metadata);
    }
}

fn migrate_cut(cut: &mut Map<String, Value>, index: usize) {
    // `nom` and `categoria` hold the same value; keep one.
    if cut.contains_key("nom") {
        cut.remove("categoria");
    }
    cut.remove("tiempo");
    rename_keys(
        cut,
        &[
            ("ini", "start_ms"),
            ("fin", "end_ms"),
            ("nom", "category"),
            ("categoria", "category"),
            ("nombre", "name"),
            ("numero", "sequence_number"),
            ("notas", "notes"),
        ],
    );
    for key in ["start_ms", "end_ms"] {
        if let Some(v) = cut.get_mut(key) {
            *v = json!(non_negative_ms(v));
        }
    }
    cut.entry("name").or_insert_with(|| json!("Clip"));
    cut.entry("color").or_insert_with(|| json!(FALLBACK_CLIP_COLOR));
    cut.entry("sequence_number")
        .or_insert_with(|| json!(index + 1));
}

fn migrate_metadata(metadata: &mut Map<String, Value>) {
    rename_keys(
        metadata,
        &[
            ("total_clips", "clip_count"),
            ("video_duracion", "video_duration_ms"),
            ("fecha_modificacion", "modified_at"),
            ("formaciones_guardadas", "formation_snapshots"),
        ],
    );
    convert_date(metadata, "modified_at");
    if let Some(v) = metadata.get_mut("video_duration_ms") {
        // The old player reported -1 for an unknown duration.
        *v = json!(non_negative_ms(v));
    }

    if let Some(Value::Array(snapshots)) = metadata.get_mut("formation_snapshots") {
        for snapshot in snapshots.iter_mut() {
            if let Value::Object(snapshot) = snapshot {
                migrate_snapshot(snapshot);
            }
        }
    }
}

fn migrate_snapshot(snapshot: &mut Map<String, Value>) {
    rename_keys(
        snapshot,
        &[
            ("minuto", "match_clock_secs"),
            ("formacion", "formation"),
            ("jugadores", "players"),
            ("notas", "notes"),
        ],
    );
    if let Some(v) = snapshot.get_mut("match_clock_secs") {
        *v = json!(non_negative_ms(v));
    }
    if let Some(stamp) = snapshot.remove("timestamp") {
        let captured = stamp
            .as_f64()
            .and_then(|secs| Utc.timestamp_millis_opt((secs * 1000.0) as i64).single());
        if let Some(captured) = captured {
            snapshot.insert("captured_at".into(), json!(captured.to_rfc3339()));
        }
    }
}

fn rename_keys(obj: &mut Map<String, Value>, renames: &[(&str, &str)]) {
    for (from, to) in renames {
        if obj.contains_key(*to) {
            continue;
        }
        if let Some(value) = obj.remove(*from) {
            obj.insert((*to).to_string(), value);
        }
    }
}

/// Rewrite a legacy local date string as RFC 3339. Unparseable values are
/// removed so that the field falls back to its default.
fn convert_date(obj: &mut Map<String, Value>, key: &str) {
    let Some(Value::String(text)) = obj.get(key) else {
        return;
    };
    if DateTime::parse_from_rfc3339(text).is_ok() {
        return;
    }
    match parse_legacy_date(text) {
        Some(date) => {
            obj.insert(key.to_string(), json!(date.to_rfc3339()));
        }
        None => {
            log::warn!("Dropping unreadable date {key} = {text:?}");
            obj.remove(key);
        }
    }
}

pub(crate) fn parse_legacy_date(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text.trim(), LEGACY_DATE_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn non_negative_ms(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_f64().map(|f| f.max(0.0) as u64))
        .unwrap_or(0)
}
