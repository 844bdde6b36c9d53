// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Structured document serialization and deserialization.
//!
//! Every document the application stores (projects, button bank, tags,
//! teams, settings, clip list exports) goes through here. The format is
//! picked from the file extension: `.json` or `.yaml`/`.yml`.

use crate::error::DocumentError;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Supported on-disk formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(DocumentFormat::Json),
            Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
            _ => Err(DocumentError::UnsupportedExtension(extension)),
        }
    }
}

/// Write a document, replacing any existing file only once the new one is complete.
pub fn write_document<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<(), DocumentError> {
    let text = match DocumentFormat::from_path(path)? {
        DocumentFormat::Json => serde_json::to_string_pretty(data)?,
        DocumentFormat::Yaml => serde_yaml::to_string(data)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = std::path::PathBuf::from(temp_name);
    std::fs::write(&temp_path, text)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Read a typed document.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, DocumentError> {
    let text = std::fs::read_to_string(path)?;
    let data = match DocumentFormat::from_path(path)? {
        DocumentFormat::Json => serde_json::from_str(&text)?,
        DocumentFormat::Yaml => serde_yaml::from_str(&text)?,
    };
    Ok(data)
}

/// Read a document as an untyped tree so it can be migrated before parsing.
pub fn read_value(path: &Path) -> Result<serde_json::Value, DocumentError> {
    read_document(path)
}
