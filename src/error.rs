// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for configuration, cutting, persistence and export.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or writing a structured document (JSON or YAML).
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported document extension: {0:?}")]
    UnsupportedExtension(Option<String>),
}

/// A single problem found in a button configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("The button bank cannot be empty")]
    Empty,

    #[error("Hotkey '{hotkey}' is used by both '{first}' and '{second}'")]
    DuplicateHotkey {
        hotkey: char,
        first: String,
        second: String,
    },

    #[error("Button name '{name}' is used more than once")]
    DuplicateName { name: String },

    #[error("Button {index} has no name")]
    BlankName { index: usize },

    #[error("Auto button '{name}' needs a look-back window longer than zero")]
    ZeroAutoWindow { name: String },
}

/// Errors from the button configuration store.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Invalid button configuration: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Rejected cut operations. None of these corrupt registry state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CutError {
    #[error("No button named '{0}' in the current configuration")]
    UnknownCategory(String),

    #[error("Cut for '{category}' ends at {end_ms} ms, not after its start at {start_ms} ms")]
    InvalidRange {
        category: String,
        start_ms: u64,
        end_ms: u64,
    },

    #[error("No manual cut is waiting for its end mark")]
    NothingArmed,

    #[error("Every manual button already has a cut in progress")]
    NothingToArm,

    #[error("No clip {index} in '{category}'")]
    NoSuchClip { category: String, index: usize },

    #[error("Clip #{sequence_number} of '{category}' no longer exists")]
    ClipGone { category: String, sequence_number: u32 },
}

/// Errors from project persistence.
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Invalid project file: {reason}")]
    InvalidProject { reason: String },

    #[error("Unsupported project version: {version}")]
    UnsupportedVersion { version: String },

    #[error("Project file not found: {}", .path.display())]
    NotFound { path: PathBuf },
}

impl From<std::io::Error> for ProjectError {
    fn from(err: std::io::Error) -> Self {
        ProjectError::Document(DocumentError::Io(err))
    }
}

impl From<serde_json::Error> for ProjectError {
    fn from(err: serde_json::Error) -> Self {
        ProjectError::Document(DocumentError::Json(err))
    }
}

/// Errors from the external media tool and the export pipeline.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("There are no clips to export")]
    NoClips,

    #[error("Could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed:\n{stderr}")]
    Tool { program: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProjectResult<T> = Result<T, ProjectError>;
