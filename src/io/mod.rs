// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Filesystem, persistence and external media tool access.

pub mod autosave;
pub mod config;
pub mod export;
pub mod media;
pub mod migrate;
pub mod paths;
pub mod project;
pub mod serialization;
pub mod settings;
