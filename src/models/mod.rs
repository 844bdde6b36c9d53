// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Core data model: buttons, clips, cut state, playback and projects.

pub mod button;
pub mod clip;
pub mod cut;
pub mod playback;
pub mod project;
pub mod registry;
pub mod tag;
