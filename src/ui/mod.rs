// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components. Each panel renders state it is handed and reports what the
//! user asked for; the app applies it.

pub mod button_bank;
pub mod clip_panel;
pub mod config_editor;
pub mod dialogs;
pub mod playlist;
pub mod timeline;
pub mod toolbar;
pub mod video_view;
