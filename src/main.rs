// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! MatchCut - football match video annotation
//!
//! Mark clips against a playing match video with a configurable button
//! bank, organise them by team, category and tag, and export them through
//! ffmpeg as single clips, playlists or one full project reel.

mod app;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::AnalyzerApp;
use io::paths::AppPaths;
use io::settings::Settings;

/// Overrides the platform data root.
const ROOT_ENV: &str = "MATCHCUT_ROOT";

fn main() -> Result<()> {
    // Initialize logging, `info` unless RUST_LOG says otherwise
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths = match std::env::var_os(ROOT_ENV) {
        Some(root) => AppPaths::new(root),
        None => AppPaths::platform_default(),
    };
    paths
        .ensure_layout()
        .with_context(|| format!("Could not create data folders under {}", paths.root().display()))?;
    let settings = Settings::load_or_init(&paths.settings_file());
    log::info!("Data root {}", paths.root().display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([1000.0, 640.0])
            .with_title("MatchCut - Football Video Analysis"),
        ..Default::default()
    };

    eframe::run_native(
        "MatchCut",
        options,
        Box::new(move |_cc| Ok(Box::new(AnalyzerApp::new(paths, settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
