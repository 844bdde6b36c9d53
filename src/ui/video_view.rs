// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Central video area: file name, playback clock and speed.

use crate::models::playback::PlaybackClock;
use crate::util::time::format_time;
use std::path::Path;

/// Draw the video area. Returns true when the user asks to pick a video.
pub fn show(ui: &mut egui::Ui, video: Option<&Path>, available: bool, clock: &PlaybackClock) -> bool {
    let mut open_requested = false;
    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), ui.available_height().max(160.0)),
        egui::Sense::hover(),
    );
    ui.painter().rect_filled(rect, 4.0, egui::Color32::from_gray(18));

    ui.allocate_ui_at_rect(rect.shrink(12.0), |ui| {
        ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
            open_requested = contents(ui, rect.height(), video, available, clock);
        });
    });
    open_requested
}

fn contents(ui: &mut egui::Ui, height: f32, video: Option<&Path>, available: bool, clock: &PlaybackClock) -> bool {
    ui.add_space((height / 2.0 - 70.0).max(0.0));

    let Some(video) = video else {
        ui.label(
            egui::RichText::new("No video loaded")
                .size(22.0)
                .color(egui::Color32::from_gray(160)),
        );
        return ui.button("🎬 Open video...").clicked();
    };

    let mut open_requested = false;
    let file_name = video
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| video.display().to_string());
    ui.label(egui::RichText::new(file_name).size(16.0).color(egui::Color32::from_gray(200)));

    if !available {
        ui.colored_label(
            egui::Color32::from_rgb(0xf3, 0x9c, 0x12),
            "⚠ Video file not found. Clips are kept, but rendering is disabled until it is relinked.",
        );
        if ui.button("Relink video...").clicked() {
            open_requested = true;
        }
    }

    ui.add_space(8.0);
    ui.label(
        egui::RichText::new(format!(
            "{} / {}",
            format_time(clock.position_ms()),
            format_time(clock.duration_ms())
        ))
        .monospace()
        .size(40.0)
        .color(egui::Color32::WHITE),
    );
    let state = if clock.is_playing() { "▶ playing" } else { "⏸ paused" };
    ui.label(
        egui::RichText::new(format!("{state}   {}x", clock.speed()))
            .size(15.0)
            .color(egui::Color32::from_gray(170)),
    );
    open_requested
}
