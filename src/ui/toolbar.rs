// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transport bar: playback controls, speed, go-to-time and timeline zoom.

use super::timeline::{TimelineView, ZOOM_MAX, ZOOM_MIN};
use crate::models::playback::PlaybackClock;
use crate::util::time::{format_time, parse_time};

/// What the user asked the transport bar to do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    TogglePlay,
    /// Relative seek in milliseconds.
    Seek(i64),
    /// Relative single-frame step in milliseconds.
    Step(i64),
    Slower,
    Faster,
    GoTo(u64),
    Screenshot,
    MarkStart,
    MarkEnd,
}

/// Display the transport bar. `goto_text` holds the go-to field between frames.
pub fn show(
    ui: &mut egui::Ui,
    clock: &PlaybackClock,
    seek_step_ms: u64,
    frame_step_ms: u64,
    goto_text: &mut String,
    view: &mut TimelineView,
) -> Option<TransportAction> {
    let mut action = None;
    let seek = seek_step_ms as i64;
    let frame = frame_step_ms as i64;
    let has_video = clock.duration_ms() > 0;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 6.0;
        ui.add_enabled_ui(has_video, |ui| {
            if ui.button("⏪").on_hover_text("Back (←)").clicked() {
                action = Some(TransportAction::Seek(-seek));
            }
            if ui.button("◀|").on_hover_text("Previous frame (,)").clicked() {
                action = Some(TransportAction::Step(-frame));
            }
            let play_label = if clock.is_playing() { "⏸" } else { "▶" };
            if ui.button(play_label).on_hover_text("Play/Pause (Space)").clicked() {
                action = Some(TransportAction::TogglePlay);
            }
            if ui.button("|▶").on_hover_text("Next frame (.)").clicked() {
                action = Some(TransportAction::Step(frame));
            }
            if ui.button("⏩").on_hover_text("Forward (→)").clicked() {
                action = Some(TransportAction::Seek(seek));
            }

            ui.separator();
            if ui.small_button("−").on_hover_text("Slower (↓)").clicked() {
                action = Some(TransportAction::Slower);
            }
            ui.label(format!("{}x", clock.speed()));
            if ui.small_button("+").on_hover_text("Faster (↑)").clicked() {
                action = Some(TransportAction::Faster);
            }

            ui.separator();
            ui.label(
                egui::RichText::new(format!(
                    "{} / {}",
                    format_time(clock.position_ms()),
                    format_time(clock.duration_ms())
                ))
                .monospace(),
            );

            ui.separator();
            let field = ui.add(
                egui::TextEdit::singleline(goto_text)
                    .desired_width(70.0)
                    .hint_text("MM:SS"),
            );
            let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Go").clicked() || submitted {
                if let Some(ms) = parse_time(goto_text) {
                    action = Some(TransportAction::GoTo(ms));
                    goto_text.clear();
                }
            }

            ui.separator();
            if ui.button("[ Start").on_hover_text("Mark start ([)").clicked() {
                action = Some(TransportAction::MarkStart);
            }
            if ui.button("End ]").on_hover_text("Mark end (])").clicked() {
                action = Some(TransportAction::MarkEnd);
            }
            if ui.button("📷").on_hover_text("Screenshot").clicked() {
                action = Some(TransportAction::Screenshot);
            }
        });

        ui.separator();
        ui.add(egui::Slider::new(&mut view.zoom, ZOOM_MIN..=ZOOM_MAX).text("Zoom"));
        ui.checkbox(&mut view.follow, "Follow");
    });

    action
}
