// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Clickable match timeline.
//!
//! The timeline is drawn in two steps: [`layout`] turns the registry's
//! segments and marks plus the playback position into pixel geometry, and
//! [`show`] paints that geometry and turns clicks into seek targets.

use crate::models::clip::{TimelineMark, TimelineSegment};
use crate::util::color::to_color32;
use crate::util::geometry::{ms_to_x, px_per_ms, x_to_ms};
use crate::util::time::tick_label;

pub const TIMELINE_HEIGHT: f32 = 75.0;
/// Closest two tick labels may sit before the scale coarsens.
const MIN_LABEL_SPACING_PX: f64 = 60.0;
/// Minute ticks further apart than this switch to 10 s ticks.
const MAX_MINUTE_SPACING_PX: f64 = 250.0;
/// Narrower segments are drawn without a label.
const MIN_LABELLED_SEGMENT_PX: f32 = 50.0;
const MAX_LABEL_CHARS: usize = 15;

pub const ZOOM_MIN: u32 = 10;
pub const ZOOM_MAX: u32 = 2000;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0x1e, 0x27, 0x2e);
const TICK_COLOR: egui::Color32 = egui::Color32::from_rgb(0x7f, 0x8c, 0x8d);
const PLAYHEAD_COLOR: egui::Color32 = egui::Color32::from_rgb(0x2e, 0xcc, 0x71);

/// Spacing between scale ticks for the given density.
///
/// Minutes by default; five then ten minutes when minute labels would
/// collide; ten seconds when minutes are spread very wide. The last rule
/// overrides the others.
pub fn tick_spacing_ms(px_per_ms: f64) -> u64 {
    let mut spacing = 60_000;
    if px_per_ms * 60_000.0 < MIN_LABEL_SPACING_PX {
        spacing = 300_000;
    }
    if px_per_ms * 300_000.0 < MIN_LABEL_SPACING_PX {
        spacing = 600_000;
    }
    if px_per_ms * 60_000.0 > MAX_MINUTE_SPACING_PX {
        spacing = 10_000;
    }
    spacing
}

/// Rendered width for a zoom factor; 10 is 1x, 2000 is 200x.
pub fn zoomed_width(viewport_width: f32, zoom: u32) -> f32 {
    viewport_width * zoom.clamp(ZOOM_MIN, ZOOM_MAX) as f32 / 10.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub x: f32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentBox {
    pub x_start: f32,
    pub x_end: f32,
    pub color: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkLine {
    pub x: f32,
    pub color: String,
}

/// Pixel geometry of one frame of the timeline, relative to its left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub ticks: Vec<Tick>,
    pub segments: Vec<SegmentBox>,
    pub marks: Vec<MarkLine>,
    pub playhead_x: f32,
}

/// Lay out the timeline. `None` when there is no duration to map onto,
/// in which case only the background is drawn.
pub fn layout(
    width: f32,
    duration_ms: u64,
    position_ms: u64,
    segments: &[TimelineSegment],
    marks: &[TimelineMark],
) -> Option<TimelineLayout> {
    if duration_ms == 0 || width <= 0.0 {
        return None;
    }
    let spacing = tick_spacing_ms(px_per_ms(width, duration_ms));
    let ticks = (0..duration_ms)
        .step_by(spacing as usize)
        .map(|ms| Tick {
            x: ms_to_x(ms, duration_ms, width),
            label: tick_label(ms),
        })
        .collect();

    let segments = segments
        .iter()
        .map(|s| {
            let x_start = ms_to_x(s.start_ms, duration_ms, width);
            let x_end = ms_to_x(s.end_ms, duration_ms, width);
            let label = (x_end - x_start > MIN_LABELLED_SEGMENT_PX)
                .then(|| s.name.chars().take(MAX_LABEL_CHARS).collect());
            SegmentBox {
                x_start,
                x_end,
                color: s.color.clone(),
                label,
            }
        })
        .collect();

    let marks = marks
        .iter()
        .map(|m| MarkLine {
            x: ms_to_x(m.position_ms, duration_ms, width),
            color: m.color.clone(),
        })
        .collect();

    Some(TimelineLayout {
        ticks,
        segments,
        marks,
        playhead_x: ms_to_x(position_ms.min(duration_ms), duration_ms, width),
    })
}

/// Position a click at `x` pixels from the left edge seeks to.
pub fn seek_target(x: f32, width: f32, duration_ms: u64) -> Option<u64> {
    (duration_ms > 0).then(|| x_to_ms(x, width, duration_ms))
}

/// View state that outlives a frame.
#[derive(Debug, Clone)]
pub struct TimelineView {
    pub zoom: u32,
    /// Keep the playhead in view while playing.
    pub follow: bool,
}

impl Default for TimelineView {
    fn default() -> Self {
        Self {
            zoom: ZOOM_MIN,
            follow: true,
        }
    }
}

/// Draw the timeline. Returns the position to seek to when clicked.
pub fn show(
    ui: &mut egui::Ui,
    view: &TimelineView,
    duration_ms: u64,
    position_ms: u64,
    playing: bool,
    segments: &[TimelineSegment],
    marks: &[TimelineMark],
) -> Option<u64> {
    let mut target = None;
    egui::ScrollArea::horizontal()
        .id_source("timeline_scroll")
        .show(ui, |ui| {
            let width = zoomed_width(ui.available_width(), view.zoom);
            let (rect, response) =
                ui.allocate_exact_size(egui::vec2(width, TIMELINE_HEIGHT), egui::Sense::click());
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, BACKGROUND);

            let Some(geometry) = layout(width, duration_ms, position_ms, segments, marks) else {
                return;
            };
            paint(&painter, rect, &geometry);

            if view.follow && playing {
                let head = egui::Rect::from_center_size(
                    egui::pos2(rect.left() + geometry.playhead_x, rect.center().y),
                    egui::vec2(40.0, TIMELINE_HEIGHT),
                );
                ui.scroll_to_rect(head, None);
            }

            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    target = seek_target(pos.x - rect.left(), width, duration_ms);
                }
            }
            response.on_hover_text("Click to seek");
        });
    target
}

fn paint(painter: &egui::Painter, rect: egui::Rect, geometry: &TimelineLayout) {
    let left = rect.left();
    let top = rect.top();
    let h = rect.height();
    let font = egui::FontId::proportional(10.0);

    for tick in &geometry.ticks {
        let x = left + tick.x;
        painter.line_segment(
            [egui::pos2(x, top + h - 25.0), egui::pos2(x, top + h - 10.0)],
            egui::Stroke::new(1.0, TICK_COLOR),
        );
        painter.text(
            egui::pos2(x + 3.0, top + h - 28.0),
            egui::Align2::LEFT_BOTTOM,
            &tick.label,
            font.clone(),
            TICK_COLOR,
        );
    }

    for segment in &geometry.segments {
        let body = egui::Rect::from_min_max(
            egui::pos2(left + segment.x_start, top + 5.0),
            egui::pos2(left + segment.x_end.max(segment.x_start + 1.0), top + h - 30.0),
        );
        painter.rect_filled(body, 0.0, to_color32(&segment.color));
        if let Some(label) = &segment.label {
            painter.text(
                egui::pos2(body.left() + 5.0, top + 8.0),
                egui::Align2::LEFT_TOP,
                label,
                egui::FontId::proportional(11.0),
                egui::Color32::WHITE,
            );
        }
    }

    for mark in &geometry.marks {
        let x = left + mark.x;
        painter.line_segment(
            [egui::pos2(x, top + 5.0), egui::pos2(x, top + h - 30.0)],
            egui::Stroke::new(4.0, to_color32(&mark.color)),
        );
    }

    let x = left + geometry.playhead_x;
    painter.line_segment(
        [egui::pos2(x, top), egui::pos2(x, top + h)],
        egui::Stroke::new(3.0, PLAYHEAD_COLOR),
    );
    painter.circle_filled(egui::pos2(x, top + h - 36.0), 4.0, PLAYHEAD_COLOR);
}
