// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Coordinate transformations between timeline pixels and media time.
//!
//! The timeline maps `[0, duration_ms]` linearly onto `[0, width_px]`.
//! Both functions treat a zero duration or width as degenerate and
//! collapse to the origin instead of dividing by zero.

/// Pixels covered by one millisecond at the given width.
pub fn px_per_ms(width_px: f32, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    width_px as f64 / duration_ms as f64
}

/// Convert a media position to a horizontal pixel offset.
pub fn ms_to_x(ms: u64, duration_ms: u64, width_px: f32) -> f32 {
    (ms as f64 * px_per_ms(width_px, duration_ms)) as f32
}

/// Convert a horizontal pixel offset to a media position, clamped to the media.
pub fn x_to_ms(x: f32, width_px: f32, duration_ms: u64) -> u64 {
    if width_px <= 0.0 || duration_ms == 0 {
        return 0;
    }
    let ratio = (x / width_px).clamp(0.0, 1.0) as f64;
    (ratio * duration_ms as f64) as u64
}
