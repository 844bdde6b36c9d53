// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hex color parsing and shading for button and segment rendering.

/// Fallback used when a stored color string cannot be parsed.
pub const FALLBACK_RGB: [u8; 3] = [0x34, 0x98, 0xdb];

/// Parse `#rrggbb` (leading `#` optional).
pub fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Parse a stored color straight into an egui color.
pub fn to_color32(color: &str) -> egui::Color32 {
    let [r, g, b] = parse_hex(color).unwrap_or(FALLBACK_RGB);
    egui::Color32::from_rgb(r, g, b)
}

/// Darken by `amount` percent, e.g. 30 gives 100/130 of each channel.
pub fn darker(rgb: [u8; 3], amount: u32) -> [u8; 3] {
    rgb.map(|c| (c as u32 * 100 / (100 + amount)) as u8)
}

/// Lighten by `amount` percent, saturating at white.
pub fn lighter(rgb: [u8; 3], amount: u32) -> [u8; 3] {
    rgb.map(|c| (c as u32 * (100 + amount) / 100).min(255) as u8)
}
