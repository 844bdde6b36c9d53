// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Cut button bank, one row per team.

use crate::models::button::{ButtonDefinition, Team};
use crate::models::project::TeamNames;
use crate::models::registry::ClipRegistry;
use crate::util::color::{darker, lighter, parse_hex, to_color32, FALLBACK_RGB};

const BUTTON_SIZE: egui::Vec2 = egui::vec2(150.0, 42.0);

/// Display the bank. Returns the category whose button was clicked.
///
/// Armed manual buttons alternate between their fill and a lighter shade
/// while `blink_on` toggles.
pub fn show(
    ui: &mut egui::Ui,
    registry: &ClipRegistry,
    teams: &TeamNames,
    blink_on: bool,
) -> Option<String> {
    let mut clicked = None;
    for (team, title) in [
        (Team::Local, teams.local.as_str()),
        (Team::Away, teams.away.as_str()),
        (Team::Both, "Both"),
    ] {
        let row: Vec<&ButtonDefinition> = registry
            .categories()
            .iter()
            .map(|c| &c.button)
            .filter(|b| b.team == team)
            .collect();
        if row.is_empty() {
            continue;
        }
        ui.horizontal_wrapped(|ui| {
            ui.add_sized([80.0, BUTTON_SIZE.y], egui::Label::new(egui::RichText::new(title).strong()));
            for button in row {
                let armed = registry.is_armed(&button.name);
                if cut_button(ui, button, armed && blink_on, armed).clicked() {
                    clicked = Some(button.name.clone());
                }
            }
        });
    }
    clicked
}

fn cut_button(ui: &mut egui::Ui, button: &ButtonDefinition, highlight: bool, armed: bool) -> egui::Response {
    let fill = parse_hex(&button.fill_color).unwrap_or(FALLBACK_RGB);
    let shown = if highlight { lighter(fill, 40) } else { fill };
    let [r, g, b] = shown;
    let [br, bg, bb] = darker(fill, 50);

    let label = egui::RichText::new(format!("{} [{}]", button.name, button.hotkey))
        .color(to_color32(&button.text_color))
        .strong();
    let widget = egui::Button::new(label)
        .fill(egui::Color32::from_rgb(r, g, b))
        .stroke(egui::Stroke::new(2.0, egui::Color32::from_rgb(br, bg, bb)))
        .rounding(5.0)
        .min_size(BUTTON_SIZE);

    let hover = if armed {
        format!("{}: recording, press again to close the cut", button.name)
    } else {
        format!("{} ({} cut)", button.name, button.cut_type)
    };
    ui.add(widget).on_hover_text(hover)
}
