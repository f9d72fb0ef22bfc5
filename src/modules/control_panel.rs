//! The filter control panel: one labelled text box plus a 0–200 slider per control.
//!
//! The panel never validates what the user types. Every edit is handed to the
//! change handler as `(id, raw_value)` and the handler decides what to keep.

use eframe::egui;
use std::collections::HashMap;

use crate::style::{ColorPalette, ThemeMode};
use super::filters::{FilterControl, FILTER_MAX, FILTER_MIN};

#[derive(Debug, Clone, PartialEq)]
pub struct ControlRow {
    pub id: String,
    pub label: String,
    pub value: f32,
    pub text: String,
    pub enabled: bool,
}

pub fn build_rows(controls: &[FilterControl], has_image: bool) -> Vec<ControlRow> {
    controls
        .iter()
        .map(|c| ControlRow {
            id: c.id.clone(),
            label: c.label.clone(),
            value: c.value,
            text: format!("{}", c.value),
            enabled: has_image,
        })
        .collect()
}

/// Text being typed into a control's box, kept while that box has focus.
#[derive(Default)]
pub struct ControlPanelState {
    editing: HashMap<String, String>,
}

pub fn render_control_panel(
    ui: &mut egui::Ui,
    panel: &mut ControlPanelState,
    rows: &[ControlRow],
    theme: ThemeMode,
    mut on_change: impl FnMut(&str, &str),
) {
    let label_col = match theme {
        ThemeMode::Dark => ColorPalette::ZINC_300,
        ThemeMode::Light => ColorPalette::GRAY_800,
    };
    ui.spacing_mut().slider_width = (ui.available_width() - 16.0).max(80.0);

    for row in rows {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(&row.label).size(13.0).color(label_col));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let buffer = panel.editing.entry(row.id.clone()).or_insert_with(|| row.text.clone());
                let response = ui.add_enabled(
                    row.enabled,
                    egui::TextEdit::singleline(buffer)
                        .desired_width(80.0)
                        .horizontal_align(egui::Align::Center),
                );
                if response.changed() {
                    on_change(&row.id, buffer.as_str());
                }
                if !response.has_focus() {
                    *buffer = row.text.clone();
                }
            });
        });

        let mut value = row.value;
        let slider = egui::Slider::new(&mut value, FILTER_MIN..=FILTER_MAX)
            .step_by(1.0)
            .show_value(false);
        if ui.add_enabled(row.enabled, slider).changed() {
            on_change(&row.id, &format!("{value}"));
        }
        ui.add_space(6.0);
    }
}
