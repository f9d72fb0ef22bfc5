use eframe::egui;

use crate::error::EditorError;
use crate::modules::control_panel::{self, ControlRow};
use crate::style::{self, ColorPalette, ThemeMode};
use super::pe_main::{EditorPhase, ExportKind, PhotoEditor};
use super::pe_text::RgbaColor;

impl PhotoEditor {
    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, theme: ThemeMode) {
        if let Err(e) = self.poll_load() {
            self.notify_error(&e);
        }
        if matches!(self.phase, EditorPhase::Loading { .. }) {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        egui::SidePanel::right("premagic_controls")
            .resizable(true)
            .default_width(300.0)
            .min_width(240.0)
            .show_inside(ui, |ui| {
                egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                    ui.add_space(8.0);
                    self.render_filter_section(ui, theme);
                    ui.separator();
                    self.render_text_section(ui, theme);
                    ui.separator();
                    self.render_export_section(ui, theme);
                });
            });

        egui::CentralPanel::default().show_inside(ui, |ui| self.render_canvas(ui, ctx));
    }

    fn render_filter_section(&mut self, ui: &mut egui::Ui, theme: ThemeMode) {
        style::section_heading(ui, "Filters", theme);
        let rows: Vec<ControlRow> = control_panel::build_rows(&self.state.editor_controls, self.state.has_image());
        let mut changes: Vec<(String, String)> = Vec::new();
        control_panel::render_control_panel(ui, &mut self.control_panel, &rows, theme, |id, value| {
            changes.push((id.to_string(), value.to_string()));
        });
        for (id, value) in changes {
            match self.handle_change(&id, &value) {
                Ok(()) => {}
                // Half-typed numbers are expected while the box has focus.
                Err(EditorError::InvalidFilterValue { .. }) => log::debug!("ignoring {value:?} for {id}"),
                Err(e) => self.notify_error(&e),
            }
        }
        if let Some(filter) = &self.filter_data {
            ui.label(egui::RichText::new(filter).size(11.0).color(ColorPalette::ZINC_500).monospace());
        }
    }

    fn render_text_section(&mut self, ui: &mut egui::Ui, theme: ThemeMode) {
        style::section_heading(ui, "Text", theme);

        let mut text = self.state.text_control.text.clone();
        ui.horizontal(|ui| {
            let edit = egui::TextEdit::singleline(&mut text).hint_text("Add text").desired_width(ui.available_width() - 70.0);
            if ui.add(edit).changed() {
                self.handle_input_text(&text);
            }
            if ui.add_enabled(!text.is_empty(), egui::Button::new("Delete")).clicked() {
                self.handle_delete_text();
            }
        });

        ui.horizontal(|ui| {
            ui.label("Size:");
            let mut size = self.font_size_input;
            if ui.add(egui::DragValue::new(&mut size).range(8.0..=400.0).speed(1.0)).changed() {
                self.handle_font_size(size);
            }

            ui.label("Font:");
            let current = self.state.text_control.font_family.clone();
            let mut picked: Option<String> = None;
            egui::ComboBox::from_id_salt("premagic_font_family")
                .selected_text(current.as_str())
                .show_ui(ui, |ui| {
                    for family in &self.font_families {
                        if ui.selectable_label(*family == current, family.as_str()).clicked() {
                            picked = Some(family.clone());
                        }
                    }
                });
            if let Some(family) = picked {
                self.handle_font_style(&family);
            }
        });

        let mut clicked: Option<String> = None;
        ui.horizontal_wrapped(|ui| {
            for swatch in &self.state.colors {
                let fill = RgbaColor::from_css(&swatch.value)
                    .map(|c| egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a))
                    .unwrap_or(egui::Color32::TRANSPARENT);
                let selected = self.state.text_control.color == swatch.value;
                let stroke = if selected {
                    egui::Stroke::new(2.0, ColorPalette::BLUE_500)
                } else {
                    egui::Stroke::new(1.0, ColorPalette::ZINC_500)
                };
                let button = egui::Button::new("").fill(fill).stroke(stroke).min_size(egui::vec2(22.0, 22.0));
                if ui.add(button).on_hover_text(swatch.name.as_str()).clicked() {
                    clicked = Some(swatch.name.clone());
                }
            }
        });
        if let Some(name) = clicked {
            self.handle_color_click(&name);
        }
        ui.weak("Drag on the image to move the text.");
    }

    fn render_export_section(&mut self, ui: &mut egui::Ui, theme: ThemeMode) {
        style::section_heading(ui, "Export", theme);
        ui.horizontal_wrapped(|ui| {
            for kind in [ExportKind::Image, ExportKind::Metadata] {
                if ui.add_enabled(self.can_export(kind), egui::Button::new(kind.label())).clicked() {
                    self.export_with_dialog(kind);
                }
            }
            if ui.button("Reset").clicked() {
                self.handle_reset();
            }
        });
    }

    /// Asks where to save, starting in the download folder, then exports there.
    pub fn export_with_dialog(&mut self, kind: ExportKind) {
        let (label, extension) = kind.filter();
        let mut dialog = rfd::FileDialog::new()
            .set_file_name(kind.file_name())
            .add_filter(label, &[extension]);
        if let Some(dir) = &self.download_dir {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.save_file() {
            self.export(kind, &path);
        }
    }

    fn image_rect(&self) -> Option<egui::Rect> {
        let canvas = self.canvas_rect?;
        let surface = self.surface.as_ref()?;
        if surface.is_empty() { return None; }
        let size = egui::vec2(surface.width() as f32 * self.zoom, surface.height() as f32 * self.zoom);
        Some(egui::Rect::from_center_size(canvas.center() + self.pan, size))
    }

    fn screen_to_surface(&self, screen_pos: egui::Pos2) -> Option<(f32, f32)> {
        let rect = self.image_rect()?;
        if !rect.contains(screen_pos) { return None; }
        Some(((screen_pos.x - rect.min.x) / self.zoom, (screen_pos.y - rect.min.y) / self.zoom))
    }

    fn fit_image(&mut self) {
        if let (Some(surface), Some(canvas)) = (&self.surface, self.canvas_rect) {
            if surface.is_empty() { return; }
            let sx = canvas.width() / surface.width() as f32;
            let sy = canvas.height() / surface.height() as f32;
            self.zoom = sx.min(sy).min(1.0).max(0.01);
            self.pan = egui::Vec2::ZERO;
            self.fit_on_next_frame = false;
        }
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        self.attach_surface();
        let canvas_rect: egui::Rect = ui.available_rect_before_wrap();
        self.canvas_rect = Some(canvas_rect);
        let (rect, response) = ui.allocate_exact_size(canvas_rect.size(), egui::Sense::click_and_drag());

        if response.drag_started_by(egui::PointerButton::Primary) {
            let origin = ui.input(|i| i.pointer.press_origin()).or(response.interact_pointer_pos());
            if let Some((x, y)) = origin.and_then(|p| self.screen_to_surface(p)) {
                self.pointer_down(x, y);
            }
        }
        if response.dragged_by(egui::PointerButton::Primary) && self.is_dragging() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(rect) = self.image_rect() {
                    let x = (pos.x - rect.min.x) / self.zoom;
                    let y = (pos.y - rect.min.y) / self.zoom;
                    self.pointer_move(x, y);
                }
            }
        }
        if response.drag_stopped_by(egui::PointerButton::Primary) {
            self.pointer_up();
        }
        if response.dragged_by(egui::PointerButton::Middle) {
            self.pan += response.drag_delta();
        }
        let scroll: f32 = ui.input(|i| i.raw_scroll_delta.y);
        if scroll != 0.0 && response.hovered() {
            let factor: f32 = if scroll > 0.0 { 1.1 } else { 1.0 / 1.1 };
            self.zoom = (self.zoom * factor).clamp(0.01, 50.0);
        }

        if let Err(e) = self.recompute_render() {
            self.notify_error(&e);
        }
        if self.fit_on_next_frame { self.fit_image(); }

        let painter: egui::Painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);

        let img_rect = self.image_rect();
        let texture = self.surface.as_mut().and_then(|s| s.ensure_texture(ctx)).map(|t| t.id());
        match (texture, img_rect) {
            (Some(tex), Some(img_rect)) => {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(tex, img_rect, uv, egui::Color32::WHITE);
                painter.rect_stroke(img_rect, 0.0, egui::Stroke::new(1.0, ColorPalette::ZINC_500), egui::StrokeKind::Outside);
                if self.is_dragging() {
                    ctx.set_cursor_icon(egui::CursorIcon::Grabbing);
                } else if response.hovered() && self.state.text_control.has_overlay() {
                    ctx.set_cursor_icon(egui::CursorIcon::Grab);
                }
            }
            _ => {
                let message = match self.phase {
                    EditorPhase::Loading { .. } => "Loading image…",
                    _ => "Open an image to start editing",
                };
                painter.text(rect.center(), egui::Align2::CENTER_CENTER, message, egui::FontId::proportional(16.0), ColorPalette::ZINC_500);
            }
        }
    }
}
