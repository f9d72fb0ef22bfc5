use eframe::egui;

use crate::error::EditorResult;
use crate::modules::editor_store::RecentImage;
use crate::modules::image_source::ImageData;
use crate::modules::photo_editor::{ExportKind, PhotoEditor};
use crate::modules::toast::{Notice, Toasts};
use crate::settings::{self, AppSettings, ThemePreference};
use crate::style::{self, ColorPalette, ThemeMode};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif", "ico"];

pub struct PremagicApp {
    editor: PhotoEditor,
    settings: AppSettings,
    theme_mode: ThemeMode,
    toasts: Toasts,
    sidebar_open: bool,
    recent_expanded: bool,
    url_prompt: Option<String>,
    persisted_recent: Vec<RecentImage>,
}

impl PremagicApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> EditorResult<Self> {
        let settings = AppSettings::load();
        let theme_mode = match settings.theme_preference {
            ThemePreference::System => ThemeMode::from_egui(cc.egui_ctx.theme()),
            ThemePreference::Light => ThemeMode::Light,
            ThemePreference::Dark => ThemeMode::Dark,
        };
        style::apply_theme(&cc.egui_ctx, theme_mode);

        let recent = settings::load_recent_images();
        log::info!("starting with {} recent image(s)", recent.len());
        let editor = PhotoEditor::with_recent_images(settings.to_editor_config(), recent.clone())?;

        Ok(Self {
            editor,
            settings,
            theme_mode,
            toasts: Toasts::default(),
            sidebar_open: true,
            recent_expanded: true,
            url_prompt: None,
            persisted_recent: recent,
        })
    }

    fn open(&mut self, image_data: ImageData, from_recent: bool) {
        log::info!("opening {}", image_data.display_name());
        if let Err(e) = self.editor.open_image(image_data, from_recent) {
            log::warn!("{e}");
            self.toasts.push(Notice::error(e.to_string()));
        }
    }

    fn open_file_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Images", IMAGE_EXTENSIONS);
        if let Some(dir) = dirs::picture_dir() {
            dialog = dialog.set_directory(dir);
        }
        if let Some(path) = dialog.pick_file() {
            self.open(ImageData::from_url(&path.to_string_lossy()), false);
        }
    }

    fn set_theme(&mut self, ctx: &egui::Context, preference: ThemePreference) {
        self.settings.theme_preference = preference;
        self.theme_mode = match preference {
            ThemePreference::System => ThemeMode::from_egui(ctx.theme()),
            ThemePreference::Light => ThemeMode::Light,
            ThemePreference::Dark => ThemeMode::Dark,
        };
        style::apply_theme(ctx, self.theme_mode);
        self.settings.save();
    }

    fn persist_recent_if_changed(&mut self) {
        let recent = &self.editor.state().recent_images;
        if *recent != self.persisted_recent {
            settings::save_recent_images(recent);
            self.persisted_recent = recent.clone();
        }
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        ui.close();
                        self.open_file_dialog();
                    }
                    if ui.button("Open URL...").clicked() {
                        self.url_prompt = Some(String::new());
                        ui.close();
                    }
                    ui.separator();

                    for kind in [ExportKind::Image, ExportKind::Metadata] {
                        if ui.add_enabled(self.editor.can_export(kind), egui::Button::new(kind.label())).clicked() {
                            ui.close();
                            self.editor.export_with_dialog(kind);
                        }
                    }
                    if ui.button("Download Folder...").clicked() {
                        ui.close();
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            self.settings.download_dir = Some(dir.clone());
                            self.editor.set_download_dir(Some(dir));
                            self.settings.save();
                        }
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        ui.close();
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.button("Reset Filters").clicked() {
                        self.editor.handle_reset();
                        ui.close();
                    }
                    if ui.add_enabled(self.editor.state().text_control.has_overlay(), egui::Button::new("Delete Text")).clicked() {
                        self.editor.handle_delete_text();
                        ui.close();
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.sidebar_open, "Show Recent Images");
                    ui.separator();
                    ui.label("Theme:");
                    let mut picked = None;
                    for (preference, label) in [
                        (ThemePreference::System, "System"),
                        (ThemePreference::Light, "Light"),
                        (ThemePreference::Dark, "Dark"),
                    ] {
                        if ui.selectable_label(self.settings.theme_preference == preference, label).clicked() {
                            picked = Some(preference);
                        }
                    }
                    if let Some(preference) = picked {
                        self.set_theme(ctx, preference);
                        ui.close();
                    }
                });
            });
            ui.add_space(4.0);
        });
    }

    fn sidebar(&mut self, ctx: &egui::Context) {
        if !self.sidebar_open { return; }
        let theme = self.theme_mode;

        egui::SidePanel::left("recent_images")
            .resizable(true)
            .default_width(220.0)
            .min_width(180.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                    ui.add_space(8.0);
                    let recent = self.editor.state().recent_images.clone();
                    let current = self.editor.state().new_image_data.clone();
                    let mut to_open: Option<usize> = None;
                    let mut to_remove: Option<usize> = None;

                    style::sidebar_section(ui, "Recent Images", &mut self.recent_expanded, theme, |ui| {
                        if recent.is_empty() {
                            ui.weak("No recent images");
                            return;
                        }
                        for (index, entry) in recent.iter().enumerate() {
                            ui.horizontal(|ui| {
                                let delete_color = match theme {
                                    ThemeMode::Dark => ColorPalette::SLATE_100,
                                    ThemeMode::Light => ColorPalette::GRAY_600,
                                };
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                    if ui.small_button(egui::RichText::new("🗑").color(delete_color)).on_hover_text("Remove").clicked() {
                                        to_remove = Some(index);
                                    }
                                    ui.with_layout(egui::Layout::left_to_right(egui::Align::Center), |ui| {
                                        let mut name = entry.image_data.display_name();
                                        if current.as_ref() == Some(&entry.image_data) {
                                            name = format!("• {name}");
                                        }
                                        let hover = entry.opened_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string();
                                        if style::sidebar_item(ui, &name, theme).on_hover_text(hover).clicked() {
                                            to_open = Some(index);
                                        }
                                    });
                                });
                            });
                        }
                    });

                    if let Some(index) = to_remove {
                        self.editor.remove_recent(index);
                    } else if let Some(index) = to_open {
                        if let Err(e) = self.editor.open_recent(index) {
                            log::warn!("{e}");
                            self.toasts.push(Notice::error(e.to_string()));
                        }
                    }
                });
            });
    }

    fn render_url_prompt(&mut self, ctx: &egui::Context) {
        let Some(mut url) = self.url_prompt.take() else { return };

        let (bg, border) = match self.theme_mode {
            ThemeMode::Dark => (ColorPalette::ZINC_800, ColorPalette::ZINC_700),
            ThemeMode::Light => (egui::Color32::WHITE, ColorPalette::GRAY_300),
        };
        egui::Area::new(egui::Id::new("url_overlay"))
            .fixed_pos(egui::pos2(0.0, 0.0))
            .order(egui::Order::Foreground)
            .interactable(false)
            .show(ctx, |ui| {
                ui.painter().rect_filled(ctx.content_rect(), 0.0, egui::Color32::from_rgba_premultiplied(0, 0, 0, 160));
            });

        let mut submit = false;
        let mut cancel = false;
        egui::Window::new("Open Image URL")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .order(egui::Order::Tooltip)
            .frame(egui::Frame::new().fill(bg).stroke(egui::Stroke::new(1.0, border)).corner_radius(8.0).inner_margin(20.0))
            .show(ctx, |ui| {
                ui.label("Paste an http(s) link, a data: URL or a file path.");
                ui.add_space(8.0);
                let response = ui.add(egui::TextEdit::singleline(&mut url).desired_width(420.0).hint_text("https://"));
                response.request_focus();
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if style::primary_button(ui, "Open").clicked() { submit = true; }
                    if ui.button("Cancel").clicked() { cancel = true; }
                });
            });
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) { cancel = true; }

        if submit && !url.trim().is_empty() {
            self.open(ImageData::from_url(url.trim()), false);
        } else if !cancel {
            self.url_prompt = Some(url);
        }
    }
}

impl eframe::App for PremagicApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if matches!(self.settings.theme_preference, ThemePreference::System) {
            let system_theme = ThemeMode::from_egui(ctx.theme());
            if self.theme_mode != system_theme {
                self.theme_mode = system_theme;
                style::apply_theme(ctx, self.theme_mode);
            }
        }

        self.top_bar(ctx);
        self.sidebar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.editor.ui(ui, ctx, self.theme_mode);
        });
        self.render_url_prompt(ctx);

        for notice in self.editor.take_notices() {
            self.toasts.push(notice);
        }
        self.toasts.show(ctx, self.theme_mode);
        self.persist_recent_if_changed();
    }
}
