use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeMode {
    Light,
    Dark,
}

impl ThemeMode {
    pub fn from_egui(theme: egui::Theme) -> Self {
        match theme {
            egui::Theme::Dark => ThemeMode::Dark,
            egui::Theme::Light => ThemeMode::Light,
        }
    }
}

pub struct ColorPalette;

impl ColorPalette {
    pub const BLUE_400: egui::Color32 = egui::Color32::from_rgb(96, 165, 250);
    pub const BLUE_500: egui::Color32 = egui::Color32::from_rgb(59, 130, 246);
    pub const BLUE_600: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);

    pub const SLATE_100: egui::Color32 = egui::Color32::from_rgb(241, 245, 249);
    pub const SLATE_200: egui::Color32 = egui::Color32::from_rgb(226, 232, 240);
    pub const SLATE_300: egui::Color32 = egui::Color32::from_rgb(203, 213, 225);

    pub const GRAY_50: egui::Color32 = egui::Color32::from_rgb(249, 250, 251);
    pub const GRAY_100: egui::Color32 = egui::Color32::from_rgb(243, 244, 246);
    pub const GRAY_200: egui::Color32 = egui::Color32::from_rgb(229, 231, 235);
    pub const GRAY_300: egui::Color32 = egui::Color32::from_rgb(209, 213, 219);
    pub const GRAY_400: egui::Color32 = egui::Color32::from_rgb(156, 163, 175);
    pub const GRAY_500: egui::Color32 = egui::Color32::from_rgb(107, 114, 128);
    pub const GRAY_600: egui::Color32 = egui::Color32::from_rgb(75, 85, 99);
    pub const GRAY_700: egui::Color32 = egui::Color32::from_rgb(55, 65, 81);
    pub const GRAY_800: egui::Color32 = egui::Color32::from_rgb(31, 41, 55);
    pub const GRAY_900: egui::Color32 = egui::Color32::from_rgb(17, 24, 39);

    pub const ZINC_100: egui::Color32 = egui::Color32::from_rgb(244, 244, 245);
    pub const ZINC_300: egui::Color32 = egui::Color32::from_rgb(212, 212, 216);
    pub const ZINC_400: egui::Color32 = egui::Color32::from_rgb(161, 161, 170);
    pub const ZINC_500: egui::Color32 = egui::Color32::from_rgb(113, 113, 122);
    pub const ZINC_600: egui::Color32 = egui::Color32::from_rgb(82, 82, 91);
    pub const ZINC_700: egui::Color32 = egui::Color32::from_rgb(63, 63, 70);
    pub const ZINC_800: egui::Color32 = egui::Color32::from_rgb(39, 39, 42);
    pub const ZINC_900: egui::Color32 = egui::Color32::from_rgb(24, 24, 27);

    pub const GREEN_500: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);
    pub const RED_500: egui::Color32 = egui::Color32::from_rgb(239, 68, 68);
}

pub fn apply_theme(ctx: &egui::Context, theme: ThemeMode) {
    let mut style = (*ctx.style()).clone();

    let radius = egui::CornerRadius::same(4);
    style.visuals.widgets.noninteractive.corner_radius = radius;
    style.visuals.widgets.inactive.corner_radius = radius;
    style.visuals.widgets.hovered.corner_radius = radius;
    style.visuals.widgets.active.corner_radius = radius;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);
    style.spacing.window_margin = egui::Margin::same(10);

    match theme {
        ThemeMode::Dark => apply_dark(&mut style.visuals),
        ThemeMode::Light => apply_light(&mut style.visuals),
    }

    ctx.set_style(style);
}

fn apply_dark(v: &mut egui::Visuals) {
    v.dark_mode = true;
    v.panel_fill = ColorPalette::ZINC_900;
    v.window_fill = ColorPalette::ZINC_900;
    v.faint_bg_color = ColorPalette::ZINC_800;
    // Canvas backdrop, darker than the panels so the image edge reads.
    v.extreme_bg_color = egui::Color32::from_rgb(12, 12, 15);

    v.widgets.noninteractive.bg_fill = ColorPalette::ZINC_800;
    v.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_700);
    v.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, ColorPalette::SLATE_300);

    v.widgets.inactive.bg_fill = egui::Color32::from_rgb(30, 30, 35);
    v.widgets.inactive.weak_bg_fill = ColorPalette::ZINC_800;
    v.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_600);
    v.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, ColorPalette::SLATE_200);

    v.widgets.hovered.bg_fill = egui::Color32::from_rgb(40, 40, 48);
    v.widgets.hovered.weak_bg_fill = egui::Color32::from_rgb(35, 35, 42);
    v.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_500);
    v.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, ColorPalette::SLATE_100);

    v.widgets.active.bg_fill = egui::Color32::from_rgb(50, 50, 60);
    v.widgets.active.bg_stroke = egui::Stroke::new(1.0, ColorPalette::ZINC_400);
    v.widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);

    v.selection.bg_fill = egui::Color32::from_rgba_premultiplied(60, 120, 240, 100);
    v.hyperlink_color = ColorPalette::BLUE_400;
}

fn apply_light(v: &mut egui::Visuals) {
    v.dark_mode = false;
    v.panel_fill = ColorPalette::GRAY_50;
    v.window_fill = ColorPalette::GRAY_50;
    v.faint_bg_color = ColorPalette::GRAY_100;
    v.extreme_bg_color = ColorPalette::GRAY_200;

    v.widgets.noninteractive.bg_fill = egui::Color32::WHITE;
    v.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_300);
    v.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_700);

    v.widgets.inactive.bg_fill = ColorPalette::GRAY_50;
    v.widgets.inactive.weak_bg_fill = ColorPalette::GRAY_100;
    v.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_300);
    v.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_800);

    v.widgets.hovered.bg_fill = ColorPalette::GRAY_100;
    v.widgets.hovered.weak_bg_fill = ColorPalette::GRAY_200;
    v.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_400);
    v.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_900);

    v.widgets.active.bg_fill = ColorPalette::GRAY_200;
    v.widgets.active.bg_stroke = egui::Stroke::new(1.0, ColorPalette::GRAY_500);
    v.widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);

    v.selection.bg_fill = egui::Color32::from_rgba_premultiplied(60, 120, 240, 80);
    v.hyperlink_color = ColorPalette::BLUE_600;
}

/// Small caps-style heading used at the top of each side-panel group.
pub fn section_heading(ui: &mut egui::Ui, title: &str, theme: ThemeMode) {
    let color = match theme {
        ThemeMode::Dark => ColorPalette::ZINC_400,
        ThemeMode::Light => ColorPalette::GRAY_600,
    };
    ui.add_space(4.0);
    ui.label(egui::RichText::new(title.to_uppercase()).size(11.0).strong().color(color));
    ui.add_space(2.0);
}

/// Collapsible sidebar group with a clickable header.
pub fn sidebar_section(
    ui: &mut egui::Ui,
    title: &str,
    expanded: &mut bool,
    theme: ThemeMode,
    add_contents: impl FnOnce(&mut egui::Ui),
) {
    let color = match theme {
        ThemeMode::Dark => ColorPalette::ZINC_300,
        ThemeMode::Light => ColorPalette::GRAY_700,
    };
    let arrow = if *expanded { "▾" } else { "▸" };
    let header = egui::Button::new(egui::RichText::new(format!("{arrow} {title}")).size(13.0).strong().color(color))
        .frame(false);
    if ui.add(header).clicked() {
        *expanded = !*expanded;
    }
    if *expanded {
        ui.indent(title, add_contents);
    }
    ui.add_space(6.0);
}

pub fn sidebar_item(ui: &mut egui::Ui, label: &str, theme: ThemeMode) -> egui::Response {
    let color = match theme {
        ThemeMode::Dark => ColorPalette::SLATE_200,
        ThemeMode::Light => ColorPalette::GRAY_800,
    };
    ui.add(
        egui::Button::new(egui::RichText::new(label).size(13.0).color(color))
            .frame(false)
            .truncate(),
    )
}

pub fn primary_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.scope(|ui| {
        let widgets = &mut ui.style_mut().visuals.widgets;
        for (state, fill) in [
            (&mut widgets.inactive, ColorPalette::BLUE_600),
            (&mut widgets.hovered, ColorPalette::BLUE_500),
            (&mut widgets.active, ColorPalette::BLUE_600),
        ] {
            state.bg_fill = fill;
            state.weak_bg_fill = fill;
            state.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);
            state.bg_stroke = egui::Stroke::NONE;
        }
        ui.add(egui::Button::new(egui::RichText::new(text).size(14.0)).min_size(egui::vec2(96.0, 30.0)))
    })
    .inner
}
