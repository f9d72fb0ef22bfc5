use eframe::egui;
use std::time::{Duration, Instant};

use crate::style::{ColorPalette, ThemeMode};

const TOAST_LIFETIME: Duration = Duration::from_secs(3);
const MAX_TOASTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoticeKind { Success, Error }

/// A user-facing message produced by an editor action.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }
    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }
}

struct Toast { notice: Notice, shown_at: Instant }

#[derive(Default)]
pub struct Toasts { items: Vec<Toast> }

impl Toasts {
    pub fn push(&mut self, notice: Notice) {
        self.items.push(Toast { notice, shown_at: Instant::now() });
        if self.items.len() > MAX_TOASTS { self.items.remove(0); }
    }

    pub fn show(&mut self, ctx: &egui::Context, theme: ThemeMode) {
        self.items.retain(|t| t.shown_at.elapsed() < TOAST_LIFETIME);
        if self.items.is_empty() { return; }

        let (bg, text_col) = match theme {
            ThemeMode::Dark => (ColorPalette::ZINC_800, ColorPalette::ZINC_100),
            ThemeMode::Light => (egui::Color32::WHITE, ColorPalette::GRAY_900),
        };
        egui::Area::new(egui::Id::new("premagic_toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in &self.items {
                    let accent = match toast.notice.kind {
                        NoticeKind::Success => ColorPalette::GREEN_500,
                        NoticeKind::Error => ColorPalette::RED_500,
                    };
                    egui::Frame::new()
                        .fill(bg)
                        .stroke(egui::Stroke::new(1.0, accent))
                        .corner_radius(6.0)
                        .inner_margin(egui::Margin { left: 12, right: 12, top: 8, bottom: 8 })
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(&toast.notice.message).size(13.0).color(text_col));
                        });
                    ui.add_space(6.0);
                }
            });
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
