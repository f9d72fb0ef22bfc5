use ab_glyph::{Font as AbFont, FontArc, PxScale, ScaleFont};
use eframe::egui;
use image::{Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{EditorError, EditorResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbaColor { pub r: u8, pub g: u8, pub b: u8, pub a: u8 }

impl RgbaColor {
    pub const BLACK: RgbaColor = RgbaColor { r: 0, g: 0, b: 0, a: 255 };

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex: &str = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() { return None; }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Self { r: expand(0)?, g: expand(1)?, b: expand(2)?, a: 255 })
            }
            6 => Some(Self { r: channel(&hex[0..2])?, g: channel(&hex[2..4])?, b: channel(&hex[4..6])?, a: 255 }),
            8 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
                a: channel(&hex[6..8])?,
            }),
            _ => None,
        }
    }

    /// Hex notation or a basic CSS color keyword.
    pub fn from_css(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') { return Self::from_hex(value); }
        let hex = match value.to_ascii_lowercase().as_str() {
            "black" => "000000",
            "white" => "ffffff",
            "red" => "ff0000",
            "green" => "008000",
            "blue" => "0000ff",
            "yellow" => "ffff00",
            "orange" => "ffa500",
            "purple" => "800080",
            "pink" => "ffc0cb",
            "gray" | "grey" => "808080",
            "transparent" => "00000000",
            _ => return None,
        };
        Self::from_hex(hex)
    }
}

/// Fonts available to the overlay, resolved from a CSS-like family name.
///
/// The generic `monospace` families map to egui's bundled monospace face and
/// everything else to its proportional face, unless a font file was
/// configured for that family name.
pub struct FontBook {
    proportional: FontArc,
    monospace: FontArc,
    named: BTreeMap<String, FontArc>,
}

impl FontBook {
    pub fn new(font_files: &BTreeMap<String, PathBuf>) -> EditorResult<Self> {
        let defs = egui::FontDefinitions::default();
        let bundled = |family: egui::FontFamily| -> EditorResult<FontArc> {
            let data = defs
                .families
                .get(&family)
                .and_then(|names| names.first())
                .and_then(|name| defs.font_data.get(name))
                .ok_or_else(|| EditorError::Font(format!("no bundled {family:?} font")))?;
            FontArc::try_from_vec(data.font.to_vec()).map_err(|e| EditorError::Font(e.to_string()))
        };
        let proportional = bundled(egui::FontFamily::Proportional)?;
        let monospace = bundled(egui::FontFamily::Monospace)?;

        let mut named = BTreeMap::new();
        for (family, path) in font_files {
            match std::fs::read(path) {
                Ok(bytes) => match FontArc::try_from_vec(bytes) {
                    Ok(font) => { named.insert(family.to_ascii_lowercase(), font); }
                    Err(e) => log::warn!("font {} for {family:?} is unusable: {e}", path.display()),
                },
                Err(e) => log::warn!("cannot read font {} for {family:?}: {e}", path.display()),
            }
        }
        Ok(Self { proportional, monospace, named })
    }

    pub fn resolve(&self, family: &str) -> &FontArc {
        // First family in a CSS list that we know wins.
        for candidate in family.split(',') {
            let name = candidate.trim().trim_matches(['"', '\'']).to_ascii_lowercase();
            if let Some(font) = self.named.get(&name) { return font; }
            if name == "monospace" || name.contains("mono") || name.contains("courier") {
                return &self.monospace;
            }
        }
        &self.proportional
    }

    pub fn measure(&self, text: &str, font_size: f32, family: &str) -> f32 {
        let font = self.resolve(family);
        let scaled = font.as_scaled(PxScale::from(font_size));
        let mut width = 0.0f32;
        let mut prev: Option<ab_glyph::GlyphId> = None;
        for ch in text.chars() {
            let gid = font.glyph_id(ch);
            if let Some(p) = prev { width += scaled.kern(p, gid); }
            width += scaled.h_advance(gid);
            prev = Some(gid);
        }
        width
    }

    /// Fills `text` with its alphabetic baseline at `(x, y)`, like canvas `fillText`.
    pub fn fill_text(&self, buf: &mut RgbaImage, text: &str, font_size: f32, family: &str, color: RgbaColor, x: f32, y: f32) {
        let font = self.resolve(family);
        let scale = PxScale::from(font_size);
        let scaled = font.as_scaled(scale);
        let (iw, ih) = (buf.width() as i32, buf.height() as i32);
        let src_a = color.a as f32 / 255.0;

        let mut caret = x;
        let mut prev: Option<ab_glyph::GlyphId> = None;
        for ch in text.chars() {
            let gid = font.glyph_id(ch);
            if let Some(p) = prev { caret += scaled.kern(p, gid); }
            let glyph = gid.with_scale_and_position(scale, ab_glyph::point(caret, y));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, cov| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    if px < 0 || py < 0 || px >= iw || py >= ih { return; }
                    blend_pixel(buf, px as u32, py as u32, color, (cov * src_a).min(1.0));
                });
            }
            caret += scaled.h_advance(gid);
            prev = Some(gid);
        }
    }
}

fn blend_pixel(buf: &mut RgbaImage, x: u32, y: u32, color: RgbaColor, alpha: f32) {
    if alpha <= 0.0 { return; }
    let dst = buf.get_pixel(x, y).0;
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a < 1e-5 { return; }
    let mix = |s: u8, d: u8| -> u8 {
        ((s as f32 * alpha + d as f32 * dst_a * (1.0 - alpha)) / out_a).round().min(255.0) as u8
    };
    buf.put_pixel(x, y, Rgba([
        mix(color.r, dst[0]),
        mix(color.g, dst[1]),
        mix(color.b, dst[2]),
        (out_a * 255.0).round().min(255.0) as u8,
    ]));
}

/// Strokes an axis-aligned rectangle centred on its edges, like canvas `strokeRect`.
pub fn stroke_rect(buf: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, line_width: f32, color: RgbaColor) {
    let half = line_width / 2.0;
    let (iw, ih) = (buf.width() as f32, buf.height() as f32);
    let mut fill = |x0: f32, y0: f32, x1: f32, y1: f32| {
        let (x0, y0) = (x0.max(0.0).round() as u32, y0.max(0.0).round() as u32);
        let (x1, y1) = (x1.min(iw).round() as u32, y1.min(ih).round() as u32);
        for py in y0..y1 {
            for px in x0..x1 {
                blend_pixel(buf, px, py, color, color.a as f32 / 255.0);
            }
        }
    };
    fill(x - half, y - half, x + w + half, y + half);
    fill(x - half, y + h - half, x + w + half, y + h + half);
    fill(x - half, y + half, x + half, y + h - half);
    fill(x + w - half, y + half, x + w + half, y + h - half);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_colors() {
        assert_eq!(RgbaColor::from_css("#ff6550"), Some(RgbaColor { r: 255, g: 101, b: 80, a: 255 }));
        assert_eq!(RgbaColor::from_css("#fff"), Some(RgbaColor { r: 255, g: 255, b: 255, a: 255 }));
        assert_eq!(RgbaColor::from_css("Red"), Some(RgbaColor { r: 255, g: 0, b: 0, a: 255 }));
        assert_eq!(RgbaColor::from_css("#00000080").map(|c| c.a), Some(128));
        assert_eq!(RgbaColor::from_css("chartreuse-ish"), None);
    }

    #[test]
    fn measure_grows_with_text_and_size() {
        let fonts = FontBook::new(&BTreeMap::new()).unwrap();
        let short = fonts.measure("Hi", 40.0, "sans-serif");
        let long = fonts.measure("Hi there", 40.0, "sans-serif");
        let big = fonts.measure("Hi", 80.0, "sans-serif");
        assert!(short > 0.0);
        assert!(long > short);
        assert!((big - 2.0 * short).abs() < 1.0);
        assert_eq!(fonts.measure("", 40.0, "sans-serif"), 0.0);
    }

    #[test]
    fn fill_text_touches_pixels_above_baseline() {
        let fonts = FontBook::new(&BTreeMap::new()).unwrap();
        let mut buf = RgbaImage::from_pixel(200, 100, Rgba([0, 0, 0, 255]));
        fonts.fill_text(&mut buf, "HH", 40.0, "sans-serif", RgbaColor::from_css("#ffffff").unwrap(), 10.0, 60.0);
        let lit = buf.enumerate_pixels().filter(|(_, _, p)| p.0[0] > 128).count();
        assert!(lit > 0);
        assert!(buf.enumerate_pixels().filter(|(_, _, p)| p.0[0] > 0).all(|(_, y, _)| y <= 61));
    }

    #[test]
    fn stroke_rect_draws_border_only() {
        let mut buf = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255]));
        stroke_rect(&mut buf, 10.0, 10.0, 30.0, 30.0, 4.0, RgbaColor::from_css("#ff6550").unwrap());
        assert_eq!(buf.get_pixel(10, 25).0, [255, 101, 80, 255]);
        assert_eq!(buf.get_pixel(25, 25).0, [0, 0, 0, 255]);
        assert_eq!(buf.get_pixel(2, 2).0, [0, 0, 0, 255]);
    }
}
