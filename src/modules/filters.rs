//! Filter controls and the CSS-style filter pass.
//!
//! Each control maps onto a CSS `filter` function taking a percentage. The
//! composed string (`"brightness(110%) contrast(90%)"`) is what gets cached and
//! exported as metadata; [`apply_filters`] reproduces the same functions on an
//! RGBA buffer, following the Filter Effects matrices.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

pub const FILTER_MIN: f32 = 0.0;
pub const FILTER_MAX: f32 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterControl {
    pub id: String,
    pub label: String,
    pub value: f32,
}

impl FilterControl {
    pub fn new(id: &str, label: &str, value: f32) -> Self {
        Self { id: id.to_string(), label: label.to_string(), value }
    }

    /// The integer percentage used both in the filter string and in the pixel pass.
    pub fn percent(&self) -> i32 {
        self.value.floor() as i32
    }

    pub fn css(&self) -> String {
        format!("{}({}%)", self.id, self.percent())
    }
}

pub fn default_controls() -> Vec<FilterControl> {
    vec![
        FilterControl::new("brightness", "Brightness", 100.0),
        FilterControl::new("contrast", "Contrast", 100.0),
        FilterControl::new("saturate", "Saturation", 100.0),
        FilterControl::new("grayscale", "Grayscale", 0.0),
        FilterControl::new("sepia", "Sepia", 0.0),
        FilterControl::new("invert", "Invert", 0.0),
    ]
}

pub fn default_value(id: &str) -> Option<f32> {
    default_controls().into_iter().find(|c| c.id == id).map(|c| c.value)
}

/// Joins every control as `id(value%)`, space separated, in control order.
pub fn compose_filter_string(controls: &[FilterControl]) -> String {
    controls.iter().map(FilterControl::css).collect::<Vec<_>>().join(" ")
}

/// Parses a value typed into a control's text box.
///
/// Accepts anything `f32` parses after trimming; the result is clamped to the
/// slider range. Returns `None` for non-numeric input.
pub fn parse_filter_input(raw: &str) -> Option<f32> {
    let value: f32 = raw.trim().parse().ok()?;
    if !value.is_finite() { return None; }
    Some(value.clamp(FILTER_MIN, FILTER_MAX))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FilterOp {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    Grayscale(f32),
    Sepia(f32),
    Invert(f32),
    Opacity(f32),
}

impl FilterOp {
    fn from_control(control: &FilterControl) -> Option<Self> {
        let amount = control.percent() as f32 / 100.0;
        let op = match control.id.as_str() {
            "brightness" => FilterOp::Brightness(amount),
            "contrast" => FilterOp::Contrast(amount),
            "saturate" => FilterOp::Saturate(amount),
            "grayscale" => FilterOp::Grayscale(amount.min(1.0)),
            "sepia" => FilterOp::Sepia(amount.min(1.0)),
            "invert" => FilterOp::Invert(amount.min(1.0)),
            "opacity" => FilterOp::Opacity(amount.min(1.0)),
            _ => return None,
        };
        Some(op)
    }

    fn is_identity(&self) -> bool {
        match *self {
            FilterOp::Brightness(a) | FilterOp::Contrast(a) | FilterOp::Saturate(a) | FilterOp::Opacity(a) => a == 1.0,
            FilterOp::Grayscale(a) | FilterOp::Sepia(a) | FilterOp::Invert(a) => a == 0.0,
        }
    }

    fn apply(&self, px: &mut [f32; 4]) {
        match *self {
            FilterOp::Brightness(a) => {
                for c in &mut px[..3] { *c *= a; }
            }
            FilterOp::Contrast(a) => {
                for c in &mut px[..3] { *c = (*c - 0.5) * a + 0.5; }
            }
            FilterOp::Saturate(s) => {
                let m = [
                    [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
                ];
                mul3(px, &m);
            }
            FilterOp::Grayscale(a) => {
                let k = 1.0 - a;
                let m = [
                    [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
                    [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
                    [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
                ];
                mul3(px, &m);
            }
            FilterOp::Sepia(a) => {
                let k = 1.0 - a;
                let m = [
                    [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
                    [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
                    [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
                ];
                mul3(px, &m);
            }
            FilterOp::Invert(a) => {
                for c in &mut px[..3] { *c = *c * (1.0 - a) + (1.0 - *c) * a; }
            }
            FilterOp::Opacity(a) => px[3] *= a,
        }
        // Each function clamps its result before the next one reads it.
        for c in px.iter_mut() { *c = c.clamp(0.0, 1.0); }
    }
}

fn mul3(px: &mut [f32; 4], m: &[[f32; 3]; 3]) {
    let (r, g, b) = (px[0], px[1], px[2]);
    px[0] = m[0][0] * r + m[0][1] * g + m[0][2] * b;
    px[1] = m[1][0] * r + m[1][1] * g + m[1][2] * b;
    px[2] = m[2][0] * r + m[2][1] * g + m[2][2] * b;
}

/// Applies the controls, in order, to every pixel of `buf`.
pub fn apply_filters(buf: &mut RgbaImage, controls: &[FilterControl]) {
    let ops: Vec<FilterOp> = controls
        .iter()
        .filter_map(|control| {
            let op = FilterOp::from_control(control);
            if op.is_none() {
                log::warn!("skipping unsupported filter {:?}", control.id);
            }
            op
        })
        .filter(|op| !op.is_identity())
        .collect();
    if ops.is_empty() { return; }

    for pixel in buf.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let mut px = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0];
        for op in &ops { op.apply(&mut px); }
        pixel.0 = px.map(|c| (c * 255.0).round() as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn control(id: &str, value: f32) -> FilterControl {
        FilterControl::new(id, id, value)
    }

    #[test]
    fn composes_brightness_and_contrast() {
        let controls = vec![control("brightness", 110.0), control("contrast", 90.0)];
        assert_eq!(compose_filter_string(&controls), "brightness(110%) contrast(90%)");
    }

    #[test]
    fn fractional_values_are_floored() {
        let controls = vec![control("sepia", 12.9)];
        assert_eq!(compose_filter_string(&controls), "sepia(12%)");
    }

    #[test]
    fn empty_controls_compose_to_empty_string() {
        assert_eq!(compose_filter_string(&[]), "");
    }

    #[test]
    fn parse_clamps_and_rejects() {
        assert_eq!(parse_filter_input(" 150 "), Some(150.0));
        assert_eq!(parse_filter_input("250"), Some(200.0));
        assert_eq!(parse_filter_input("-4"), Some(0.0));
        assert_eq!(parse_filter_input("abc"), None);
        assert_eq!(parse_filter_input("NaN"), None);
    }

    #[test]
    fn default_controls_leave_pixels_alone() {
        let mut buf = RgbaImage::from_pixel(2, 2, Rgba([10, 120, 250, 255]));
        apply_filters(&mut buf, &default_controls());
        assert_eq!(buf.get_pixel(1, 1).0, [10, 120, 250, 255]);
    }

    #[test]
    fn brightness_doubles_and_clamps() {
        let mut buf = RgbaImage::from_pixel(1, 1, Rgba([50, 100, 200, 255]));
        apply_filters(&mut buf, &[control("brightness", 200.0)]);
        assert_eq!(buf.get_pixel(0, 0).0, [100, 200, 255, 255]);
    }

    #[test]
    fn zero_contrast_is_mid_gray() {
        let mut buf = RgbaImage::from_pixel(1, 1, Rgba([0, 255, 30, 255]));
        apply_filters(&mut buf, &[control("contrast", 0.0)]);
        assert_eq!(buf.get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn full_invert_flips_channels() {
        let mut buf = RgbaImage::from_pixel(1, 1, Rgba([0, 55, 255, 200]));
        apply_filters(&mut buf, &[control("invert", 100.0)]);
        assert_eq!(buf.get_pixel(0, 0).0, [255, 200, 0, 200]);
    }

    #[test]
    fn full_grayscale_equalizes_channels() {
        let mut buf = RgbaImage::from_pixel(1, 1, Rgba([200, 40, 90, 255]));
        apply_filters(&mut buf, &[control("grayscale", 150.0)]);
        let [r, g, b, _] = buf.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn unknown_filter_is_skipped() {
        let mut buf = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 4]));
        apply_filters(&mut buf, &[control("hue-rotate", 50.0)]);
        assert_eq!(buf.get_pixel(0, 0).0, [1, 2, 3, 4]);
    }
}
