use eframe::egui;
use image::RgbaImage;

use crate::error::EditorResult;
use crate::modules::image_export;

/// The drawing surface the composite is rendered into.
///
/// Holds the CPU pixel buffer and, once shown, the egui texture mirroring it.
pub struct Surface {
    buf: RgbaImage,
    texture: Option<egui::TextureHandle>,
    texture_dirty: bool,
}

impl Default for Surface {
    fn default() -> Self { Self::new() }
}

impl Surface {
    pub fn new() -> Self {
        Self { buf: RgbaImage::new(0, 0), texture: None, texture_dirty: false }
    }

    pub fn width(&self) -> u32 { self.buf.width() }
    pub fn height(&self) -> u32 { self.buf.height() }
    pub fn is_empty(&self) -> bool { self.buf.width() == 0 || self.buf.height() == 0 }
    pub fn pixels(&self) -> &RgbaImage { &self.buf }

    /// Resizing always clears, matching a canvas whose width/height are assigned.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.buf = RgbaImage::new(width, height);
        self.texture_dirty = true;
    }

    pub fn clear(&mut self) {
        for p in self.buf.pixels_mut() { p.0 = [0, 0, 0, 0]; }
        self.texture_dirty = true;
    }

    /// Replaces the surface contents with an already filtered image of the same size.
    pub fn draw_image(&mut self, img: &RgbaImage) {
        if img.dimensions() == self.buf.dimensions() {
            self.buf.copy_from_slice(img.as_raw());
        } else {
            image::imageops::overlay(&mut self.buf, img, 0, 0);
        }
        self.texture_dirty = true;
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        self.texture_dirty = true;
        &mut self.buf
    }

    pub fn to_data_url(&self) -> EditorResult<String> {
        image_export::png_data_url(&self.buf)
    }

    pub fn ensure_texture(&mut self, ctx: &egui::Context) -> Option<&egui::TextureHandle> {
        if self.is_empty() { return None; }
        if self.texture_dirty || self.texture.is_none() {
            let size = [self.buf.width() as usize, self.buf.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, self.buf.as_raw());
            match &mut self.texture {
                Some(handle) => handle.set(color_image, egui::TextureOptions::LINEAR),
                None => self.texture = Some(ctx.load_texture("premagic_surface", color_image, egui::TextureOptions::LINEAR)),
            }
            self.texture_dirty = false;
        }
        self.texture.as_ref()
    }
}
