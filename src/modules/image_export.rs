use base64::{Engine as _, engine::general_purpose};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use serde::Serialize;
use std::path::Path;

use crate::error::{EditorError, EditorResult};
use super::image_source::ImageData;

pub const EDITED_IMAGE_FILE_NAME: &str = "premagic-edited-image.png";
pub const METADATA_FILE_NAME: &str = "premagic-metadata.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata<'a> {
    pub filter_data: Option<&'a str>,
    pub new_image_data: Option<&'a ImageData>,
}

pub fn encode_png(img: &RgbaImage) -> EditorResult<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new_with_quality(
        &mut bytes,
        image::codecs::png::CompressionType::Fast,
        image::codecs::png::FilterType::Adaptive,
    );
    encoder
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)?;
    Ok(bytes)
}

pub fn png_data_url(img: &RgbaImage) -> EditorResult<String> {
    let bytes = encode_png(img)?;
    Ok(format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(bytes)))
}

/// Pretty (2-space) JSON of `{filterData, newImageData}`.
pub fn metadata_json(filter_data: Option<&str>, new_image_data: Option<&ImageData>) -> EditorResult<String> {
    Ok(serde_json::to_string_pretty(&Metadata { filter_data, new_image_data })?)
}

pub fn write_png(img: &RgbaImage, path: &Path) -> EditorResult<()> {
    let bytes = encode_png(img)?;
    std::fs::write(path, bytes).map_err(|e| EditorError::io(path, e))
}

pub fn write_text(contents: &str, path: &Path) -> EditorResult<()> {
    std::fs::write(path, contents).map_err(|e| EditorError::io(path, e))
}
