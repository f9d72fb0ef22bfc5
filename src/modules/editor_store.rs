//! Editor state and the reducer that evolves it.
//!
//! All shared editor data lives in one [`EditorState`]. It only changes
//! through [`EditorState::reduce`], which consumes the old state and an
//! [`Action`] and returns the new state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::filters::{self, FilterControl, FILTER_MAX, FILTER_MIN};
use super::image_source::ImageData;

pub const MAX_RECENT_IMAGES: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextControl {
    pub text: String,
    pub font_size: f32,
    pub font_family: String,
    pub color: String,
}

impl Default for TextControl {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 80.0,
            font_family: "sans-serif".to_string(),
            color: "#ffffff".to_string(),
        }
    }
}

impl TextControl {
    pub fn has_overlay(&self) -> bool { !self.text.is_empty() }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TextPosition {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSwatch {
    pub name: String,
    pub value: String,
}

impl ColorSwatch {
    fn new(name: &str, value: &str) -> Self {
        Self { name: name.to_string(), value: value.to_string() }
    }
}

pub fn default_colors() -> Vec<ColorSwatch> {
    vec![
        ColorSwatch::new("white", "#ffffff"),
        ColorSwatch::new("black", "#000000"),
        ColorSwatch::new("red", "#ef4444"),
        ColorSwatch::new("orange", "#f97316"),
        ColorSwatch::new("yellow", "#facc15"),
        ColorSwatch::new("green", "#22c55e"),
        ColorSwatch::new("blue", "#3b82f6"),
        ColorSwatch::new("purple", "#a855f7"),
        ColorSwatch::new("pink", "#ec4899"),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentImage {
    pub image_data: ImageData,
    pub opened_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub editor_controls: Vec<FilterControl>,
    pub new_image_data: Option<ImageData>,
    pub recent_images: Vec<RecentImage>,
    pub is_recent_image: bool,
    pub text_position: TextPosition,
    pub colors: Vec<ColorSwatch>,
    pub edited_image: Option<String>,
    pub text_control: TextControl,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            editor_controls: filters::default_controls(),
            new_image_data: None,
            recent_images: Vec::new(),
            is_recent_image: false,
            text_position: TextPosition::default(),
            colors: default_colors(),
            edited_image: None,
            text_control: TextControl::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    UpdateFilterValue { id: String, new_value: f32 },
    ResetControls,
    HandleRecentImageFlag,
    AddText { text: String },
    UpdateTextPosition { x: f32, y: f32 },
    HandleColorChange(String),
    HandleFamilyChange(String),
    HandleFontSizeChange(f32),
    SaveEditedImage(String),
    SetImageData { image_data: ImageData, from_recent: bool },
    RemoveRecentImage(usize),
}

impl EditorState {
    pub fn with_recent_images(recent_images: Vec<RecentImage>) -> Self {
        Self { recent_images, ..Self::default() }
    }

    /// Whether any image data is bound; every filter input is disabled otherwise.
    pub fn has_image(&self) -> bool { self.new_image_data.is_some() }

    pub fn control(&self, id: &str) -> Option<&FilterControl> {
        self.editor_controls.iter().find(|c| c.id == id)
    }

    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::UpdateFilterValue { id, new_value } => {
                match self.editor_controls.iter_mut().find(|c| c.id == id) {
                    Some(control) => control.value = new_value.clamp(FILTER_MIN, FILTER_MAX),
                    None => log::warn!("update for unknown filter {id:?} ignored"),
                }
            }
            Action::ResetControls => {
                for control in &mut self.editor_controls {
                    if let Some(value) = filters::default_value(&control.id) {
                        control.value = value;
                    }
                }
            }
            Action::HandleRecentImageFlag => self.is_recent_image = false,
            Action::AddText { text } => self.text_control.text = text,
            Action::UpdateTextPosition { x, y } => self.text_position = TextPosition { x, y },
            Action::HandleColorChange(name) => {
                let value = self
                    .colors
                    .iter()
                    .find(|swatch| swatch.name == name)
                    .map(|swatch| swatch.value.clone())
                    .unwrap_or(name);
                self.text_control.color = value;
            }
            Action::HandleFamilyChange(family) => self.text_control.font_family = family,
            Action::HandleFontSizeChange(size) => {
                if size.is_finite() && size > 0.0 {
                    self.text_control.font_size = size;
                } else {
                    log::warn!("font size {size} ignored");
                }
            }
            Action::SaveEditedImage(data_url) => self.edited_image = Some(data_url),
            Action::SetImageData { image_data, from_recent } => {
                self.recent_images.retain(|r| r.image_data != image_data);
                self.recent_images.insert(0, RecentImage { image_data: image_data.clone(), opened_at: Utc::now() });
                self.recent_images.truncate(MAX_RECENT_IMAGES);
                self.new_image_data = Some(image_data);
                self.is_recent_image = from_recent;
                self.edited_image = None;
            }
            Action::RemoveRecentImage(index) => {
                if index < self.recent_images.len() {
                    self.recent_images.remove(index);
                }
            }
        }
        self
    }
}
