//! Settings and recent-image persistence under `<config_dir>/premagic/`.
//!
//! Both files are pretty-printed JSON. Anything missing or unreadable falls
//! back to defaults with a warning; the editor never refuses to start over it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{EditorError, EditorResult};
use crate::modules::editor_store::{RecentImage, MAX_RECENT_IMAGES};
use crate::modules::image_source::LoaderConfig;
use crate::modules::photo_editor::EditorConfig;

const APP_DIR: &str = "premagic";
const SETTINGS_FILE: &str = "settings.json";
const RECENT_FILE: &str = "recent_images.json";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub enum ThemePreference { #[default] System, Light, Dark }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub theme_preference: ThemePreference,
    pub download_dir: Option<PathBuf>,
    pub http_timeout_secs: u64,
    pub max_download_bytes: u64,
    pub strict_text_hit: bool,
    /// Extra font families: name shown in the picker → TTF/OTF path.
    pub font_files: BTreeMap<String, PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        let loader = LoaderConfig::default();
        Self {
            theme_preference: ThemePreference::System,
            download_dir: dirs::download_dir(),
            http_timeout_secs: loader.http_timeout.as_secs(),
            max_download_bytes: loader.max_download_bytes,
            strict_text_hit: false,
            font_files: BTreeMap::new(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

impl AppSettings {
    pub fn load() -> Self {
        Self::load_from(&config_dir().join(SETTINGS_FILE))
    }

    pub fn save(&self) {
        if let Err(e) = self.save_to(&config_dir().join(SETTINGS_FILE)) {
            log::warn!("could not save settings: {e}");
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match read_json(path) {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("settings unreadable, using defaults: {e}");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> EditorResult<()> {
        write_json(path, self)
    }

    pub fn to_editor_config(&self) -> EditorConfig {
        EditorConfig {
            loader: LoaderConfig {
                http_timeout: Duration::from_secs(self.http_timeout_secs.max(1)),
                max_download_bytes: self.max_download_bytes,
            },
            strict_text_hit: self.strict_text_hit,
            font_files: self.font_files.clone(),
            download_dir: self.download_dir.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecentImagesFile { images: Vec<RecentImage> }

pub fn load_recent_images() -> Vec<RecentImage> {
    load_recent_images_from(&config_dir().join(RECENT_FILE))
}

pub fn save_recent_images(images: &[RecentImage]) {
    if let Err(e) = save_recent_images_to(&config_dir().join(RECENT_FILE), images) {
        log::warn!("could not save recent images: {e}");
    }
}

pub fn load_recent_images_from(path: &Path) -> Vec<RecentImage> {
    match read_json::<RecentImagesFile>(path) {
        Ok(Some(mut file)) => {
            file.images.truncate(MAX_RECENT_IMAGES);
            file.images
        }
        Ok(None) => Vec::new(),
        Err(e) => {
            log::warn!("recent images unreadable, starting empty: {e}");
            Vec::new()
        }
    }
}

pub fn save_recent_images_to(path: &Path, images: &[RecentImage]) -> EditorResult<()> {
    let file = RecentImagesFile { images: images.iter().take(MAX_RECENT_IMAGES).cloned().collect() };
    write_json(path, &file)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> EditorResult<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(EditorError::io(path, e)),
    };
    Ok(Some(serde_json::from_str(&contents)?))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> EditorResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| EditorError::io(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| EditorError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::image_source::ImageData;

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load_from(&dir.path().join("nope.json"));
        assert_eq!(settings.http_timeout_secs, 30);
        assert_eq!(settings.max_download_bytes, 50 * 1024 * 1024);
        assert!(!settings.strict_text_hit);
    }

    #[test]
    fn settings_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);
        let mut settings = AppSettings::default();
        settings.theme_preference = ThemePreference::Dark;
        settings.strict_text_hit = true;
        settings.font_files.insert("Display".into(), PathBuf::from("/fonts/display.ttf"));
        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn partial_settings_keep_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, r#"{"strict_text_hit": true}"#).unwrap();
        let settings = AppSettings::load_from(&path);
        assert!(settings.strict_text_hit);
        assert_eq!(settings.http_timeout_secs, 30);
    }

    #[test]
    fn corrupt_settings_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppSettings::load_from(&path).theme_preference, ThemePreference::System);
    }

    #[test]
    fn editor_config_carries_loader_limits() {
        let mut settings = AppSettings::default();
        settings.http_timeout_secs = 0;
        settings.max_download_bytes = 1024;
        let config = settings.to_editor_config();
        assert_eq!(config.loader.http_timeout, Duration::from_secs(1));
        assert_eq!(config.loader.max_download_bytes, 1024);
    }

    #[test]
    fn recent_images_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(RECENT_FILE);
        let images = vec![RecentImage { image_data: ImageData::from_url("https://x/y.png"), opened_at: chrono::Utc::now() }];
        save_recent_images_to(&path, &images).unwrap();
        assert_eq!(load_recent_images_from(&path), images);
    }
}
