//! Error type shared by the editor, the loader and the export helpers.
//!
//! Every fallible editor operation returns `Result<T, EditorError>`; the
//! application shell turns the error into a toast and a log line.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Network failure while fetching a remote image.
    #[error("failed to fetch image: {0}")]
    Fetch(String),

    /// The fetched or read bytes are not a decodable image.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The image source string cannot be used (bad data URL, wrong content type, too large).
    #[error("invalid image source: {0}")]
    InvalidSource(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("font error: {0}")]
    Font(String),

    /// A filter input that is not a number, or names no known control.
    #[error("invalid value {value:?} for filter {id:?}")]
    InvalidFilterValue { id: String, value: String },

    #[error("no image is loaded")]
    NoImage,

    #[error("no drawing surface is attached")]
    NoSurface,

    /// The load worker went away before reporting a result.
    #[error("image load was abandoned")]
    LoadAbandoned,
}

impl EditorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EditorError::Io { path: path.into(), source }
    }
}

impl From<image::ImageError> for EditorError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::Encoding(e) => EditorError::Encode(e.to_string()),
            other => EditorError::Decode(other.to_string()),
        }
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
