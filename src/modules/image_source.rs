//! Image descriptors and the generation-fenced background loader.
//!
//! An [`ImageData`] is the JSON object describing a photo (at least
//! `urls.regular`). Loading resolves that URL into an [`ImageSource`] and runs
//! on a worker thread. Every request bumps a shared generation counter; workers
//! abandon superseded requests and [`ImageLoader::poll`] drops any completion
//! that is not the latest, so a slow load can never overwrite a newer one.

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{EditorError, EditorResult};

/// Photo descriptor, kept as the raw JSON object so unknown fields survive
/// into the metadata export in their original order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageData(Map<String, Value>);

impl ImageData {
    pub fn from_url(url: &str) -> Self {
        let mut urls = Map::new();
        urls.insert("regular".to_string(), Value::String(url.to_string()));
        let mut root = Map::new();
        root.insert("urls".to_string(), Value::Object(urls));
        Self(root)
    }

    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn regular_url(&self) -> Option<&str> {
        self.0.get("urls")?.get("regular")?.as_str()
    }

    /// Short label for lists: the `description`/`alt_description` when present, else the URL tail.
    pub fn display_name(&self) -> String {
        for key in ["description", "alt_description"] {
            if let Some(text) = self.0.get(key).and_then(Value::as_str) {
                if !text.is_empty() { return text.to_string(); }
            }
        }
        match self.regular_url() {
            Some(url) if url.starts_with("data:") => "Embedded image".to_string(),
            Some(url) => url.rsplit(['/', '\\']).find(|s| !s.is_empty()).unwrap_or(url).to_string(),
            None => "Untitled".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Url(String),
    Base64(String),
    FilePath(PathBuf),
}

impl ImageSource {
    pub fn parse(raw: &str) -> EditorResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(EditorError::InvalidSource("empty image url".to_string()));
        }
        if raw.starts_with("data:") {
            return Ok(ImageSource::Base64(raw.to_string()));
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(ImageSource::Url(raw.to_string()));
        }
        let path = raw.strip_prefix("file://").unwrap_or(raw);
        Ok(ImageSource::FilePath(PathBuf::from(path)))
    }

    pub fn from_image_data(data: &ImageData) -> EditorResult<Self> {
        let url = data
            .regular_url()
            .ok_or_else(|| EditorError::InvalidSource("image data has no urls.regular".to_string()))?;
        Self::parse(url)
    }
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub http_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
            max_download_bytes: 50 * 1024 * 1024,
        }
    }
}

pub struct LoadedImage {
    pub generation: u64,
    pub image: DynamicImage,
}

impl LoadedImage {
    pub fn dimensions(&self) -> (u32, u32) { self.image.dimensions() }
}

pub struct LoadOutcome {
    pub generation: u64,
    pub result: EditorResult<DynamicImage>,
}

/// Handle to one load request. Blocking on it yields that request's outcome.
pub struct LoadTicket {
    pub generation: u64,
    rx: Receiver<LoadOutcome>,
}

impl LoadTicket {
    pub fn wait(self, timeout: Duration) -> EditorResult<LoadedImage> {
        let outcome = self.recv(timeout)?;
        outcome.result.map(|image| LoadedImage { generation: outcome.generation, image })
    }

    /// Waits for the worker's outcome. Errors only when none arrives in time.
    pub fn recv(self, timeout: Duration) -> EditorResult<LoadOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(outcome) => Ok(outcome),
            Err(RecvTimeoutError::Timeout) => Err(EditorError::Fetch("timed out waiting for image".to_string())),
            Err(RecvTimeoutError::Disconnected) => Err(EditorError::LoadAbandoned),
        }
    }
}

pub struct ImageLoader {
    config: Arc<LoaderConfig>,
    latest: Arc<AtomicU64>,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,
}

impl ImageLoader {
    pub fn new(config: LoaderConfig) -> Self {
        let (tx, rx) = channel();
        Self { config: Arc::new(config), latest: Arc::new(AtomicU64::new(0)), tx, rx }
    }

    pub fn latest_generation(&self) -> u64 { self.latest.load(Ordering::SeqCst) }

    /// Supersedes any in-flight request without starting a new one.
    pub fn cancel(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Starts a load and returns its generation. The result arrives through [`Self::poll`].
    pub fn request(&self, source: ImageSource) -> u64 {
        let generation = self.cancel();
        self.spawn(generation, source, vec![self.tx.clone()]);
        generation
    }

    /// Like [`Self::request`], but also hands back a ticket that can be waited on.
    pub fn request_ticket(&self, source: ImageSource) -> LoadTicket {
        let generation = self.cancel();
        let (ticket_tx, ticket_rx) = channel();
        self.spawn(generation, source, vec![self.tx.clone(), ticket_tx]);
        LoadTicket { generation, rx: ticket_rx }
    }

    fn spawn(&self, generation: u64, source: ImageSource, sinks: Vec<Sender<LoadOutcome>>) {
        let config = Arc::clone(&self.config);
        let latest = Arc::clone(&self.latest);
        log::info!("image load #{generation} requested: {}", describe(&source));
        thread::spawn(move || {
            let started = Instant::now();
            let result = load_source(&source, &config, || latest.load(Ordering::SeqCst) != generation);
            match &result {
                Ok(img) => log::info!(
                    "image load #{generation} finished: {}x{} in {:?}",
                    img.width(), img.height(), started.elapsed()
                ),
                Err(EditorError::LoadAbandoned) => log::debug!("image load #{generation} superseded"),
                Err(e) => log::warn!("image load #{generation} failed: {e}"),
            }
            // The editor's channel is first so it holds the outcome before a ticket wakes up.
            let (last, earlier) = match sinks.split_last() {
                Some(split) => split,
                None => return,
            };
            for sink in earlier {
                let copy = match &result {
                    Ok(img) => Ok(img.clone()),
                    Err(EditorError::LoadAbandoned) => Err(EditorError::LoadAbandoned),
                    Err(e) => Err(EditorError::Fetch(e.to_string())),
                };
                let _ = sink.send(LoadOutcome { generation, result: copy });
            }
            let _ = last.send(LoadOutcome { generation, result });
        });
    }

    /// Drains finished loads. Returns the latest generation's outcome, if it has arrived.
    pub fn poll(&self) -> Option<LoadOutcome> {
        let latest = self.latest_generation();
        let mut fresh = None;
        while let Ok(outcome) = self.rx.try_recv() {
            if outcome.generation == latest {
                fresh = Some(outcome);
            } else {
                log::debug!("dropping stale image load #{} (latest #{latest})", outcome.generation);
            }
        }
        fresh
    }
}

fn describe(source: &ImageSource) -> String {
    match source {
        ImageSource::Url(url) => url.clone(),
        ImageSource::Base64(data) => format!("data url ({} bytes)", data.len()),
        ImageSource::FilePath(path) => path.display().to_string(),
    }
}

fn load_source(
    source: &ImageSource,
    config: &LoaderConfig,
    superseded: impl Fn() -> bool,
) -> EditorResult<DynamicImage> {
    if superseded() { return Err(EditorError::LoadAbandoned); }
    let bytes = match source {
        ImageSource::Url(url) => download(url, config)?,
        ImageSource::Base64(data) => parse_base64(data, config.max_download_bytes)?,
        ImageSource::FilePath(path) => read_file(path, config.max_download_bytes)?,
    };
    if superseded() { return Err(EditorError::LoadAbandoned); }
    decode_image(&bytes)
}

fn download(url: &str, config: &LoaderConfig) -> EditorResult<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|e| EditorError::Fetch(format!("cannot build http client: {e}")))?;
    let response = client.get(url).send().map_err(|e| {
        if e.is_timeout() {
            EditorError::Fetch(format!("timed out after {:?}", config.http_timeout))
        } else {
            EditorError::Fetch(e.to_string())
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(EditorError::Fetch(format!("HTTP {}", status.as_u16())));
    }
    if let Some(ct) = response.headers().get("content-type").and_then(|v| v.to_str().ok()) {
        if !ct.starts_with("image/") {
            return Err(EditorError::InvalidSource(format!("not an image content type: {ct}")));
        }
    }
    let limit = config.max_download_bytes;
    if let Some(len) = response.content_length() {
        if len > limit {
            return Err(too_large(len, limit));
        }
    }
    // Content-Length may be absent (chunked) or wrong, so the body is capped while reading.
    let mut bytes = Vec::new();
    response
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| EditorError::Fetch(e.to_string()))?;
    if bytes.len() as u64 > limit {
        return Err(too_large(bytes.len() as u64, limit));
    }
    Ok(bytes)
}

fn read_file(path: &Path, limit: u64) -> EditorResult<Vec<u8>> {
    let len = fs::metadata(path).map_err(|e| EditorError::io(path, e))?.len();
    if len > limit {
        return Err(too_large(len, limit));
    }
    fs::read(path).map_err(|e| EditorError::io(path, e))
}

/// Decodes a `data:image/*;base64,` URL, refusing payloads that would decode past `limit` bytes.
pub fn parse_base64(data: &str, limit: u64) -> EditorResult<Vec<u8>> {
    if !data.starts_with("data:image/") {
        return Err(EditorError::InvalidSource("data url is not an image".to_string()));
    }
    let start = data
        .find(";base64,")
        .ok_or_else(|| EditorError::InvalidSource("data url is not base64 encoded".to_string()))?;
    let payload = &data[start + 8..];
    let estimated = (payload.len() as u64).saturating_mul(3) / 4;
    if estimated > limit {
        return Err(too_large(estimated, limit));
    }
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| EditorError::Decode(format!("base64: {e}")))
}

fn too_large(size: u64, limit: u64) -> EditorError {
    EditorError::InvalidSource(format!("image is {size} bytes, limit {limit}"))
}

fn decode_image(bytes: &[u8]) -> EditorResult<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}
