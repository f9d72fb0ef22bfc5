use eframe::egui;
use image::RgbaImage;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{EditorError, EditorResult};
use crate::modules::control_panel::ControlPanelState;
use crate::modules::editor_store::{Action, EditorState, RecentImage, TextControl, TextPosition};
use crate::modules::filters::{self, FilterControl};
use crate::modules::image_export;
use crate::modules::image_source::{ImageData, ImageLoader, ImageSource, LoadOutcome, LoaderConfig};
use crate::modules::toast::Notice;
use super::pe_canvas::Surface;
use super::pe_drag::{self, DragState, DRAG_BOX_COLOR, DRAG_BOX_LINE_WIDTH, TEXT_ORIGIN};
use super::pe_text::{self, FontBook, RgbaColor};

pub const RESET_MESSAGE: &str = "All filters have been cleared!";
pub const METADATA_MESSAGE: &str = "JSON metadata is downloaded!";
pub const IMAGE_MESSAGE: &str = "Image downloaded!";

#[derive(Debug, Clone, Default)]
pub struct EditorConfig {
    pub loader: LoaderConfig,
    /// Only start a text drag when the pointer lands on the text box.
    pub strict_text_hit: bool,
    pub font_files: BTreeMap<String, PathBuf>,
    /// Folder the save dialogs open in.
    pub download_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorPhase {
    Idle,
    Loading { generation: u64 },
    Rendered { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOutcome {
    /// No surface or no loaded image; nothing was drawn.
    Skipped,
    /// Inputs match the last render.
    Unchanged,
    Rendered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Image,
    Metadata,
}

impl ExportKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportKind::Image => image_export::EDITED_IMAGE_FILE_NAME,
            ExportKind::Metadata => image_export::METADATA_FILE_NAME,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportKind::Image => "Download Image",
            ExportKind::Metadata => "Download Metadata",
        }
    }

    pub(super) fn filter(self) -> (&'static str, &'static str) {
        match self {
            ExportKind::Image => ("PNG", "png"),
            ExportKind::Metadata => ("JSON", "json"),
        }
    }
}

/// Everything a composite depends on. Two equal snapshots render the same pixels.
#[derive(Debug, Clone, PartialEq)]
struct RenderInputs {
    generation: u64,
    controls: Vec<FilterControl>,
    text: TextControl,
    position: TextPosition,
    dragging: bool,
}

struct FilteredBase {
    generation: u64,
    controls: Vec<FilterControl>,
    pixels: RgbaImage,
}

/// The editing controller: state store, load pipeline, composite render,
/// text drag and exports.
pub struct PhotoEditor {
    pub(super) state: EditorState,
    pub(super) surface: Option<Surface>,
    pub(super) loader: ImageLoader,
    pub(super) fonts: FontBook,
    pub(super) phase: EditorPhase,
    source: Option<(u64, RgbaImage)>,
    filtered: Option<FilteredBase>,
    last_render: Option<RenderInputs>,
    pub(super) filter_data: Option<String>,
    pub(super) drag: DragState,
    strict_text_hit: bool,
    pub(super) download_dir: Option<PathBuf>,
    pub(super) font_families: Vec<String>,
    notices: Vec<Notice>,

    pub(super) zoom: f32,
    pub(super) pan: egui::Vec2,
    pub(super) fit_on_next_frame: bool,
    pub(super) canvas_rect: Option<egui::Rect>,
    pub(super) control_panel: ControlPanelState,
    pub(super) font_size_input: f32,
}

impl PhotoEditor {
    pub fn new(config: EditorConfig) -> EditorResult<Self> {
        let fonts = FontBook::new(&config.font_files)?;
        Ok(Self::with_state(EditorState::default(), fonts, config))
    }

    pub fn with_recent_images(config: EditorConfig, recent: Vec<RecentImage>) -> EditorResult<Self> {
        let fonts = FontBook::new(&config.font_files)?;
        Ok(Self::with_state(EditorState::with_recent_images(recent), fonts, config))
    }

    fn with_state(state: EditorState, fonts: FontBook, config: EditorConfig) -> Self {
        let font_size_input = state.text_control.font_size;
        let mut font_families: Vec<String> = ["sans-serif", "serif", "monospace"].iter().map(|s| s.to_string()).collect();
        font_families.extend(config.font_files.keys().cloned());
        Self {
            state,
            surface: None,
            loader: ImageLoader::new(config.loader),
            fonts,
            phase: EditorPhase::Idle,
            source: None,
            filtered: None,
            last_render: None,
            filter_data: None,
            drag: DragState::Idle,
            strict_text_hit: config.strict_text_hit,
            download_dir: config.download_dir,
            font_families,
            notices: Vec::new(),
            zoom: 1.0,
            pan: egui::Vec2::ZERO,
            fit_on_next_frame: true,
            canvas_rect: None,
            control_panel: ControlPanelState::default(),
            font_size_input,
        }
    }

    pub fn state(&self) -> &EditorState { &self.state }
    pub fn phase(&self) -> EditorPhase { self.phase }
    pub fn drag_state(&self) -> DragState { self.drag }
    pub fn is_dragging(&self) -> bool { self.drag.is_dragging() }
    pub fn filter_data(&self) -> Option<&str> { self.filter_data.as_deref() }
    pub fn surface(&self) -> Option<&Surface> { self.surface.as_ref() }
    pub fn set_download_dir(&mut self, dir: Option<PathBuf>) { self.download_dir = dir; }

    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> { std::mem::take(&mut self.notices) }

    pub(super) fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub(super) fn notify_error(&mut self, error: &EditorError) {
        log::warn!("{error}");
        self.notices.push(Notice::error(error.to_string()));
    }

    /// Gives the controller something to draw into. Rendering is a no-op until then.
    pub fn attach_surface(&mut self) {
        if self.surface.is_none() {
            self.surface = Some(Surface::new());
            self.last_render = None;
        }
    }

    // --- filter controls ---

    pub fn handle_change(&mut self, id: &str, new_value: &str) -> EditorResult<()> {
        let invalid = || EditorError::InvalidFilterValue { id: id.to_string(), value: new_value.to_string() };
        if self.state.control(id).is_none() { return Err(invalid()); }
        let value = filters::parse_filter_input(new_value).ok_or_else(invalid)?;
        self.dispatch(Action::HandleRecentImageFlag);
        self.dispatch(Action::UpdateFilterValue { id: id.to_string(), new_value: value });
        Ok(())
    }

    pub fn handle_reset(&mut self) {
        self.dispatch(Action::HandleRecentImageFlag);
        self.filter_data = None;
        self.dispatch(Action::ResetControls);
        self.handle_delete_text();
        self.drag = DragState::Idle;
        log::info!("filters reset");
        self.notify(Notice::success(RESET_MESSAGE));
    }

    // --- text overlay ---

    pub fn handle_input_text(&mut self, text: &str) {
        self.dispatch(Action::AddText { text: text.to_string() });
    }

    pub fn handle_delete_text(&mut self) {
        self.dispatch(Action::AddText { text: String::new() });
    }

    pub fn handle_color_click(&mut self, name: &str) {
        self.dispatch(Action::HandleColorChange(name.to_string()));
    }

    pub fn handle_font_size(&mut self, size: f32) {
        self.dispatch(Action::HandleFontSizeChange(size));
        self.font_size_input = self.state.text_control.font_size;
    }

    pub fn handle_font_style(&mut self, family: &str) {
        self.dispatch(Action::HandleFamilyChange(family.to_string()));
    }

    // --- image lifecycle ---

    /// Binds new image data and starts loading it. Returns the load generation.
    pub fn open_image(&mut self, image_data: ImageData, from_recent: bool) -> EditorResult<u64> {
        let source = self.bind_image(image_data, from_recent)?;
        let generation = self.loader.request(source);
        self.phase = EditorPhase::Loading { generation };
        Ok(generation)
    }

    pub fn open_recent(&mut self, index: usize) -> EditorResult<u64> {
        let image_data = self
            .state
            .recent_images
            .get(index)
            .map(|r| r.image_data.clone())
            .ok_or(EditorError::NoImage)?;
        self.open_image(image_data, true)
    }

    pub fn remove_recent(&mut self, index: usize) {
        self.dispatch(Action::RemoveRecentImage(index));
    }

    /// Binds new image data and drops everything rendered from the previous image,
    /// so nothing is drawn or published until the new source has loaded.
    fn bind_image(&mut self, image_data: ImageData, from_recent: bool) -> EditorResult<ImageSource> {
        let source = ImageSource::from_image_data(&image_data)?;
        self.dispatch(Action::SetImageData { image_data, from_recent });
        self.drag = DragState::Idle;
        self.source = None;
        self.filtered = None;
        self.last_render = None;
        self.filter_data = None;
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(0, 0);
        }
        Ok(source)
    }

    /// Binds image data and blocks until it is loaded and rendered.
    pub fn open_image_blocking(&mut self, image_data: ImageData, from_recent: bool, timeout: Duration) -> EditorResult<RenderOutcome> {
        let source = self.bind_image(image_data, from_recent)?;
        let ticket = self.loader.request_ticket(source);
        let generation = ticket.generation;
        self.phase = EditorPhase::Loading { generation };
        let outcome = match ticket.recv(timeout) {
            Ok(outcome) => {
                // The poll channel got its own copy first; it is handled here.
                let _ = self.loader.poll();
                outcome
            }
            Err(e) => LoadOutcome { generation, result: Err(e) },
        };
        self.apply_outcome(outcome)
    }

    /// Applies a finished load, if the latest one has arrived, and renders it.
    pub fn poll_load(&mut self) -> EditorResult<Option<RenderOutcome>> {
        match self.loader.poll() {
            Some(outcome) => self.apply_outcome(outcome).map(Some),
            None => Ok(None),
        }
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) -> EditorResult<RenderOutcome> {
        if outcome.generation != self.loader.latest_generation() {
            return Ok(RenderOutcome::Skipped);
        }
        if matches!(&self.source, Some((generation, _)) if *generation == outcome.generation) {
            return self.recompute_render();
        }
        match outcome.result {
            Ok(img) => {
                self.source = Some((outcome.generation, img.to_rgba8()));
                self.filtered = None;
                self.last_render = None;
                self.fit_on_next_frame = true;
                self.phase = EditorPhase::Rendered { generation: outcome.generation };
                self.recompute_render()
            }
            Err(e) => {
                self.phase = EditorPhase::Idle;
                Err(e)
            }
        }
    }

    // --- composite render ---

    /// Redraws the composite if anything it depends on changed since the last render.
    pub fn recompute_render(&mut self) -> EditorResult<RenderOutcome> {
        let (generation, source) = match &self.source {
            Some((generation, source)) => (*generation, source),
            None => return Ok(RenderOutcome::Skipped),
        };
        let surface = match self.surface.as_mut() {
            Some(s) => s,
            None => return Ok(RenderOutcome::Skipped),
        };

        let inputs = RenderInputs {
            generation,
            controls: self.state.editor_controls.clone(),
            text: self.state.text_control.clone(),
            position: self.state.text_position,
            dragging: self.drag.is_dragging(),
        };
        if self.last_render.as_ref() == Some(&inputs) {
            return Ok(RenderOutcome::Unchanged);
        }

        let (w, h) = source.dimensions();
        if (surface.width(), surface.height()) != (w, h) {
            surface.resize(w, h);
        }
        let filter_string = filters::compose_filter_string(&inputs.controls);

        let cached = matches!(&self.filtered, Some(f) if f.generation == generation && f.controls == inputs.controls);
        if !cached {
            let mut pixels = source.clone();
            filters::apply_filters(&mut pixels, &inputs.controls);
            log::debug!("filtered #{generation} with \"{filter_string}\"");
            self.filtered = Some(FilteredBase { generation, controls: inputs.controls.clone(), pixels });
        }

        surface.clear();
        if let Some(base) = &self.filtered {
            surface.draw_image(&base.pixels);
        }

        if inputs.text.has_overlay() {
            let text = &inputs.text;
            let color = RgbaColor::from_css(&text.color).unwrap_or_else(|| {
                log::warn!("unrecognised text color {:?}, using black", text.color);
                RgbaColor::BLACK
            });
            let x = inputs.position.x + TEXT_ORIGIN.0;
            let y = inputs.position.y + TEXT_ORIGIN.1;
            self.fonts.fill_text(surface.pixels_mut(), &text.text, text.font_size, &text.font_family, color, x, y);
            if inputs.dragging {
                let width = self.fonts.measure(&text.text, text.font_size, &text.font_family);
                let (bx, by, bw, bh) = pe_drag::text_box(inputs.position, width);
                let stroke = RgbaColor::from_css(DRAG_BOX_COLOR).unwrap_or(RgbaColor::BLACK);
                pe_text::stroke_rect(surface.pixels_mut(), bx, by, bw, bh, DRAG_BOX_LINE_WIDTH, stroke);
            }
        }

        self.filter_data = Some(filter_string);
        let publish = !inputs.dragging;
        self.last_render = Some(inputs);
        if publish {
            let data_url = surface.to_data_url()?;
            self.dispatch(Action::SaveEditedImage(data_url));
        }
        Ok(RenderOutcome::Rendered)
    }

    // --- drag ---

    /// Pointer coordinates are in surface pixels.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let text = &self.state.text_control;
        let width = self.fonts.measure(&text.text, text.font_size, &text.font_family);
        let position = self.state.text_position;
        let hit = pe_drag::hit_text(position, width, x, y);
        self.drag = pe_drag::pointer_down(position, x, y, hit, self.strict_text_hit);
        log::debug!("pointer down at ({x:.0}, {y:.0}), hit={hit}, dragging={}", self.drag.is_dragging());
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let Some(position) = pe_drag::pointer_move(self.drag, x, y) {
            self.dispatch(Action::UpdateTextPosition { x: position.x, y: position.y });
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = pe_drag::pointer_up(self.drag);
    }

    // --- exports ---

    /// Runs one export and reports the result as a notice instead of returning it.
    pub fn export(&mut self, kind: ExportKind, path: &Path) {
        let result = match kind {
            ExportKind::Image => self.download_image(path),
            ExportKind::Metadata => self.download_metadata(path),
        };
        if let Err(e) = result {
            self.notify_error(&e);
        }
    }

    pub fn can_export(&self, kind: ExportKind) -> bool {
        match kind {
            ExportKind::Image => matches!(self.phase, EditorPhase::Rendered { .. }),
            ExportKind::Metadata => self.state.has_image(),
        }
    }

    pub fn download_image(&mut self, path: &Path) -> EditorResult<()> {
        let surface = self.surface.as_ref().ok_or(EditorError::NoSurface)?;
        if surface.is_empty() { return Err(EditorError::NoImage); }
        image_export::write_png(surface.pixels(), path)?;
        log::info!("edited image written to {}", path.display());
        self.notify(Notice::success(IMAGE_MESSAGE));
        Ok(())
    }

    pub fn get_metadata(&self) -> EditorResult<String> {
        image_export::metadata_json(self.filter_data.as_deref(), self.state.new_image_data.as_ref())
    }

    pub fn download_metadata(&mut self, path: &Path) -> EditorResult<()> {
        let json = self.get_metadata()?;
        image_export::write_text(&json, path)?;
        log::info!("metadata written to {}", path.display());
        self.notify(Notice::success(METADATA_MESSAGE));
        Ok(())
    }
}
