//! End-to-end editing flows: load, filter, overlay text, drag, export.

use image::{Rgba, RgbaImage};
use proptest::prelude::*;
use std::path::Path;
use std::time::{Duration, Instant};

use premagic::error::EditorError;
use premagic::modules::control_panel::build_rows;
use premagic::modules::editor_store::Action;
use premagic::modules::filters::{apply_filters, compose_filter_string, default_controls, FilterControl};
use premagic::modules::image_export::png_data_url;
use premagic::modules::image_source::ImageData;
use premagic::modules::photo_editor::{
    DragState, EditorConfig, EditorPhase, ExportKind, PhotoEditor, RenderOutcome, IMAGE_MESSAGE, METADATA_MESSAGE, RESET_MESSAGE,
};
use premagic::modules::toast::{Notice, NoticeKind};

const WAIT: Duration = Duration::from_secs(10);
const DEFAULT_FILTER: &str = "brightness(100%) contrast(100%) saturate(100%) grayscale(0%) sepia(0%) invert(0%)";

fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

fn png_on_disk(dir: &Path, name: &str, img: &RgbaImage) -> ImageData {
    let path = dir.join(name);
    img.save(&path).unwrap();
    ImageData::from_url(&path.to_string_lossy())
}

fn editor() -> PhotoEditor {
    let mut editor = PhotoEditor::new(EditorConfig::default()).unwrap();
    editor.attach_surface();
    editor
}

fn loaded_editor(img: &RgbaImage) -> (PhotoEditor, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let data = png_on_disk(dir.path(), "source.png", img);
    let mut editor = editor();
    let outcome = editor.open_image_blocking(data, false, WAIT).unwrap();
    assert_eq!(outcome, RenderOutcome::Rendered);
    (editor, dir)
}

fn surface_pixels(editor: &PhotoEditor) -> RgbaImage {
    editor.surface().unwrap().pixels().clone()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn opening_a_file_renders_it_with_default_filters() {
    let img = solid(40, 30, [10, 120, 200, 255]);
    let (editor, _dir) = loaded_editor(&img);

    assert!(matches!(editor.phase(), EditorPhase::Rendered { .. }));
    assert_eq!(editor.filter_data(), Some(DEFAULT_FILTER));
    assert_eq!(surface_pixels(&editor), img);
    let edited = editor.state().edited_image.as_deref().unwrap();
    assert!(edited.starts_with("data:image/png;base64,"));
}

#[test]
fn opening_a_data_url_renders_it() {
    let img = solid(8, 8, [255, 0, 0, 255]);
    let mut editor = editor();
    let data = ImageData::from_url(&png_data_url(&img).unwrap());
    assert_eq!(editor.open_image_blocking(data, false, WAIT).unwrap(), RenderOutcome::Rendered);
    assert_eq!(surface_pixels(&editor), img);
}

#[test]
fn missing_file_is_an_error_and_leaves_the_editor_idle() {
    let dir = tempfile::tempdir().unwrap();
    let data = ImageData::from_url(&dir.path().join("gone.png").to_string_lossy());
    let mut editor = editor();
    assert!(editor.open_image_blocking(data, false, WAIT).is_err());
    assert_eq!(editor.phase(), EditorPhase::Idle);
    assert!(editor.filter_data().is_none());
}

#[test]
fn a_failed_load_drops_the_previous_image() {
    let (mut editor, dir) = loaded_editor(&solid(10, 10, [30, 60, 90, 255]));
    let gone = ImageData::from_url(&dir.path().join("gone.png").to_string_lossy());
    assert!(editor.open_image_blocking(gone.clone(), false, WAIT).is_err());

    editor.handle_change("brightness", "150").unwrap();
    assert_eq!(editor.recompute_render().unwrap(), RenderOutcome::Skipped);
    assert!(editor.state().edited_image.is_none());
    assert!(editor.filter_data().is_none());
    assert!(editor.surface().unwrap().is_empty());
    assert_eq!(editor.state().new_image_data.as_ref(), Some(&gone));

    let json: serde_json::Value = serde_json::from_str(&editor.get_metadata().unwrap()).unwrap();
    assert!(json["filterData"].is_null());
}

#[test]
fn a_failed_blocking_load_is_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let data = ImageData::from_url(&dir.path().join("gone.png").to_string_lossy());
    let mut editor = editor();
    assert!(editor.open_image_blocking(data, false, WAIT).is_err());
    assert!(editor.poll_load().unwrap().is_none());
}

#[test]
fn nothing_renders_while_a_new_image_is_loading() {
    let (mut editor, dir) = loaded_editor(&solid(10, 10, [30, 60, 90, 255]));
    let next = png_on_disk(dir.path(), "next.png", &solid(6, 6, [1, 1, 1, 255]));
    editor.open_image(next, false).unwrap();

    assert_eq!(editor.recompute_render().unwrap(), RenderOutcome::Skipped);
    assert!(editor.state().edited_image.is_none());
}

#[test]
fn image_data_without_a_url_is_rejected() {
    let data = ImageData::from_value(serde_json::json!({"urls": {}})).unwrap();
    let mut editor = editor();
    assert!(matches!(editor.open_image(data, false), Err(EditorError::InvalidSource(_))));
    assert!(!editor.state().has_image());
}

#[test]
fn only_the_latest_load_is_applied() {
    let dir = tempfile::tempdir().unwrap();
    let first = png_on_disk(dir.path(), "first.png", &solid(64, 64, [0, 0, 0, 255]));
    let second = png_on_disk(dir.path(), "second.png", &solid(12, 9, [255, 255, 255, 255]));

    let mut editor = editor();
    let stale = editor.open_image(first, false).unwrap();
    let latest = editor.open_image(second, false).unwrap();
    assert!(latest > stale);

    let deadline = Instant::now() + WAIT;
    while !matches!(editor.phase(), EditorPhase::Rendered { .. }) && Instant::now() < deadline {
        editor.poll_load().unwrap();
        std::thread::sleep(Duration::from_millis(10));
    }

    assert_eq!(editor.phase(), EditorPhase::Rendered { generation: latest });
    let surface = editor.surface().unwrap();
    assert_eq!((surface.width(), surface.height()), (12, 9));
}

#[test]
fn rendering_without_a_surface_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let data = png_on_disk(dir.path(), "a.png", &solid(4, 4, [1, 2, 3, 255]));
    let mut editor = PhotoEditor::new(EditorConfig::default()).unwrap();
    assert_eq!(editor.open_image_blocking(data, false, WAIT).unwrap(), RenderOutcome::Skipped);
    assert!(editor.surface().is_none());

    editor.attach_surface();
    assert_eq!(editor.recompute_render().unwrap(), RenderOutcome::Rendered);
}

#[test]
fn reopening_from_recents_sets_the_flag() {
    let img = solid(4, 4, [9, 9, 9, 255]);
    let (mut editor, _dir) = loaded_editor(&img);
    assert!(!editor.state().is_recent_image);
    assert_eq!(editor.state().recent_images.len(), 1);

    editor.open_recent(0).unwrap();
    assert!(editor.state().is_recent_image);
    assert_eq!(editor.state().recent_images.len(), 1);

    editor.handle_change("sepia", "20").unwrap();
    assert!(!editor.state().is_recent_image);
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn brightness_and_contrast_compose_in_order() {
    let img = solid(16, 16, [100, 100, 100, 255]);
    let (mut editor, _dir) = loaded_editor(&img);
    editor.handle_change("brightness", "110").unwrap();
    editor.handle_change("contrast", "90").unwrap();
    editor.recompute_render().unwrap();

    assert_eq!(
        editor.filter_data(),
        Some("brightness(110%) contrast(90%) saturate(100%) grayscale(0%) sepia(0%) invert(0%)")
    );
    let two = &editor.state().editor_controls[..2];
    assert_eq!(compose_filter_string(two), "brightness(110%) contrast(90%)");
}

#[test]
fn surface_matches_the_filter_pass_when_there_is_no_text() {
    let img = solid(20, 10, [200, 40, 90, 255]);
    let (mut editor, _dir) = loaded_editor(&img);
    editor.handle_change("invert", "100").unwrap();
    editor.handle_change("brightness", "50").unwrap();
    editor.recompute_render().unwrap();

    let mut expected = img.clone();
    apply_filters(&mut expected, &editor.state().editor_controls);
    assert_eq!(surface_pixels(&editor), expected);
}

#[test]
fn invalid_input_is_rejected_without_changing_the_control() {
    let (mut editor, _dir) = loaded_editor(&solid(4, 4, [0, 0, 0, 255]));
    let err = editor.handle_change("brightness", "abc").unwrap_err();
    assert!(matches!(err, EditorError::InvalidFilterValue { .. }));
    assert!(editor.handle_change("nope", "10").is_err());
    assert_eq!(editor.state().control("brightness").unwrap().value, 100.0);
}

#[test]
fn out_of_range_input_is_clamped() {
    let (mut editor, _dir) = loaded_editor(&solid(4, 4, [0, 0, 0, 255]));
    editor.handle_change("saturate", "500").unwrap();
    editor.handle_change("sepia", "-3").unwrap();
    assert_eq!(editor.state().control("saturate").unwrap().value, 200.0);
    assert_eq!(editor.state().control("sepia").unwrap().value, 0.0);
}

#[test]
fn unchanged_inputs_do_not_rerender() {
    let (mut editor, _dir) = loaded_editor(&solid(8, 8, [50, 60, 70, 255]));
    assert_eq!(editor.recompute_render().unwrap(), RenderOutcome::Unchanged);
    editor.handle_change("grayscale", "40").unwrap();
    assert_eq!(editor.recompute_render().unwrap(), RenderOutcome::Rendered);
    assert_eq!(editor.recompute_render().unwrap(), RenderOutcome::Unchanged);
}

#[test]
fn controls_are_disabled_until_an_image_is_bound() {
    let mut editor = editor();
    let rows = build_rows(&editor.state().editor_controls, editor.state().has_image());
    assert!(rows.iter().all(|r| !r.enabled));

    editor.dispatch(Action::SetImageData { image_data: ImageData::from_url("https://example.com/a.jpg"), from_recent: false });
    let rows = build_rows(&editor.state().editor_controls, editor.state().has_image());
    assert!(rows.iter().all(|r| r.enabled));
}

#[test]
fn reset_restores_defaults_and_clears_text_and_drag() {
    let (mut editor, _dir) = loaded_editor(&solid(8, 8, [0, 0, 0, 255]));
    editor.handle_change("brightness", "150").unwrap();
    editor.handle_input_text("hello");
    editor.pointer_down(1.0, 1.0);
    assert!(editor.is_dragging());
    editor.take_notices();

    editor.handle_reset();

    assert_eq!(editor.state().editor_controls, default_controls());
    assert_eq!(editor.state().text_control.text, "");
    assert_eq!(editor.drag_state(), DragState::Idle);
    assert_eq!(editor.take_notices(), vec![Notice::success(RESET_MESSAGE)]);

    editor.recompute_render().unwrap();
    assert_eq!(editor.filter_data(), Some(DEFAULT_FILTER));
}

// ============================================================================
// Text overlay and drag
// ============================================================================

#[test]
fn text_is_drawn_over_the_filtered_image() {
    let img = solid(800, 800, [0, 0, 0, 255]);
    let (mut editor, _dir) = loaded_editor(&img);
    editor.handle_input_text("Hello");
    assert_eq!(editor.recompute_render().unwrap(), RenderOutcome::Rendered);
    assert_ne!(surface_pixels(&editor), img);

    editor.handle_delete_text();
    editor.recompute_render().unwrap();
    assert_eq!(surface_pixels(&editor), img);
}

#[test]
fn edited_image_is_published_when_the_drag_ends() {
    let (mut editor, _dir) = loaded_editor(&solid(800, 800, [0, 0, 0, 255]));
    editor.handle_input_text("Drag me");
    editor.recompute_render().unwrap();
    let before = editor.state().edited_image.clone();

    editor.pointer_down(400.0, 330.0);
    editor.pointer_move(420.0, 360.0);
    assert_eq!(editor.recompute_render().unwrap(), RenderOutcome::Rendered);
    assert_eq!(editor.state().edited_image, before);

    editor.pointer_up();
    editor.recompute_render().unwrap();
    assert_ne!(editor.state().edited_image, before);
    assert_eq!((editor.state().text_position.x, editor.state().text_position.y), (20.0, 30.0));
}

#[test]
fn strict_hit_mode_ignores_presses_away_from_the_text() {
    let config = EditorConfig { strict_text_hit: true, ..EditorConfig::default() };
    let mut editor = PhotoEditor::new(config).unwrap();
    editor.handle_input_text("Hi");
    editor.pointer_down(5.0, 5.0);
    assert!(!editor.is_dragging());
    editor.pointer_down(360.0, 320.0);
    assert!(editor.is_dragging());
}

#[test]
fn moves_without_a_press_leave_the_text_in_place() {
    let mut editor = editor();
    editor.pointer_move(100.0, 100.0);
    assert_eq!((editor.state().text_position.x, editor.state().text_position.y), (0.0, 0.0));
}

// ============================================================================
// Exports
// ============================================================================

#[test]
fn metadata_with_no_render_has_null_filter_data() {
    let mut editor = editor();
    let data = ImageData::from_value(serde_json::json!({"urls": {"regular": "x"}})).unwrap();
    editor.dispatch(Action::SetImageData { image_data: data, from_recent: false });

    let json: serde_json::Value = serde_json::from_str(&editor.get_metadata().unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({"filterData": null, "newImageData": {"urls": {"regular": "x"}}}));
}

#[test]
fn downloads_write_the_composite_and_metadata() {
    let img = solid(30, 20, [10, 20, 30, 255]);
    let (mut editor, dir) = loaded_editor(&img);
    editor.handle_change("contrast", "120").unwrap();
    editor.recompute_render().unwrap();
    editor.take_notices();

    let png_path = dir.path().join("edited.png");
    editor.download_image(&png_path).unwrap();
    let written = image::open(&png_path).unwrap().to_rgba8();
    assert_eq!(written, surface_pixels(&editor));

    let json_path = dir.path().join("meta.json");
    editor.download_metadata(&json_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["filterData"], "brightness(100%) contrast(120%) saturate(100%) grayscale(0%) sepia(0%) invert(0%)");
    assert!(json["newImageData"]["urls"]["regular"].as_str().unwrap().ends_with("source.png"));

    assert_eq!(editor.take_notices(), vec![Notice::success(IMAGE_MESSAGE), Notice::success(METADATA_MESSAGE)]);
}

#[test]
fn downloading_before_anything_is_drawn_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut no_surface = PhotoEditor::new(EditorConfig::default()).unwrap();
    assert!(matches!(no_surface.download_image(&dir.path().join("a.png")), Err(EditorError::NoSurface)));

    let mut empty = editor();
    assert!(matches!(empty.download_image(&dir.path().join("a.png")), Err(EditorError::NoImage)));
    assert!(!dir.path().join("a.png").exists());
}

#[test]
fn exports_report_through_notices() {
    let img = solid(12, 12, [10, 20, 30, 255]);
    let (mut editor, dir) = loaded_editor(&img);
    editor.take_notices();
    assert!(editor.can_export(ExportKind::Image));
    assert!(editor.can_export(ExportKind::Metadata));

    editor.export(ExportKind::Image, &dir.path().join(ExportKind::Image.file_name()));
    editor.export(ExportKind::Metadata, &dir.path().join("missing").join(ExportKind::Metadata.file_name()));

    let notices = editor.take_notices();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0], Notice::success(IMAGE_MESSAGE));
    assert_eq!(notices[1].kind, NoticeKind::Error);
    assert!(dir.path().join("premagic-edited-image.png").exists());
}

#[test]
fn exports_are_unavailable_without_an_image() {
    let editor = editor();
    assert!(!editor.can_export(ExportKind::Image));
    assert!(!editor.can_export(ExportKind::Metadata));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn filter_string_joins_floored_percentages(values in proptest::collection::vec(0.0f32..=200.0, 6)) {
        let controls: Vec<FilterControl> = default_controls()
            .into_iter()
            .zip(&values)
            .map(|(c, v)| FilterControl { value: *v, ..c })
            .collect();
        let expected = controls
            .iter()
            .map(|c| format!("{}({}%)", c.id, c.value.floor() as i32))
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(compose_filter_string(&controls), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn drag_ends_at_last_pointer_minus_grab_offset(
        start in (0.0f32..500.0, 0.0f32..500.0),
        moves in proptest::collection::vec((-200.0f32..900.0, -200.0f32..900.0), 1..12),
    ) {
        let mut editor = PhotoEditor::new(EditorConfig::default()).unwrap();
        editor.handle_input_text("T");
        editor.pointer_down(start.0, start.1);
        let DragState::Dragging { offset_x, offset_y } = editor.drag_state() else {
            panic!("press did not start a drag");
        };
        for (x, y) in &moves {
            editor.pointer_move(*x, *y);
            prop_assert!(editor.is_dragging());
        }
        editor.pointer_up();
        prop_assert!(!editor.is_dragging());

        let (last_x, last_y) = *moves.last().unwrap();
        let position = editor.state().text_position;
        prop_assert_eq!((position.x, position.y), (last_x - offset_x, last_y - offset_y));

        editor.pointer_move(0.0, 0.0);
        prop_assert_eq!(editor.state().text_position, position);
    }
}
