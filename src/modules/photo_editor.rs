mod pe_canvas;
mod pe_drag;
mod pe_main;
mod pe_text;
mod pe_ui;

pub use pe_canvas::Surface;
pub use pe_drag::DragState;
pub use pe_main::{EditorConfig, EditorPhase, ExportKind, PhotoEditor, RenderOutcome, IMAGE_MESSAGE, METADATA_MESSAGE, RESET_MESSAGE};
