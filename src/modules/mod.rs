pub mod control_panel;
pub mod editor_store;
pub mod filters;
pub mod image_export;
pub mod image_source;
pub mod photo_editor;
pub mod toast;
