pub mod app;
pub mod error;
pub mod modules;
pub mod settings;
pub mod style;
