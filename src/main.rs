#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use eframe::egui;
use premagic::app::PremagicApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("premagic v{}", env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 860.0])
            .with_min_inner_size([900.0, 560.0])
            .with_title("Premagic"),
        ..Default::default()
    };
    eframe::run_native(
        "Premagic",
        options,
        Box::new(|cc| Ok(Box::new(PremagicApp::new(cc)?))),
    )
}
