mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::CovidPandaApp;
use config::ViewerConfig;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let config = ViewerConfig::default();
    let table = data::loader::load_file(&config.input_path)
        .with_context(|| format!("loading {}", config.input_path.display()))?;
    let source = config.input_path.clone();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    let state = AppState::new(config, table, source);
    eframe::run_native(
        "Covid Panda – Country Comparison",
        options,
        Box::new(|_cc| Ok(Box::new(CovidPandaApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running viewer: {e}"))
}
