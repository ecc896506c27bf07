use std::error::Error;
use std::path::PathBuf;

use eframe::{run_native, NativeOptions};
use egui::ViewportBuilder;
use graph_studio::app::APP_NAME;
use graph_studio::config::ENV_CONFIG;
use graph_studio::{GraphStudioApp, StudioConfig};
use log::error;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let path: Option<PathBuf> =
        StudioConfig::path_from(std::env::args().skip(1), std::env::var(ENV_CONFIG).ok());
    let config = StudioConfig::load(path.as_deref()).inspect_err(|e| error!("config: {e}"))?;

    let native_options = NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([1100.0, 760.0]),
        ..Default::default()
    };
    run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(GraphStudioApp::new(cc, &config)))),
    )?;
    Ok(())
}
