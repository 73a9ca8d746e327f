mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod view;

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;
use env_logger::Env;

use app::{DashboardApp, Session};
use config::Config;
use data::loader;
use state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    let loaded = loader::load_file(&config.data);

    if config.json {
        // Headless: a load failure ends the run with a non-zero status.
        let dataset = loaded?;
        let criteria = config.initial_criteria(&dataset)?;
        let view = view::render(&dataset, &criteria)?;
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    let session = match loaded {
        Ok(dataset) => {
            let criteria = config.initial_criteria(&dataset)?;
            Session::Ready(AppState::new(Arc::new(dataset), criteria)?)
        }
        Err(e) => Session::Failed(e),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Food Delivery Analysis")
            .with_inner_size([config.width, config.height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let source = config.data.clone();
    eframe::run_native(
        "Food Delivery Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(source, session)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
