mod app;
mod logging;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use cumulus::engine::EngineConfig;
use log::info;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Entity tree JSON. Dragged group positions are written back to it.
    #[arg(long)]
    tree: Option<PathBuf>,

    /// Engine tuning JSON; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log specification such as `debug` or `cumulus::engine=debug`.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _logger = logging::init_logging(args.log_level.as_deref())?;

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    match &args.tree {
        Some(path) => info!("viewing entity tree {}", path.display()),
        None => info!("no --tree given; showing the demo tree"),
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "cumulus",
        options,
        Box::new(move |cc| Ok(Box::new(app::CumulusApp::new(cc, args.tree.clone(), config)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
