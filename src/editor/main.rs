mod app;
mod canvas;

use app::PathMakerApp;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Interactive path editor
#[derive(Parser, Debug)]
#[command(name = "path-maker-editor", version)]
struct Args {
    /// Path file to open, or literal path data
    input: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PathMaker",
        options,
        Box::new(move |cc| Ok(Box::new(PathMakerApp::new(cc, args.input)))),
    )
}
