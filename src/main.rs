//! Valley GUI
//!
//! A graphical client for the 5x5 valley game with an engine thinking in
//! the background.

use anyhow::anyhow;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use valley::ui::ValleyApp;
use valley::AlphaBetaEngine;

/// Desktop client for the valley board game.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Stop deepening after this many plies (deepens until stopped when omitted)
    #[arg(long)]
    depth_limit: Option<u32>,

    /// Entry cap for the engine's move-ordering table
    #[arg(long, default_value_t = 30_000_000)]
    tt_entries: usize,

    /// Start with first-move score collection enabled
    #[arg(long)]
    collect_first_move_scores: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let engine = AlphaBetaEngine::with_config(args.depth_limit, args.tt_entries);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 750.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Valley"),
        ..Default::default()
    };

    eframe::run_native(
        "Valley",
        options,
        Box::new(move |cc| {
            Ok(Box::new(ValleyApp::new(
                cc,
                engine,
                args.collect_first_move_scores,
            )))
        }),
    )
    .map_err(|e| anyhow!("{e}"))
}
