use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use drawpad_history::HistoryConfig;
use drawpad_scene::Session;

mod script;

use script::Script;

/// Replays a scripted editing session and prints the resulting scene.
#[derive(Parser, Debug)]
#[command(name = "drawpad", version, about)]
struct Cli {
    /// JSON script with the steps to replay.
    script: PathBuf,

    /// History configuration file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the result on a single line.
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting drawpad replay of {}", cli.script.display());

    let config = cli
        .config
        .as_deref()
        .map(HistoryConfig::load_or_default)
        .unwrap_or_default();

    let script = Script::load(&cli.script)?;

    let mut session = Session::new(config);
    session.subscribe(|event| {
        tracing::info!(
            can_undo = !event.is_undo_stack_empty,
            can_redo = !event.is_redo_stack_empty,
            "History changed"
        );
    });

    let outcome = script.run(&mut session)?;

    let json = if cli.compact {
        serde_json::to_string(&outcome)
    } else {
        serde_json::to_string_pretty(&outcome)
    }
    .context("Failed to serialize replay result")?;
    println!("{json}");

    Ok(())
}
