//! Stria - hold the trigger key and paint a fading trail over the desktop.

mod headless;
mod overlay;
mod renderer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use stria_core::TrailConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stria", about = "Decorative cursor-trail overlay", version)]
struct Args {
    /// Path to the settings file
    #[arg(long, default_value = "stria.toml")]
    config: PathBuf,

    /// Target frame rate
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Drive the scheduler for N ticks against scripted input and exit
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,

    /// Seed for particle randomness
    #[arg(long, default_value_t = 0x57121a)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let fps = args.fps.clamp(1, 240);
    let config = TrailConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    if let Some(ticks) = args.headless {
        let stats = headless::run(&config, fps, ticks, args.seed);
        tracing::info!(?stats, "headless run complete");
        return Ok(());
    }

    let config = overlay::run(config, fps, args.seed)?;
    if let Err(error) = config.save(&args.config) {
        tracing::warn!(%error, "could not persist settings");
    }
    Ok(())
}
