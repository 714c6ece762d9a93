//! ClipSwap CLI
//!
//! Batch-produces derivative video files with ffmpeg: swap a video's
//! audio track against a folder of audio files, replace the tail of
//! every video in a folder with an upsell clip, or replace the head of
//! every video with duration-matched material from the folder itself.
//!
//! # Usage
//!
//! ```bash
//! clipswap audio-swap --video main.mp4 --audio-folder tracks/
//! clipswap tail-replace --upsell upsell.mp4 --folder videos/ --start 17
//! clipswap head-replace --video main.mp4 --folder hooks/ --target 10
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use clipswap::cli::{commands, Cli, Commands};
use clipswap::config::SwapConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the flag when both are present
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("starting clipswap");

    let config = SwapConfig::load(cli.config.as_deref().map(Path::new))?;

    match cli.command {
        Commands::AudioSwap(args) => commands::audio_swap(args, &config, cli.json).await?,
        Commands::TailReplace(args) => commands::tail_replace(args, &config, cli.json).await?,
        Commands::HeadReplace(args) => commands::head_replace(args, &config, cli.json).await?,
    }

    info!("clipswap completed");
    Ok(())
}
