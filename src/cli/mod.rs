//! CLI module for ClipSwap
//!
//! This module handles command-line argument parsing and command
//! execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// ClipSwap batch video producer
///
/// Produces derivative videos from a source video and a pool of
/// replacement media: swap the audio track, replace the tail with an
/// upsell clip, or replace the head with duration-matched candidates.
#[derive(Parser)]
#[command(name = "clipswap")]
#[command(about = "Batch-produce derivative videos with ffmpeg")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Configuration file (default: ./clipswap.toml when present)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Print the batch report as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create one output per audio file, all sharing the source visuals
    AudioSwap(args::AudioSwapArgs),
    /// Replace the tail of every video in a folder with an upsell clip
    TailReplace(args::TailReplaceArgs),
    /// Replace the head of every video in a folder with composed candidates
    HeadReplace(args::HeadReplaceArgs),
}
