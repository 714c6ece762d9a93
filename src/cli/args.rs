//! Command-line argument definitions

use clap::Args;

/// Arguments for the audio-swap command
#[derive(Args, Debug)]
pub struct AudioSwapArgs {
    /// Source video whose audio gets replaced
    #[arg(short, long)]
    pub video: String,

    /// Folder of audio files; one output is produced per file
    #[arg(short, long)]
    pub audio_folder: String,

    /// Output folder (default: "<video stem>_AudioSwap" beside the video)
    #[arg(short, long)]
    pub out_dir: Option<String>,
}

/// Arguments for the tail-replace command
#[derive(Args, Debug)]
pub struct TailReplaceArgs {
    /// Upsell clip spliced over each video's tail
    #[arg(short, long)]
    pub upsell: String,

    /// Folder of videos to process
    #[arg(short, long)]
    pub folder: String,

    /// Seconds of each original to keep before the upsell begins
    #[arg(short, long)]
    pub start: f64,

    /// Output folder (default: "<folder name>_Upsell" inside the folder)
    #[arg(short, long)]
    pub out_dir: Option<String>,
}

/// Arguments for the head-replace command
#[derive(Args, Debug)]
pub struct HeadReplaceArgs {
    /// Main video supplying the tail and the full audio track
    #[arg(short, long)]
    pub video: String,

    /// Folder of candidate videos; each takes a turn as the new head
    #[arg(short, long)]
    pub folder: String,

    /// Length of the replaced opening in seconds
    #[arg(short, long)]
    pub target: f64,

    /// Output folder (default: named after the video's folder, beside it)
    #[arg(short, long)]
    pub out_dir: Option<String>,
}
