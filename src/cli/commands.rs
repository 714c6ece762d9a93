//! Command implementations
//!
//! Argument collection and batch orchestration. All input validation
//! happens here, before any external process is spawned, so bad paths
//! and empty pools fail fast with a clear cause.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::args::{AudioSwapArgs, HeadReplaceArgs, TailReplaceArgs};
use crate::config::SwapConfig;
use crate::encoder::EncoderProfile;
use crate::error::SwapError;
use crate::media::{scan_folder, CandidatePool, ClipKind};
use crate::pipeline::{BatchReport, PipelineExecutor, PipelineRequest};
use crate::probe::{DurationCache, FfprobeProber};
use crate::stage::{verify_engines, FfmpegStageRunner, ScaleTarget};
use crate::utils::path::{clean_path, dir_name, file_stem};
use crate::utils::time::format_seconds;

/// Execute the audio-swap command
pub async fn audio_swap(args: AudioSwapArgs, config: &SwapConfig, json: bool) -> Result<()> {
    let video = existing_file(&args.video)?;
    let folder = clean_path(&args.audio_folder);

    let clips = scan_folder(&folder, &config.scan.audio_extensions, ClipKind::Audio)?;
    let pool = non_empty_pool(clips, &folder, "audio")?;

    let out_dir = resolve_out_dir(args.out_dir.as_deref(), || {
        parent_dir(&video).join(format!("{}_AudioSwap", file_stem(&video)))
    })?;
    let prefix = file_stem(&video);

    let executor = build_executor(config).await?;
    let report = executor
        .execute(PipelineRequest::AudioSwap {
            anchor: video,
            pool,
            out_dir,
            prefix,
        })
        .await?;

    summarize(&report, json)
}

/// Execute the tail-replace command
pub async fn tail_replace(args: TailReplaceArgs, config: &SwapConfig, json: bool) -> Result<()> {
    let upsell = existing_file(&args.upsell)?;
    let folder = clean_path(&args.folder);
    let start_seconds = positive_seconds(args.start, "start")?;

    let clips = scan_folder(&folder, &config.scan.video_extensions, ClipKind::Video)?;
    let pool = non_empty_pool(clips, &folder, "video")?;

    let prefix = dir_name(&folder);
    let out_dir = resolve_out_dir(args.out_dir.as_deref(), || {
        folder.join(format!("{}_Upsell", prefix))
    })?;

    let executor = build_executor(config).await?;
    let report = executor
        .execute(PipelineRequest::TailReplace {
            upsell,
            pool,
            start_seconds,
            out_dir,
            prefix,
        })
        .await?;

    summarize(&report, json)
}

/// Execute the head-replace command
pub async fn head_replace(args: HeadReplaceArgs, config: &SwapConfig, json: bool) -> Result<()> {
    let video = existing_file(&args.video)?;
    let folder = clean_path(&args.folder);
    let target_seconds = positive_seconds(args.target, "target")?;

    let clips = scan_folder(&folder, &config.scan.video_extensions, ClipKind::Video)?;
    let pool = non_empty_pool(clips, &folder, "video")?;

    let prefix = dir_name(&parent_dir(&video));
    let out_dir = resolve_out_dir(args.out_dir.as_deref(), || {
        parent_dir(&video).join(&prefix)
    })?;

    let executor = build_executor(config).await?;
    let report = executor
        .execute(PipelineRequest::HeadReplace {
            anchor: video,
            pool,
            target_seconds,
            out_dir,
            prefix,
        })
        .await?;

    summarize(&report, json)
}

/// Validate the external engine and assemble the pipeline services.
async fn build_executor(config: &SwapConfig) -> Result<PipelineExecutor> {
    verify_engines(&config.engine.ffmpeg_path, &config.engine.ffprobe_path)
        .await
        .context("install ffmpeg and ffprobe or point [engine] at them")?;

    let profile = EncoderProfile::resolve(&config.engine.ffmpeg_path).await;
    if profile.is_hardware() {
        info!("hardware acceleration detected (speed-optimized encode)");
    } else {
        info!("using software encoding (balanced quality)");
    }

    let mut runner =
        FfmpegStageRunner::new(config.engine.ffmpeg_path.clone(), profile);
    if let Some(secs) = config.engine.timeout_secs {
        runner = runner.with_timeout(Duration::from_secs(secs));
    }

    let probe = DurationCache::new(Arc::new(FfprobeProber::new(
        config.engine.ffprobe_path.clone(),
    )));
    let scale = ScaleTarget::new(config.output.frame_width, config.output.frame_height);

    Ok(PipelineExecutor::new(
        Arc::new(runner),
        probe,
        scale,
        config.output.container_ext.clone(),
    ))
}

fn existing_file(raw: &str) -> Result<PathBuf> {
    let path = clean_path(raw);
    if !path.is_file() {
        return Err(SwapError::configuration(format!(
            "file not found: {}",
            path.display()
        ))
        .into());
    }
    Ok(path)
}

fn positive_seconds(value: f64, name: &str) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SwapError::configuration(format!(
            "{} must be a positive number of seconds, got {}",
            name, value
        ))
        .into());
    }
    Ok(value)
}

fn non_empty_pool(
    clips: Vec<crate::media::MediaClip>,
    folder: &Path,
    kind: &str,
) -> Result<CandidatePool> {
    if clips.is_empty() {
        return Err(SwapError::configuration(format!(
            "no {} files found in {}",
            kind,
            folder.display()
        ))
        .into());
    }
    info!("found {} {} files in {}", clips.len(), kind, folder.display());
    Ok(CandidatePool::new(clips))
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf()
}

fn resolve_out_dir(
    override_dir: Option<&str>,
    default: impl FnOnce() -> PathBuf,
) -> Result<PathBuf> {
    let out_dir = override_dir.map(clean_path).unwrap_or_else(default);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output folder {}", out_dir.display()))?;
    info!("output folder: {}", out_dir.display());
    Ok(out_dir)
}

/// Log the batch result and optionally emit the JSON report.
fn summarize(report: &BatchReport, json: bool) -> Result<()> {
    for outcome in report.outcomes.iter().filter(|o| !o.is_success()) {
        warn!(
            "{} failed at {:?}: {}",
            outcome.source.display(),
            outcome.failed_phase.expect("failed outcome carries a phase"),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    let short = report
        .outcomes
        .iter()
        .filter(|o| o.partial_coverage)
        .count();
    if short > 0 {
        warn!("{} output(s) fell short of the requested duration", short);
    }

    info!(
        "{}: created {} of {} output(s) in {}",
        report.kind,
        report.succeeded(),
        report.outcomes.len(),
        report.out_dir.display()
    );

    if let Some(sample) = report.outcomes.iter().find(|o| o.is_success()) {
        if let (Some(output), Some(seconds)) = (&sample.output, sample.output_seconds) {
            info!(
                "sample output: {} ({})",
                output.display(),
                format_seconds(seconds)
            );
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }

    Ok(())
}
