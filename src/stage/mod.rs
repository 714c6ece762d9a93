//! Single-transform execution against the external engine
//!
//! Every operation here maps to one ffmpeg invocation that writes
//! exactly one new file and never touches its inputs. Failures carry
//! the operation name and the engine's exit detail; the caller decides
//! how far the damage spreads.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::encoder::EncoderProfile;
use crate::error::{SwapError, SwapResult};

/// Named transform operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOp {
    /// Drop the video stream, encode audio to AAC
    ExtractAudio,
    /// Drop the audio stream, optionally seek/trim, optionally scale/pad
    MuteTrimScale,
    /// Join video-only segments listed in a concat manifest
    Concatenate,
    /// Combine a video-only and an audio artifact, shortest-wins
    Mux,
}

impl StageOp {
    pub fn name(self) -> &'static str {
        match self {
            StageOp::ExtractAudio => "extract-audio",
            StageOp::MuteTrimScale => "mute-trim-scale",
            StageOp::Concatenate => "concatenate",
            StageOp::Mux => "mux",
        }
    }
}

/// Fixed output frame size, letterboxed/pillarboxed with black bars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleTarget {
    pub width: u32,
    pub height: u32,
}

impl ScaleTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Filter expression preserving aspect ratio inside the target frame
    pub fn filter_expr(&self) -> String {
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:black",
            w = self.width,
            h = self.height
        )
    }
}

/// One transform request: operation, inputs, parameters, output path
#[derive(Debug, Clone)]
pub struct StageSpec {
    pub op: StageOp,
    pub inputs: Vec<PathBuf>,
    /// Start offset into the first input, seconds
    pub seek_seconds: Option<f64>,
    /// Cut the output to this many seconds from the (seeked) start
    pub trim_seconds: Option<f64>,
    pub scale: Option<ScaleTarget>,
    pub output: PathBuf,
}

impl StageSpec {
    pub fn extract_audio(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            op: StageOp::ExtractAudio,
            inputs: vec![input.into()],
            seek_seconds: None,
            trim_seconds: None,
            scale: None,
            output: output.into(),
        }
    }

    pub fn mute_trim_scale(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            op: StageOp::MuteTrimScale,
            inputs: vec![input.into()],
            seek_seconds: None,
            trim_seconds: None,
            scale: None,
            output: output.into(),
        }
    }

    /// Concatenate the segments listed in `manifest` (see
    /// [`write_concat_manifest`])
    pub fn concatenate(manifest: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            op: StageOp::Concatenate,
            inputs: vec![manifest.into()],
            seek_seconds: None,
            trim_seconds: None,
            scale: None,
            output: output.into(),
        }
    }

    pub fn mux(
        video: impl Into<PathBuf>,
        audio: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            op: StageOp::Mux,
            inputs: vec![video.into(), audio.into()],
            seek_seconds: None,
            trim_seconds: None,
            scale: None,
            output: output.into(),
        }
    }

    pub fn with_seek(mut self, seconds: f64) -> Self {
        self.seek_seconds = Some(seconds);
        self
    }

    pub fn with_trim(mut self, seconds: f64) -> Self {
        self.trim_seconds = Some(seconds);
        self
    }

    pub fn with_scale(mut self, scale: ScaleTarget) -> Self {
        self.scale = Some(scale);
        self
    }

    fn stage_error(&self, detail: impl Into<String>) -> SwapError {
        SwapError::Stage {
            operation: self.op.name().to_string(),
            detail: detail.into(),
        }
    }
}

/// Write a concat manifest: one `file '<path>'` line per segment, in
/// join order. The caller owns the file and removes it with the rest
/// of the run's intermediates.
pub fn write_concat_manifest(manifest: &Path, segments: &[&Path]) -> SwapResult<()> {
    let mut file = std::fs::File::create(manifest)?;
    for segment in segments {
        writeln!(file, "file '{}'", segment.display())?;
    }
    Ok(())
}

/// Port for executing a single transform
#[async_trait]
pub trait StageRunner: Send + Sync {
    /// Run the transform, returning the written output path
    async fn run(&self, spec: &StageSpec) -> SwapResult<PathBuf>;
}

/// ffmpeg-backed stage runner
pub struct FfmpegStageRunner {
    ffmpeg_path: String,
    profile: EncoderProfile,
    timeout: Option<Duration>,
}

impl FfmpegStageRunner {
    pub fn new(ffmpeg_path: impl Into<String>, profile: EncoderProfile) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            profile,
            timeout: None,
        }
    }

    /// Bound every stage invocation to `timeout`; a stage that exceeds
    /// it is killed and surfaced as a timeout failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Assemble the argument list for one invocation.
    fn build_args(&self, spec: &StageSpec) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into(), "-loglevel".into(), "error".into()];

        match spec.op {
            StageOp::ExtractAudio => {
                self.push_input(&mut args, &spec.inputs[0]);
                args.extend(["-vn".into(), "-c:a".into(), "aac".into()]);
            }
            StageOp::MuteTrimScale => {
                self.push_input(&mut args, &spec.inputs[0]);
                if let Some(seek) = spec.seek_seconds {
                    args.extend(["-ss".into(), seek.to_string()]);
                }
                if let Some(trim) = spec.trim_seconds {
                    args.extend(["-t".into(), trim.to_string()]);
                }
                if let Some(scale) = &spec.scale {
                    args.extend(["-vf".into(), scale.filter_expr()]);
                }
                args.push("-an".into());
                self.push_video_codec(&mut args);
            }
            StageOp::Concatenate => {
                args.extend(["-f".into(), "concat".into(), "-safe".into(), "0".into()]);
                args.extend(["-i".into(), spec.inputs[0].display().to_string()]);
                if let Some(scale) = &spec.scale {
                    args.extend(["-vf".into(), scale.filter_expr()]);
                }
                args.push("-an".into());
                self.push_video_codec(&mut args);
            }
            StageOp::Mux => {
                self.push_input(&mut args, &spec.inputs[0]);
                args.extend(["-i".into(), spec.inputs[1].display().to_string()]);
                args.extend([
                    "-c:v".into(),
                    "copy".into(),
                    "-c:a".into(),
                    "aac".into(),
                    "-shortest".into(),
                ]);
            }
        }

        args.push(spec.output.display().to_string());
        args
    }

    fn push_input(&self, args: &mut Vec<String>, input: &Path) {
        if self.profile.hwaccel_decode {
            args.extend(["-hwaccel".into(), "videotoolbox".into()]);
        }
        args.extend(["-i".into(), input.display().to_string()]);
    }

    fn push_video_codec(&self, args: &mut Vec<String>) {
        args.extend(["-c:v".into(), self.profile.video_codec.clone()]);
        args.extend(self.profile.quality_args.iter().cloned());
    }
}

#[async_trait]
impl StageRunner for FfmpegStageRunner {
    async fn run(&self, spec: &StageSpec) -> SwapResult<PathBuf> {
        let args = self.build_args(spec);
        debug!("{} {}", self.ffmpeg_path, args.join(" "));

        let mut command = Command::new(&self.ffmpeg_path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let wait = command.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                SwapError::StageTimeout {
                    operation: spec.op.name().to_string(),
                    seconds: limit.as_secs(),
                }
            })?,
            None => wait.await,
        }
        .map_err(|e| spec.stage_error(format!("failed to spawn ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.lines().last().unwrap_or("no engine output");
            return Err(spec.stage_error(format!("{} ({})", output.status, detail)));
        }

        Ok(spec.output.clone())
    }
}

/// Verify both engine binaries answer `-version`.
///
/// Run once at startup, before any batch work begins.
pub async fn verify_engines(ffmpeg_path: &str, ffprobe_path: &str) -> SwapResult<()> {
    for binary in [ffmpeg_path, ffprobe_path] {
        let status = Command::new(binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) if status.success() => {}
            Ok(status) => {
                return Err(SwapError::configuration(format!(
                    "{} -version exited with {}",
                    binary, status
                )))
            }
            Err(e) => {
                return Err(SwapError::configuration(format!(
                    "{} not found: {}",
                    binary, e
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> FfmpegStageRunner {
        FfmpegStageRunner::new("ffmpeg", EncoderProfile::software())
    }

    #[test]
    fn scale_filter_expression() {
        let expr = ScaleTarget::new(720, 1280).filter_expr();
        assert_eq!(
            expr,
            "scale=720:1280:force_original_aspect_ratio=decrease,pad=720:1280:(ow-iw)/2:(oh-ih)/2:black"
        );
    }

    #[test]
    fn extract_audio_args() {
        let spec = StageSpec::extract_audio("/in/a.mp4", "/out/a.m4a");
        let args = runner().build_args(&spec);
        assert_eq!(
            args,
            vec![
                "-y",
                "-loglevel",
                "error",
                "-i",
                "/in/a.mp4",
                "-vn",
                "-c:a",
                "aac",
                "/out/a.m4a"
            ]
        );
    }

    #[test]
    fn mute_trim_scale_args_carry_seek_trim_and_filter() {
        let spec = StageSpec::mute_trim_scale("/in/a.mp4", "/out/a.mp4")
            .with_seek(17.0)
            .with_trim(4.5)
            .with_scale(ScaleTarget::new(720, 1280));
        let args = runner().build_args(&spec);

        let joined = args.join(" ");
        assert!(joined.contains("-ss 17"));
        assert!(joined.contains("-t 4.5"));
        assert!(joined.contains("-vf scale=720:1280"));
        assert!(joined.contains("-an -c:v libx264 -crf 23 -preset fast"));
        assert!(joined.ends_with("/out/a.mp4"));
    }

    #[test]
    fn mux_copies_video_and_encodes_audio_shortest() {
        let spec = StageSpec::mux("/work/video.mp4", "/work/audio.m4a", "/out/final.mp4");
        let args = runner().build_args(&spec);
        let joined = args.join(" ");
        assert!(joined.contains("-i /work/video.mp4 -i /work/audio.m4a"));
        assert!(joined.contains("-c:v copy -c:a aac -shortest"));
    }

    #[test]
    fn concatenate_reads_the_manifest() {
        let spec = StageSpec::concatenate("/work/list.txt", "/out/joined.mp4")
            .with_scale(ScaleTarget::new(720, 1280));
        let args = runner().build_args(&spec);
        let joined = args.join(" ");
        assert!(joined.contains("-f concat -safe 0 -i /work/list.txt"));
        assert!(joined.contains("-vf scale="));
    }

    #[test]
    fn hardware_profile_requests_hwaccel_decode() {
        let mut profile = EncoderProfile::software();
        profile.hwaccel_decode = true;
        let runner = FfmpegStageRunner::new("ffmpeg", profile);
        let spec = StageSpec::mute_trim_scale("/in/a.mp4", "/out/a.mp4");
        let joined = runner.build_args(&spec).join(" ");
        assert!(joined.contains("-hwaccel videotoolbox -i /in/a.mp4"));
    }

    #[test]
    fn manifest_lists_segments_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("list.txt");
        write_concat_manifest(&manifest, &[Path::new("/a.mp4"), Path::new("/b.mp4")]).unwrap();

        let content = std::fs::read_to_string(&manifest).unwrap();
        assert_eq!(content, "file '/a.mp4'\nfile '/b.mp4'\n");
    }
}
