//! Configuration loading with CLI > file > defaults precedence

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SwapError, SwapResult};

/// Default config file name looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "clipswap.toml";

/// External engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Path or name of the ffmpeg binary
    pub ffmpeg_path: String,
    /// Path or name of the ffprobe binary
    pub ffprobe_path: String,
    /// Per-stage timeout in seconds; absent means no timeout
    pub timeout_secs: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            timeout_secs: None,
        }
    }
}

/// Output framing and container settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Target frame width after scale/pad
    pub frame_width: u32,
    /// Target frame height after scale/pad
    pub frame_height: u32,
    /// Container extension for produced files
    pub container_ext: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        // Portrait 9:16 framing for short-form output
        Self {
            frame_width: 720,
            frame_height: 1280,
            container_ext: "mp4".to_string(),
        }
    }
}

/// Candidate folder scanning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Extensions treated as video candidates (lowercase, no dot)
    pub video_extensions: Vec<String>,
    /// Extensions treated as audio candidates (lowercase, no dot)
    pub audio_extensions: Vec<String>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            video_extensions: ["mp4", "mov", "avi", "mkv", "m4v", "flv", "wmv"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            audio_extensions: ["mp3", "m4a", "aac", "wav", "flac", "ogg", "wma"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// Complete ClipSwap configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    pub engine: EngineSettings,
    pub output: OutputSettings,
    pub scan: ScanSettings,
}

impl SwapConfig {
    /// Load configuration.
    ///
    /// An explicitly requested file must exist and parse; the implicit
    /// `clipswap.toml` is only used when present in the working
    /// directory. Defaults cover everything else.
    pub fn load(explicit: Option<&Path>) -> SwapResult<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(SwapError::configuration(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::from_file(path);
        }

        let implicit = Path::new(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            return Self::from_file(implicit);
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    fn from_file(path: &Path) -> SwapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SwapConfig = toml::from_str(&content).map_err(|e| {
            SwapError::configuration(format!("failed to parse {}: {}", path.display(), e))
        })?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_sections() {
        let config = SwapConfig::default();
        assert_eq!(config.engine.ffmpeg_path, "ffmpeg");
        assert_eq!(config.engine.ffprobe_path, "ffprobe");
        assert_eq!(config.engine.timeout_secs, None);
        assert_eq!(config.output.frame_width, 720);
        assert_eq!(config.output.frame_height, 1280);
        assert!(config.scan.video_extensions.contains(&"mp4".to_string()));
        assert!(config.scan.audio_extensions.contains(&"wav".to_string()));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let parsed: SwapConfig = toml::from_str(
            r#"
            [engine]
            timeout_secs = 120
            "#,
        )
        .unwrap();
        assert_eq!(parsed.engine.timeout_secs, Some(120));
        assert_eq!(parsed.engine.ffmpeg_path, "ffmpeg");
        assert_eq!(parsed.output.container_ext, "mp4");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = SwapConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, SwapError::Configuration { .. }));
    }
}
