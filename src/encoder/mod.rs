//! Encoder profile resolution

use tokio::process::Command;
use tracing::{debug, info};

/// Hardware encoder looked for in the engine's capability listing
const HARDWARE_ENCODER: &str = "h264_videotoolbox";

/// Software fallback encoder
const SOFTWARE_ENCODER: &str = "libx264";

/// Resolved encoder selection for the whole batch.
///
/// Resolved once at startup and read-only afterwards. This is the one
/// place where a failure is swallowed: if the capability query cannot
/// run or parse, the software profile is used without complaint. Every
/// other component surfaces a typed error instead of defaulting.
#[derive(Debug, Clone)]
pub struct EncoderProfile {
    /// Encoder name passed to `-c:v`
    pub video_codec: String,
    /// Quality parameter tokens appended after the codec selection
    pub quality_args: Vec<String>,
    /// Whether to request hardware-accelerated decode on inputs
    pub hwaccel_decode: bool,
}

impl EncoderProfile {
    /// Query the engine's encoder listing and pick a profile.
    pub async fn resolve(ffmpeg_path: &str) -> Self {
        let listing = Command::new(ffmpeg_path)
            .args(["-hide_banner", "-encoders"])
            .output()
            .await;

        match listing {
            Ok(output) if String::from_utf8_lossy(&output.stdout).contains(HARDWARE_ENCODER) => {
                info!("hardware encoder available, using {}", HARDWARE_ENCODER);
                Self::hardware()
            }
            Ok(_) => {
                info!("using software encoder {}", SOFTWARE_ENCODER);
                Self::software()
            }
            Err(e) => {
                debug!("encoder listing failed ({}), using software profile", e);
                Self::software()
            }
        }
    }

    /// Speed-biased hardware profile
    fn hardware() -> Self {
        Self {
            video_codec: HARDWARE_ENCODER.to_string(),
            quality_args: ["-b:v", "10M", "-realtime", "1", "-prio_speed", "1"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            hwaccel_decode: true,
        }
    }

    /// Balanced software profile
    pub fn software() -> Self {
        Self {
            video_codec: SOFTWARE_ENCODER.to_string(),
            quality_args: ["-crf", "23", "-preset", "fast"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            hwaccel_decode: false,
        }
    }

    pub fn is_hardware(&self) -> bool {
        self.video_codec == HARDWARE_ENCODER
    }
}
