//! Media duration probing via ffprobe

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::trace;

use crate::error::{SwapError, SwapResult};

/// Port for media duration queries
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Duration of the media file at `path` in seconds
    async fn duration_seconds(&self, path: &Path) -> SwapResult<f64>;
}

/// ffprobe-backed prober
pub struct FfprobeProber {
    ffprobe_path: String,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

#[async_trait]
impl MediaProber for FfprobeProber {
    async fn duration_seconds(&self, path: &Path) -> SwapResult<f64> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .output()
            .await
            .map_err(|e| SwapError::Probe {
                path: path.to_path_buf(),
                detail: format!("failed to spawn ffprobe: {}", e),
            })?;

        if !output.status.success() {
            return Err(SwapError::Probe {
                path: path.to_path_buf(),
                detail: format!("ffprobe exited with {}", output.status),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        text.parse::<f64>().map_err(|_| SwapError::Probe {
            path: path.to_path_buf(),
            detail: format!("non-numeric duration: {:?}", text),
        })
    }
}

/// Per-run duration memoization around a [`MediaProber`].
///
/// Pool entries get probed repeatedly while planning fillers; caching
/// by path keeps that to one external call per file per run.
#[derive(Clone)]
pub struct DurationCache {
    prober: Arc<dyn MediaProber>,
    cache: Arc<Mutex<HashMap<PathBuf, f64>>>,
}

impl DurationCache {
    pub fn new(prober: Arc<dyn MediaProber>) -> Self {
        Self {
            prober,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Duration of `path` in seconds, probing at most once per path
    pub async fn duration(&self, path: &Path) -> SwapResult<f64> {
        if let Some(&seconds) = self.cache.lock().unwrap().get(path) {
            trace!("duration cache hit for {}", path.display());
            return Ok(seconds);
        }

        let seconds = self.prober.duration_seconds(path).await?;
        self.cache
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), seconds);
        Ok(seconds)
    }
}
