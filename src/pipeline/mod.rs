//! Multi-stage pipeline execution
//!
//! One executor drives the three derivative-production pipelines,
//! sequencing transform stages per output file, tracking intermediate
//! artifacts in a per-run scratch directory, and accumulating per-file
//! outcomes. A file's failure never stops the rest of the batch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{SwapError, SwapResult};
use crate::media::CandidatePool;
use crate::probe::DurationCache;
use crate::stage::{ScaleTarget, StageRunner};

mod audio_swap;
mod head_replace;
mod tail_replace;

/// Scratch directory prefix; nothing carrying it survives a run
const SCRATCH_PREFIX: &str = ".clipswap-";

/// The three derivative-production pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineKind {
    AudioSwap,
    TailReplace,
    HeadReplace,
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineKind::AudioSwap => "audio-swap",
            PipelineKind::TailReplace => "tail-replace",
            PipelineKind::HeadReplace => "head-replace",
        };
        write!(f, "{}", name)
    }
}

/// Per-output-file progress through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Started,
    AudioExtracted,
    SegmentsBuilt,
    Concatenated,
    Muxed,
    Finalized,
}

/// Mutable state for producing one output file.
///
/// All intermediates live in a scratch directory created inside the
/// output folder; dropping the run removes them, so cleanup happens
/// exactly once on success, failure, and interrupt alike.
pub struct PipelineRun {
    scratch: TempDir,
    artifacts: Vec<PathBuf>,
    phase: RunPhase,
}

impl PipelineRun {
    pub fn create(out_dir: &Path) -> SwapResult<Self> {
        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(out_dir)?;
        Ok(Self {
            scratch,
            artifacts: Vec::new(),
            phase: RunPhase::Started,
        })
    }

    /// Reserve a scratch path for a named intermediate artifact
    pub fn artifact(&mut self, name: &str) -> PathBuf {
        let path = self.scratch.path().join(name);
        self.artifacts.push(path.clone());
        path
    }

    pub fn advance(&mut self, phase: RunPhase) {
        debug!("pipeline phase: {:?}", phase);
        self.phase = phase;
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Remove the scratch directory and everything recorded in it.
    ///
    /// Dropping the run has the same effect; this variant reports
    /// removal problems instead of swallowing them.
    pub fn finish(self) {
        debug!("removing {} intermediate artifact(s)", self.artifacts.len());
        if let Err(e) = self.scratch.close() {
            warn!("failed to remove scratch directory: {}", e);
        }
    }
}

/// Outcome of producing one output file
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// 1-based position in the batch
    pub index: usize,
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    /// Probed duration of the final artifact, seconds
    pub output_seconds: Option<f64>,
    /// The composed segment fell short of the requested target
    pub partial_coverage: bool,
    pub failed_phase: Option<RunPhase>,
    pub error: Option<String>,
}

impl FileOutcome {
    fn success(
        index: usize,
        source: PathBuf,
        output: PathBuf,
        output_seconds: f64,
        partial_coverage: bool,
    ) -> Self {
        Self {
            index,
            source,
            output: Some(output),
            output_seconds: Some(output_seconds),
            partial_coverage,
            failed_phase: None,
            error: None,
        }
    }

    fn failure(index: usize, source: PathBuf, phase: RunPhase, error: &SwapError) -> Self {
        Self {
            index,
            source,
            output: None,
            output_seconds: None,
            partial_coverage: false,
            failed_phase: Some(phase),
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Accumulated result of a whole batch
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub kind: PipelineKind,
    pub out_dir: PathBuf,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Parameters for one batch
#[derive(Debug, Clone)]
pub enum PipelineRequest {
    /// One anchor video, one output per audio clip in the pool
    AudioSwap {
        anchor: PathBuf,
        pool: CandidatePool,
        out_dir: PathBuf,
        prefix: String,
    },
    /// Replace everything past `start_seconds` with the upsell clip
    TailReplace {
        upsell: PathBuf,
        pool: CandidatePool,
        start_seconds: f64,
        out_dir: PathBuf,
        prefix: String,
    },
    /// Replace the first `target_seconds` of the anchor with composed
    /// candidate material
    HeadReplace {
        anchor: PathBuf,
        pool: CandidatePool,
        target_seconds: f64,
        out_dir: PathBuf,
        prefix: String,
    },
}

impl PipelineRequest {
    pub fn kind(&self) -> PipelineKind {
        match self {
            PipelineRequest::AudioSwap { .. } => PipelineKind::AudioSwap,
            PipelineRequest::TailReplace { .. } => PipelineKind::TailReplace,
            PipelineRequest::HeadReplace { .. } => PipelineKind::HeadReplace,
        }
    }

    fn out_dir(&self) -> &Path {
        match self {
            PipelineRequest::AudioSwap { out_dir, .. }
            | PipelineRequest::TailReplace { out_dir, .. }
            | PipelineRequest::HeadReplace { out_dir, .. } => out_dir,
        }
    }
}

/// Drives pipelines against the external engine
pub struct PipelineExecutor {
    runner: Arc<dyn StageRunner>,
    probe: DurationCache,
    scale: ScaleTarget,
    container_ext: String,
}

impl PipelineExecutor {
    pub fn new(
        runner: Arc<dyn StageRunner>,
        probe: DurationCache,
        scale: ScaleTarget,
        container_ext: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            probe,
            scale,
            container_ext: container_ext.into(),
        }
    }

    /// Run a whole batch, one output file fully completed (including
    /// cleanup) before the next begins.
    ///
    /// Returns `Err` only for whole-batch-fatal conditions; per-file
    /// failures are recorded in the report.
    pub async fn execute(&self, request: PipelineRequest) -> SwapResult<BatchReport> {
        let kind = request.kind();
        let out_dir = request.out_dir().to_path_buf();
        let started_at = Local::now();

        let outcomes = match &request {
            PipelineRequest::AudioSwap {
                anchor,
                pool,
                out_dir,
                prefix,
            } => self.run_audio_swap(anchor, pool, out_dir, prefix).await?,
            PipelineRequest::TailReplace {
                upsell,
                pool,
                start_seconds,
                out_dir,
                prefix,
            } => {
                self.run_tail_replace(upsell, pool, *start_seconds, out_dir, prefix)
                    .await?
            }
            PipelineRequest::HeadReplace {
                anchor,
                pool,
                target_seconds,
                out_dir,
                prefix,
            } => {
                self.run_head_replace(anchor, pool, *target_seconds, out_dir, prefix)
                    .await?
            }
        };

        Ok(BatchReport {
            kind,
            out_dir,
            started_at,
            finished_at: Local::now(),
            outcomes,
        })
    }

    fn output_path(&self, out_dir: &Path, prefix: &str, number: usize) -> PathBuf {
        out_dir.join(format!("{}_{}.{}", prefix, number, self.container_ext))
    }
}
