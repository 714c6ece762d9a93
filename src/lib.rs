//! ClipSwap batch video producer
//!
//! Produces derivative videos from a source video and a pool of
//! replacement media by driving ffmpeg/ffprobe as subprocesses. The
//! three pipelines (audio-swap, tail-replace, head-replace) share one
//! mechanism: plan which sub-clips cover a target duration, realize
//! the plan stage by stage, and clean every intermediate up whether
//! the run succeeds or fails.

pub mod cli;
pub mod composer;
pub mod config;
pub mod encoder;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod probe;
pub mod stage;
pub mod utils;

// Re-export commonly used types
pub use composer::{PlanRole, PlanStep, SegmentComposer, SegmentPlan};
pub use error::{SwapError, SwapResult};
pub use media::{CandidatePool, ClipKind, MediaClip};
pub use pipeline::{BatchReport, FileOutcome, PipelineExecutor, PipelineRequest};
