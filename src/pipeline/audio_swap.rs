//! Audio-swap pipeline: one muted video, many audio tracks

use std::path::Path;

use tracing::{info, warn};

use super::{FileOutcome, PipelineExecutor, PipelineRun, RunPhase};
use crate::error::SwapResult;
use crate::media::CandidatePool;
use crate::stage::StageSpec;

impl PipelineExecutor {
    /// Build the muted, scaled anchor once, then mux it against every
    /// audio clip in the pool. The shared artifact is deleted after
    /// the loop.
    pub(super) async fn run_audio_swap(
        &self,
        anchor: &Path,
        pool: &CandidatePool,
        out_dir: &Path,
        prefix: &str,
    ) -> SwapResult<Vec<FileOutcome>> {
        let mut shared = PipelineRun::create(out_dir)?;
        let muted = shared.artifact(&format!("muted_anchor.{}", self.container_ext));

        info!("extracting muted video from {}", anchor.display());
        // Without the shared artifact no output can be produced, so a
        // failure here is fatal to the whole batch
        self.runner
            .run(&StageSpec::mute_trim_scale(anchor, &muted).with_scale(self.scale))
            .await?;
        shared.advance(RunPhase::SegmentsBuilt);

        let mut outcomes = Vec::with_capacity(pool.len());
        for (i, clip) in pool.iter().enumerate() {
            let number = i + 1;
            let output = self.output_path(out_dir, prefix, number);
            info!("processing {}/{}: {}", number, pool.len(), clip.file_name());

            match self
                .runner
                .run(&StageSpec::mux(&muted, &clip.path, &output))
                .await
            {
                Ok(_) => match self.probe.duration(&output).await {
                    Ok(seconds) => {
                        info!("created {} ({:.2}s)", output.display(), seconds);
                        outcomes.push(FileOutcome::success(
                            number,
                            clip.path.clone(),
                            output,
                            seconds,
                            false,
                        ));
                    }
                    Err(e) => {
                        warn!("{}", e);
                        outcomes.push(FileOutcome::failure(
                            number,
                            clip.path.clone(),
                            RunPhase::Muxed,
                            &e,
                        ));
                    }
                },
                Err(e) => {
                    warn!("{}", e);
                    outcomes.push(FileOutcome::failure(
                        number,
                        clip.path.clone(),
                        RunPhase::Started,
                        &e,
                    ));
                }
            }
        }

        shared.finish();
        Ok(outcomes)
    }
}
