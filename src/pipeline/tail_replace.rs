//! Tail-replace pipeline: keep each video's head, splice in the
//! upsell clip for the remainder, restore the original audio

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{FileOutcome, PipelineExecutor, PipelineRun, RunPhase};
use crate::error::{SwapError, SwapResult};
use crate::media::{CandidatePool, MediaClip};
use crate::stage::{write_concat_manifest, StageSpec};

impl PipelineExecutor {
    pub(super) async fn run_tail_replace(
        &self,
        upsell: &Path,
        pool: &CandidatePool,
        start_seconds: f64,
        out_dir: &Path,
        prefix: &str,
    ) -> SwapResult<Vec<FileOutcome>> {
        // An unreadable upsell clip can produce nothing at all
        let upsell_seconds = self.probe.duration(upsell).await?;
        info!(
            "upsell clip {} runs {:.2}s, splice point {:.2}s",
            upsell.display(),
            upsell_seconds,
            start_seconds
        );

        let mut outcomes = Vec::with_capacity(pool.len());
        for (i, clip) in pool.iter().enumerate() {
            let number = i + 1;
            info!("processing {}/{}: {}", number, pool.len(), clip.file_name());

            let mut run = match PipelineRun::create(out_dir) {
                Ok(run) => run,
                Err(e) => {
                    warn!("{}", e);
                    outcomes.push(FileOutcome::failure(
                        number,
                        clip.path.clone(),
                        RunPhase::Started,
                        &e,
                    ));
                    continue;
                }
            };

            let output = self.output_path(out_dir, prefix, number);
            let result = self
                .tail_replace_one(
                    &mut run,
                    clip,
                    upsell,
                    upsell_seconds,
                    start_seconds,
                    &output,
                )
                .await;

            let outcome = match result {
                Ok(seconds) => {
                    info!("created {} ({:.2}s)", output.display(), seconds);
                    FileOutcome::success(number, clip.path.clone(), output, seconds, false)
                }
                Err(e) => {
                    warn!("{}", e);
                    FileOutcome::failure(number, clip.path.clone(), run.phase(), &e)
                }
            };
            outcomes.push(outcome);
            run.finish();
        }

        Ok(outcomes)
    }

    async fn tail_replace_one(
        &self,
        run: &mut PipelineRun,
        clip: &MediaClip,
        upsell: &Path,
        upsell_seconds: f64,
        start_seconds: f64,
        output: &Path,
    ) -> SwapResult<f64> {
        let original_seconds = self.probe.duration(&clip.path).await?;
        let deficit = original_seconds - start_seconds;
        if deficit <= 0.0 {
            return Err(SwapError::composition(format!(
                "{} runs {:.2}s, nothing left to replace after {:.2}s",
                clip.file_name(),
                original_seconds,
                start_seconds
            )));
        }
        info!(
            "keeping first {:.2}s of {:.2}s, replacing {:.2}s",
            start_seconds, original_seconds, deficit
        );

        let audio = run.artifact("original_audio.aac");
        self.runner
            .run(&StageSpec::extract_audio(&clip.path, &audio))
            .await?;
        run.advance(RunPhase::AudioExtracted);

        let head = run.artifact(&format!("head.{}", self.container_ext));
        self.runner
            .run(&StageSpec::mute_trim_scale(&clip.path, &head).with_trim(start_seconds))
            .await?;

        let filler = self
            .build_upsell_filler(run, upsell, upsell_seconds, deficit)
            .await?;
        run.advance(RunPhase::SegmentsBuilt);

        let manifest = run.artifact("concat.txt");
        write_concat_manifest(&manifest, &[&head, &filler])?;
        let combined = run.artifact(&format!("combined.{}", self.container_ext));
        self.runner
            .run(&StageSpec::concatenate(&manifest, &combined).with_scale(self.scale))
            .await?;
        run.advance(RunPhase::Concatenated);

        self.runner
            .run(&StageSpec::mux(&combined, &audio, output))
            .await?;
        run.advance(RunPhase::Muxed);

        let seconds = self.probe.duration(output).await?;
        run.advance(RunPhase::Finalized);
        Ok(seconds)
    }

    /// Produce a muted filler of exactly `deficit` seconds from the
    /// upsell clip, looping it via a repeated-reference manifest when
    /// it is too short on its own.
    async fn build_upsell_filler(
        &self,
        run: &mut PipelineRun,
        upsell: &Path,
        upsell_seconds: f64,
        deficit: f64,
    ) -> SwapResult<PathBuf> {
        let filler = run.artifact(&format!("upsell_fill.{}", self.container_ext));

        if deficit > upsell_seconds {
            let loops = (deficit / upsell_seconds) as usize + 1;
            info!("looping upsell clip {} times to fill {:.2}s", loops, deficit);

            let manifest = run.artifact("upsell_loop.txt");
            let entries: Vec<&Path> = std::iter::repeat(upsell).take(loops + 1).collect();
            write_concat_manifest(&manifest, &entries)?;

            let looped = run.artifact(&format!("upsell_loop.{}", self.container_ext));
            self.runner
                .run(&StageSpec::concatenate(&manifest, &looped))
                .await?;
            self.runner
                .run(&StageSpec::mute_trim_scale(&looped, &filler).with_trim(deficit))
                .await?;
        } else {
            self.runner
                .run(&StageSpec::mute_trim_scale(upsell, &filler).with_trim(deficit))
                .await?;
        }

        Ok(filler)
    }
}
