//! Head-replace pipeline: compose a duration-matched opening from the
//! candidate pool, keep the anchor's remainder and full audio track

use std::path::Path;

use tracing::{info, warn};

use super::{FileOutcome, PipelineExecutor, PipelineRun, RunPhase};
use crate::composer::SegmentComposer;
use crate::error::SwapResult;
use crate::media::{CandidatePool, MediaClip};
use crate::stage::{write_concat_manifest, StageSpec};

impl PipelineExecutor {
    /// Each pool entry takes a turn as the new head; the composer pads
    /// it from the rest of the pool when it is too short.
    pub(super) async fn run_head_replace(
        &self,
        anchor: &Path,
        pool: &CandidatePool,
        target_seconds: f64,
        out_dir: &Path,
        prefix: &str,
    ) -> SwapResult<Vec<FileOutcome>> {
        // The anchor's duration and audio feed every output
        let anchor_seconds = self.probe.duration(anchor).await?;
        info!(
            "anchor {} runs {:.2}s, replacing first {:.2}s per candidate",
            anchor.display(),
            anchor_seconds,
            target_seconds
        );

        let mut outcomes = Vec::with_capacity(pool.len());
        for (i, candidate) in pool.iter().enumerate() {
            let number = i + 1;
            info!(
                "processing {}/{}: {}",
                number,
                pool.len(),
                candidate.file_name()
            );

            let mut run = match PipelineRun::create(out_dir) {
                Ok(run) => run,
                Err(e) => {
                    warn!("{}", e);
                    outcomes.push(FileOutcome::failure(
                        number,
                        candidate.path.clone(),
                        RunPhase::Started,
                        &e,
                    ));
                    continue;
                }
            };

            let output = self.output_path(out_dir, prefix, number);
            let filler_pool = pool.excluding(Some(i));
            let result = self
                .head_replace_one(
                    &mut run,
                    anchor,
                    candidate,
                    &filler_pool,
                    target_seconds,
                    &output,
                )
                .await;

            let outcome = match result {
                Ok((seconds, partial_coverage)) => {
                    info!("created {} ({:.2}s)", output.display(), seconds);
                    if partial_coverage {
                        warn!(
                            "composite head for {} fell short of {:.2}s",
                            candidate.file_name(),
                            target_seconds
                        );
                    }
                    FileOutcome::success(
                        number,
                        candidate.path.clone(),
                        output,
                        seconds,
                        partial_coverage,
                    )
                }
                Err(e) => {
                    warn!("{}", e);
                    FileOutcome::failure(number, candidate.path.clone(), run.phase(), &e)
                }
            };
            outcomes.push(outcome);
            run.finish();
        }

        Ok(outcomes)
    }

    async fn head_replace_one(
        &self,
        run: &mut PipelineRun,
        anchor: &Path,
        candidate: &MediaClip,
        filler_pool: &CandidatePool,
        target_seconds: f64,
        output: &Path,
    ) -> SwapResult<(f64, bool)> {
        let audio = run.artifact("anchor_audio.aac");
        self.runner
            .run(&StageSpec::extract_audio(anchor, &audio))
            .await?;
        run.advance(RunPhase::AudioExtracted);

        let plan = SegmentComposer::new(&self.probe)
            .compose(candidate, target_seconds, filler_pool)
            .await?;
        info!(
            "composed head: {} step(s) covering {:.2}s",
            plan.steps.len(),
            plan.planned_seconds()
        );

        let mut segments = Vec::with_capacity(plan.steps.len() + 1);
        for (k, step) in plan.steps.iter().enumerate() {
            let segment = run.artifact(&format!("segment_{}.{}", k, self.container_ext));
            let mut spec = StageSpec::mute_trim_scale(&step.clip.path, &segment);
            if let Some(trim) = step.trim_seconds {
                spec = spec.with_trim(trim);
            }
            self.runner.run(&spec).await?;
            segments.push(segment);
        }

        // The anchor keeps everything past the replaced opening
        let tail = run.artifact(&format!("anchor_tail.{}", self.container_ext));
        self.runner
            .run(&StageSpec::mute_trim_scale(anchor, &tail).with_seek(target_seconds))
            .await?;
        segments.push(tail);
        run.advance(RunPhase::SegmentsBuilt);

        let manifest = run.artifact("concat.txt");
        let segment_refs: Vec<&Path> = segments.iter().map(|p| p.as_path()).collect();
        write_concat_manifest(&manifest, &segment_refs)?;
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
        Ok((seconds, plan.partial_coverage))
    }
}
