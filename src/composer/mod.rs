//! Duration-matched segment composition
//!
//! Given a target duration, an anchor clip, and an ordered candidate
//! pool, decide exactly which sub-clips (and what trims) must be
//! concatenated to reach the target. Fillers are drawn round-robin
//! starting just after the excluded pool entry; the excluded entry is
//! never used, other entries may repeat when the pool is small
//! relative to the deficit.

use tracing::{debug, warn};

use crate::error::{SwapError, SwapResult};
use crate::media::{CandidatePool, MediaClip};
use crate::probe::DurationCache;

/// Sub-second slack for floating point duration arithmetic
const EPSILON: f64 = 1e-9;

/// Role a step plays in the composed segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanRole {
    Anchor,
    Filler,
}

/// One clip reference inside a plan
#[derive(Debug, Clone)]
pub struct PlanStep {
    pub clip: MediaClip,
    /// Probed duration of the whole source clip, seconds
    pub clip_seconds: f64,
    /// Cut to this many seconds from the start; absent means use the
    /// full clip
    pub trim_seconds: Option<f64>,
    pub role: PlanRole,
}

impl PlanStep {
    /// Seconds this step contributes to the composite
    pub fn effective_seconds(&self) -> f64 {
        self.trim_seconds.unwrap_or(self.clip_seconds)
    }
}

/// An immutable, ordered composition plan
#[derive(Debug, Clone)]
pub struct SegmentPlan {
    pub steps: Vec<PlanStep>,
    /// Set when the pool was exhausted before the target was covered
    pub partial_coverage: bool,
}

impl SegmentPlan {
    /// Total seconds the plan's steps cover
    pub fn planned_seconds(&self) -> f64 {
        self.steps.iter().map(PlanStep::effective_seconds).sum()
    }
}

/// Planner for duration-matched composites
pub struct SegmentComposer<'a> {
    probe: &'a DurationCache,
}

impl<'a> SegmentComposer<'a> {
    pub fn new(probe: &'a DurationCache) -> Self {
        Self { probe }
    }

    /// Compose a plan covering `target_seconds`, starting with
    /// `anchor` and padding from `pool`.
    pub async fn compose(
        &self,
        anchor: &MediaClip,
        target_seconds: f64,
        pool: &CandidatePool,
    ) -> SwapResult<SegmentPlan> {
        let anchor_seconds = self.probe.duration(&anchor.path).await?;

        // Long enough on its own: one trimmed anchor step
        if anchor_seconds >= target_seconds {
            return Ok(SegmentPlan {
                steps: vec![PlanStep {
                    clip: anchor.clone(),
                    clip_seconds: anchor_seconds,
                    trim_seconds: Some(target_seconds),
                    role: PlanRole::Anchor,
                }],
                partial_coverage: false,
            });
        }

        let mut steps = vec![PlanStep {
            clip: anchor.clone(),
            clip_seconds: anchor_seconds,
            trim_seconds: None,
            role: PlanRole::Anchor,
        }];
        let mut remaining = target_seconds - anchor_seconds;
        debug!(
            "anchor covers {:.2}s of {:.2}s, padding {:.2}s from pool",
            anchor_seconds, target_seconds, remaining
        );

        if pool.usable_len() == 0 {
            return Err(SwapError::composition(format!(
                "need {:.2}s of filler but the candidate pool has no usable entries",
                remaining
            )));
        }

        // Round-robin base: the entry right after the excluded one
        let base = pool.excluded().map(|e| e + 1).unwrap_or(0);
        let mut fillers_consumed = 0usize;
        let mut partial_coverage = false;

        while remaining > EPSILON {
            if fillers_consumed > pool.len() {
                warn!(
                    "candidate pool exhausted, composite falls {:.2}s short of target",
                    remaining
                );
                partial_coverage = true;
                break;
            }

            let mut index = (base + fillers_consumed) % pool.len();
            if Some(index) == pool.excluded() {
                index = (index + 1) % pool.len();
            }

            let clip = pool
                .get(index)
                .expect("cyclic index stays within pool bounds");
            let clip_seconds = self.probe.duration(&clip.path).await?;
            let use_seconds = clip_seconds.min(remaining);

            steps.push(PlanStep {
                clip: clip.clone(),
                clip_seconds,
                trim_seconds: (use_seconds < clip_seconds).then_some(use_seconds),
                role: PlanRole::Filler,
            });
            remaining -= use_seconds;
            fillers_consumed += 1;
        }

        Ok(SegmentPlan {
            steps,
            partial_coverage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MediaProber;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    struct MapProber {
        durations: HashMap<PathBuf, f64>,
    }

    #[async_trait]
    impl MediaProber for MapProber {
        async fn duration_seconds(&self, path: &Path) -> SwapResult<f64> {
            self.durations
                .get(path)
                .copied()
                .ok_or_else(|| SwapError::Probe {
                    path: path.to_path_buf(),
                    detail: "unknown test clip".to_string(),
                })
        }
    }

    fn cache_of(entries: &[(&str, f64)]) -> DurationCache {
        let durations = entries
            .iter()
            .map(|(name, secs)| (PathBuf::from(name), *secs))
            .collect();
        DurationCache::new(Arc::new(MapProber { durations }))
    }

    fn pool_of(names: &[&str]) -> CandidatePool {
        CandidatePool::new(names.iter().map(|n| MediaClip::video(*n)).collect())
    }

    #[tokio::test]
    async fn long_anchor_becomes_single_trimmed_step() {
        let cache = cache_of(&[("anchor.mp4", 30.0)]);
        let composer = SegmentComposer::new(&cache);
        let plan = composer
            .compose(&MediaClip::video("anchor.mp4"), 25.0, &pool_of(&[]))
            .await
            .unwrap();

        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].role, PlanRole::Anchor);
        assert_eq!(plan.steps[0].trim_seconds, Some(25.0));
        assert_eq!(plan.planned_seconds(), 25.0);
        assert!(!plan.partial_coverage);
    }

    #[tokio::test]
    async fn fillers_cover_the_deficit_in_pool_order() {
        let cache = cache_of(&[
            ("anchor.mp4", 10.0),
            ("a.mp4", 8.0),
            ("b.mp4", 6.0),
            ("c.mp4", 5.0),
        ]);
        let composer = SegmentComposer::new(&cache);
        let plan = composer
            .compose(
                &MediaClip::video("anchor.mp4"),
                25.0,
                &pool_of(&["a.mp4", "b.mp4", "c.mp4"]),
            )
            .await
            .unwrap();

        let names: Vec<String> = plan.steps.iter().map(|s| s.clip.file_name()).collect();
        assert_eq!(names, vec!["anchor.mp4", "a.mp4", "b.mp4", "c.mp4"]);
        assert_eq!(plan.steps[0].trim_seconds, None);
        assert_eq!(plan.steps[1].trim_seconds, None);
        assert_eq!(plan.steps[2].trim_seconds, None);
        assert_eq!(plan.steps[3].trim_seconds, Some(1.0));
        assert!((plan.planned_seconds() - 25.0).abs() < 1e-6);
        assert!(!plan.partial_coverage);
    }

    #[tokio::test]
    async fn single_entry_pool_wraps_without_partial_coverage() {
        let cache = cache_of(&[("anchor.mp4", 10.0), ("a.mp4", 1.0)]);
        let composer = SegmentComposer::new(&cache);
        let plan = composer
            .compose(&MediaClip::video("anchor.mp4"), 12.0, &pool_of(&["a.mp4"]))
            .await
            .unwrap();

        assert_eq!(plan.steps.len(), 3);
        assert!(plan
            .steps
            .iter()
            .skip(1)
            .all(|s| s.clip.file_name() == "a.mp4"));
        assert!((plan.planned_seconds() - 12.0).abs() < 1e-6);
        assert!(!plan.partial_coverage);
    }

    #[tokio::test]
    async fn excluded_entry_is_never_selected() {
        for pool_size in 2..=5 {
            for excluded in 0..pool_size {
                let names: Vec<String> =
                    (0..pool_size).map(|i| format!("clip{}.mp4", i)).collect();
                let mut entries: Vec<(&str, f64)> = vec![("anchor.mp4", 1.0)];
                for name in &names {
                    entries.push((name.as_str(), 2.0));
                }
                let cache = cache_of(&entries);
                let composer = SegmentComposer::new(&cache);

                let pool =
                    pool_of(&names.iter().map(|s| s.as_str()).collect::<Vec<_>>())
                        .excluding(Some(excluded));
                let plan = composer
                    .compose(&MediaClip::video("anchor.mp4"), 9.0, &pool)
                    .await
                    .unwrap();

                let excluded_name = format!("clip{}.mp4", excluded);
                assert!(
                    plan.steps.iter().all(|s| s.clip.file_name() != excluded_name),
                    "pool size {} excluded {} was selected",
                    pool_size,
                    excluded
                );
            }
        }
    }

    #[tokio::test]
    async fn fillers_start_just_after_the_excluded_entry() {
        let cache = cache_of(&[
            ("anchor.mp4", 10.0),
            ("a.mp4", 3.0),
            ("b.mp4", 3.0),
            ("c.mp4", 3.0),
        ]);
        let composer = SegmentComposer::new(&cache);
        let pool = pool_of(&["a.mp4", "b.mp4", "c.mp4"]).excluding(Some(0));
        let plan = composer
            .compose(&MediaClip::video("anchor.mp4"), 15.0, &pool)
            .await
            .unwrap();

        let names: Vec<String> = plan
            .steps
            .iter()
            .skip(1)
            .map(|s| s.clip.file_name())
            .collect();
        assert_eq!(names, vec!["b.mp4", "c.mp4"]);
    }

    #[tokio::test]
    async fn exhausted_pool_reports_partial_coverage() {
        let cache = cache_of(&[("anchor.mp4", 1.0), ("a.mp4", 1.0), ("b.mp4", 1.0)]);
        let composer = SegmentComposer::new(&cache);
        let plan = composer
            .compose(
                &MediaClip::video("anchor.mp4"),
                60.0,
                &pool_of(&["a.mp4", "b.mp4"]),
            )
            .await
            .unwrap();

        assert!(plan.partial_coverage);
        assert!(plan.planned_seconds() < 60.0);
        // every usable entry was tried at least once before giving up
        assert!(plan.steps.len() > 2);
    }

    #[tokio::test]
    async fn empty_pool_with_deficit_is_an_error() {
        let cache = cache_of(&[("anchor.mp4", 5.0)]);
        let composer = SegmentComposer::new(&cache);
        let err = composer
            .compose(&MediaClip::video("anchor.mp4"), 10.0, &pool_of(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::Composition { .. }));
    }

    #[tokio::test]
    async fn pool_holding_only_the_excluded_entry_is_an_error() {
        let cache = cache_of(&[("anchor.mp4", 5.0), ("a.mp4", 9.0)]);
        let composer = SegmentComposer::new(&cache);
        let pool = pool_of(&["a.mp4"]).excluding(Some(0));
        let err = composer
            .compose(&MediaClip::video("anchor.mp4"), 10.0, &pool)
            .await
            .unwrap_err();
        assert!(matches!(err, SwapError::Composition { .. }));
    }

    #[tokio::test]
    async fn plans_are_deterministic_across_runs() {
        let entries = [
            ("anchor.mp4", 7.0),
            ("a.mp4", 4.0),
            ("b.mp4", 2.5),
            ("c.mp4", 6.0),
        ];
        let pool = pool_of(&["a.mp4", "b.mp4", "c.mp4"]).excluding(Some(2));

        let mut fingerprints = Vec::new();
        for _ in 0..2 {
            let cache = cache_of(&entries);
            let composer = SegmentComposer::new(&cache);
            let plan = composer
                .compose(&MediaClip::video("anchor.mp4"), 20.0, &pool)
                .await
                .unwrap();
            fingerprints.push(
                plan.steps
                    .iter()
                    .map(|s| (s.clip.file_name(), s.effective_seconds()))
                    .collect::<Vec<_>>(),
            );
        }
        assert_eq!(fingerprints[0], fingerprints[1]);
    }
}
