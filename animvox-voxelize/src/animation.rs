//! Voxelization of a whole frame range

use crate::config::{ValidatedConfig, VoxelizeConfig};
use crate::frame::{FrameResult, FrameVoxelizer};
use animvox_core::{Error, Result, SnapshotProvider};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What happened to one requested frame
#[derive(Debug)]
pub enum FrameOutcome {
    Voxelized(FrameResult),
    /// The frame could not be voxelized; the batch carried on without it
    Skipped { frame: i32, reason: Error },
}

impl FrameOutcome {
    pub fn frame(&self) -> i32 {
        match self {
            FrameOutcome::Voxelized(result) => result.frame_index,
            FrameOutcome::Skipped { frame, .. } => *frame,
        }
    }

    pub fn result(&self) -> Option<&FrameResult> {
        match self {
            FrameOutcome::Voxelized(result) => Some(result),
            FrameOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FrameOutcome::Skipped { .. })
    }
}

/// Per-frame outcomes of a batch, in ascending frame order
#[derive(Debug, Default)]
pub struct AnimationReport {
    pub outcomes: Vec<FrameOutcome>,
    /// Set when the batch stopped early; frames never started are absent
    pub cancelled: bool,
}

impl AnimationReport {
    pub fn voxelized(&self) -> impl Iterator<Item = &FrameResult> + '_ {
        self.outcomes.iter().filter_map(FrameOutcome::result)
    }

    pub fn skipped(&self) -> impl Iterator<Item = (i32, &Error)> + '_ {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            FrameOutcome::Skipped { frame, reason } => Some((*frame, reason)),
            FrameOutcome::Voxelized(_) => None,
        })
    }

    pub fn voxelized_count(&self) -> usize {
        self.voxelized().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().count()
    }

    pub fn into_results(self) -> Vec<FrameResult> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                FrameOutcome::Voxelized(result) => Some(result),
                FrameOutcome::Skipped { .. } => None,
            })
            .collect()
    }
}

/// Runs [`FrameVoxelizer`] over every configured frame
#[derive(Debug, Clone)]
pub struct AnimationVoxelizer {
    config: ValidatedConfig,
    cancelled: Arc<AtomicBool>,
}

impl AnimationVoxelizer {
    pub fn new(config: ValidatedConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Validate `config` and build a voxelizer from it
    pub fn from_config(config: &VoxelizeConfig) -> Result<Self> {
        Ok(Self::new(config.validate()?))
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Shared flag that stops the batch before the next frame starts
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn frame_voxelizer(&self) -> FrameVoxelizer {
        FrameVoxelizer::new(self.config.scale)
            .with_sampler(self.config.sampler)
            .with_parallel(self.config.parallel.enabled)
    }

    /// Voxelize a single frame pulled from `provider`.
    ///
    /// Any provider failure and any recoverable voxelization error become a
    /// [`FrameOutcome::Skipped`]. Other errors are returned.
    pub fn voxelize_frame<P>(&self, provider: &P, frame: i32) -> Result<FrameOutcome>
    where
        P: SnapshotProvider + ?Sized,
    {
        let snapshot = match provider.snapshot(frame) {
            Ok(snapshot) => snapshot,
            Err(e @ Error::SnapshotUnavailable { .. }) => return Ok(skip(frame, e)),
            Err(e) => return Ok(skip(frame, Error::snapshot_unavailable(frame, e.to_string()))),
        };

        match self.frame_voxelizer().voxelize(frame, &snapshot) {
            Ok(result) => Ok(FrameOutcome::Voxelized(result)),
            Err(e) if e.is_recoverable() => Ok(skip(frame, e)),
            Err(e) => Err(e),
        }
    }

    /// Voxelize every configured frame.
    ///
    /// Frames run in parallel when enabled; outcomes are always reported in
    /// ascending frame order.
    pub fn run<P>(&self, provider: &P) -> Result<AnimationReport>
    where
        P: SnapshotProvider + Sync + ?Sized,
    {
        let frames = self.config.frames.as_slice();
        log::info!(
            "Voxelizing {} frames at scale {} ({})",
            frames.len(),
            self.config.scale,
            self.config.frames
        );

        let outcomes = self.config.parallel.install(|| self.run_frames(provider, frames))??;

        let report = AnimationReport {
            cancelled: outcomes.len() < frames.len(),
            outcomes,
        };

        if report.cancelled {
            log::warn!(
                "Voxelization cancelled after {} of {} frames",
                report.outcomes.len(),
                frames.len()
            );
        }
        log::info!(
            "Voxelized {} frames, skipped {}",
            report.voxelized_count(),
            report.skipped_count()
        );

        Ok(report)
    }

    fn run_frames<P>(&self, provider: &P, frames: &[i32]) -> Result<Vec<FrameOutcome>>
    where
        P: SnapshotProvider + Sync + ?Sized,
    {
        if self.config.parallel.enabled {
            let outcomes: Vec<Option<Result<FrameOutcome>>> = frames
                .par_iter()
                .map(|&frame| {
                    if self.is_cancelled() {
                        None
                    } else {
                        Some(self.voxelize_frame(provider, frame))
                    }
                })
                .collect();

            outcomes.into_iter().flatten().collect()
        } else {
            let mut outcomes = Vec::with_capacity(frames.len());
            for &frame in frames {
                if self.is_cancelled() {
                    break;
                }
                outcomes.push(self.voxelize_frame(provider, frame)?);
            }
            Ok(outcomes)
        }
    }
}

fn skip(frame: i32, reason: Error) -> FrameOutcome {
    log::warn!("Skipping frame {}: {}", frame, reason);
    FrameOutcome::Skipped { frame, reason }
}
