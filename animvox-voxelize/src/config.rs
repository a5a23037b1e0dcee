//! Batch voxelization settings

use crate::frames::FrameList;
use crate::grid::validate_scale;
use crate::parallel::ParallelConfig;
use crate::sampler::SamplerKind;
use animvox_core::Result;
use serde::{Deserialize, Serialize};

/// Default cell size in world units
pub const DEFAULT_SCALE: f32 = 0.1;

/// Default frames to voxelize
pub const DEFAULT_FRAMES: &str = "1,10,20";

/// User-facing settings for voxelizing an animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoxelizeConfig {
    /// Voxel edge length in world units
    pub scale: f32,
    /// Comma-separated frame numbers
    pub frames: String,
    /// Opaque material reference attached to every output mesh
    pub material: Option<String>,
    pub sampler: SamplerKind,
    pub parallel: ParallelConfig,
}

impl Default for VoxelizeConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            frames: DEFAULT_FRAMES.to_string(),
            material: None,
            sampler: SamplerKind::default(),
            parallel: ParallelConfig::default(),
        }
    }
}

impl VoxelizeConfig {
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_frames(mut self, frames: impl Into<String>) -> Self {
        self.frames = frames.into();
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerKind) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every check that would otherwise fail each frame the same way.
    ///
    /// A bad scale or frame list aborts the batch before any snapshot is
    /// requested.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let scale = validate_scale(self.scale)?;
        let frames = FrameList::parse(&self.frames)?;

        Ok(ValidatedConfig {
            scale,
            frames,
            material: self.material.clone(),
            sampler: self.sampler,
            parallel: self.parallel.clone(),
        })
    }
}

/// Configuration whose scale and frame list are known to be usable
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    pub scale: f32,
    pub frames: FrameList,
    pub material: Option<String>,
    pub sampler: SamplerKind,
    pub parallel: ParallelConfig,
}
