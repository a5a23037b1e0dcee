//! Voxel grid parameterization

use crate::bounds::BoundingBox;
use animvox_core::{Error, Point3f, Result, Vector3f};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Regular voxel grid laid over a rounded bounding box.
///
/// A world coordinate maps into grid-local space as `world + offset`. Cell `i`
/// along an axis spans the half-open world interval
/// `[i * scale - offset, (i + 1) * scale - offset)`. Cells are stored flat in
/// x-major order: `ix * ny * nz + iy * nz + iz`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParameters {
    pub scale: f32,
    pub counts: [usize; 3],
    pub extent: Vector3f,
    pub offset: Vector3f,
}

/// Inclusive per-axis cell index ranges
pub type CellRange = [RangeInclusive<usize>; 3];

/// Check that a voxel scale is usable
pub fn validate_scale(scale: f32) -> Result<f32> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(Error::InvalidScale(scale))
    }
}

impl GridParameters {
    /// Derive grid parameters from a scale and a rounded extent/center pair.
    ///
    /// An axis whose extent is smaller than `scale` gets zero cells; the grid
    /// is then empty, which is not an error. Fails with
    /// [`Error::GridTooLarge`] when `nx * ny * nz` does not fit in `usize`.
    pub fn new(scale: f32, extent: Vector3f, center: Point3f) -> Result<Self> {
        let scale = validate_scale(scale)?;

        let counts = [0, 1, 2].map(|axis| (extent[axis] / scale).floor().max(0.0) as usize);
        counts
            .iter()
            .try_fold(1usize, |total, &count| total.checked_mul(count))
            .ok_or(Error::GridTooLarge { counts })?;

        let offset = extent * 0.5 - center.coords;

        Ok(Self {
            scale,
            counts,
            extent,
            offset,
        })
    }

    pub fn from_bounds(scale: f32, bounds: &BoundingBox) -> Result<Self> {
        Self::new(scale, bounds.size, bounds.center)
    }

    /// Total number of cells, `nx * ny * nz`
    pub fn voxel_count(&self) -> usize {
        self.counts.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.voxel_count() == 0
    }

    /// Flat index of cell `(ix, iy, iz)`
    pub fn flat_index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        let [_, ny, nz] = self.counts;
        ix * ny * nz + iy * nz + iz
    }

    /// Inverse of [`GridParameters::flat_index`]
    pub fn cell_of(&self, index: usize) -> [usize; 3] {
        let [_, ny, nz] = self.counts;
        [index / (ny * nz), (index / nz) % ny, index % nz]
    }

    /// World-space center of cell `(ix, iy, iz)`
    pub fn voxel_center(&self, ix: usize, iy: usize, iz: usize) -> Point3f {
        let half = self.scale * 0.5;
        Point3f::new(
            ix as f32 * self.scale - self.offset.x + half,
            iy as f32 * self.scale - self.offset.y + half,
            iz as f32 * self.scale - self.offset.z + half,
        )
    }

    /// Grid-local coordinate of a world point, in cell units
    pub fn to_grid(&self, world: &Point3f) -> Vector3f {
        (world.coords + self.offset) / self.scale
    }

    /// Cells that may overlap the world-space box `[min, max]`.
    ///
    /// The lower bound is floored and the upper bound ceiled, then both are
    /// clamped to `[0, count - 1]`. A box face lying exactly on an inner cell
    /// boundary selects the cell above it; on the grid's upper boundary it
    /// selects the last cell. Returns `None` when the box lies entirely
    /// outside the grid.
    pub fn cell_range(&self, min: &Point3f, max: &Point3f) -> Option<CellRange> {
        let lo = self.to_grid(min);
        let hi = self.to_grid(max);

        let mut ranges = [0..=0, 0..=0, 0..=0];
        for axis in 0..3 {
            let count = self.counts[axis];
            if count == 0 || hi[axis] < 0.0 || lo[axis] > count as f32 {
                return None;
            }

            let last_cell = count as i64 - 1;
            let first = (lo[axis].floor() as i64).clamp(0, last_cell);
            let last = (hi[axis].ceil() as i64).clamp(0, last_cell);

            ranges[axis] = first as usize..=last as usize;
        }

        Some(ranges)
    }

    /// Iterate `(flat_index, center)` over every cell in x-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, Point3f)> + '_ {
        let [nx, ny, nz] = self.counts;
        (0..nx).flat_map(move |ix| {
            (0..ny).flat_map(move |iy| {
                (0..nz).map(move |iz| (self.flat_index(ix, iy, iz), self.voxel_center(ix, iy, iz)))
            })
        })
    }
}
