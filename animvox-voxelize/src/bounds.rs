//! World-space bounding boxes rounded to whole units

use animvox_core::{Error, Point3f, Result, Vector3f};
use serde::{Deserialize, Serialize};

/// Axis-aligned box whose size is rounded up to whole units on every axis.
///
/// `center` is `min + size / 2`, so the box always covers the raw extent of
/// the points it was computed from, with up to one unit of margin per axis
/// on the positive side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3f,
    pub max: Point3f,
    pub size: Vector3f,
    pub center: Point3f,
}

impl BoundingBox {
    /// Raw (unrounded) extent of the points
    pub fn raw_extent(&self) -> Vector3f {
        self.max - self.min
    }
}

/// Compute the rounded bounding box of a vertex set.
///
/// Fails with [`Error::EmptyGeometry`] when `points` is empty or every point
/// coincides. A box that is flat along only some axes is returned as is.
pub fn bounding_box(points: &[Point3f]) -> Result<BoundingBox> {
    let first = points.first().ok_or(Error::EmptyGeometry)?;

    let mut min = *first;
    let mut max = *first;

    for point in points {
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        min.z = min.z.min(point.z);

        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
        max.z = max.z.max(point.z);
    }

    if max == min {
        return Err(Error::EmptyGeometry);
    }

    let size = (max - min).map(f32::ceil);
    let center = min + size * 0.5;

    Ok(BoundingBox {
        min,
        max,
        size,
        center,
    })
}
