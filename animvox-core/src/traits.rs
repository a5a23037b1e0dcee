//! Core traits for animvox

use crate::{error::Result, point::*, snapshot::MeshSnapshot};

/// Source of per-frame mesh snapshots.
///
/// This is the boundary to the host application: it evaluates the animated
/// object at a frame and hands back plain world-space data. Failing with
/// [`crate::Error::SnapshotUnavailable`] skips the frame without aborting the batch.
pub trait SnapshotProvider {
    fn snapshot(&self, frame: i32) -> Result<MeshSnapshot>;
}

impl<F> SnapshotProvider for F
where
    F: Fn(i32) -> Result<MeshSnapshot>,
{
    fn snapshot(&self, frame: i32) -> Result<MeshSnapshot> {
        self(frame)
    }
}

/// Trait for nearest vertex lookup
pub trait NearestNeighborSearch {
    /// Index of the vertex closest to `query`; ties go to the lowest index.
    /// Returns `None` when there are no vertices.
    fn find_nearest(&self, query: &Point3f) -> Option<usize>;
}
