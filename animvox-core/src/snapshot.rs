//! Immutable per-frame mesh snapshots

use crate::error::{Error, Result};
use crate::mesh::Triangle;
use crate::point::*;
use crate::traits::SnapshotProvider;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// World-space geometry of one animation frame.
///
/// `triangles` drive occupancy, `vertices` drive texture coordinate sampling.
/// The two lists are independent: the bounding box is taken over `vertices`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub triangles: Vec<Triangle>,
    pub vertices: Vec<TexturedVertex>,
}

impl MeshSnapshot {
    pub fn new(triangles: Vec<Triangle>, vertices: Vec<TexturedVertex>) -> Self {
        Self {
            triangles,
            vertices,
        }
    }

    /// Build a snapshot from an indexed triangle list with no UV layer
    pub fn from_indexed(positions: &[Point3f], faces: &[[usize; 3]]) -> Result<Self> {
        let triangles = faces
            .iter()
            .map(|&[a, b, c]| -> Result<Triangle> {
                let fetch = |index: usize| {
                    positions.get(index).copied().ok_or_else(|| {
                        Error::InvalidData(format!(
                            "Face references vertex {} but only {} positions exist",
                            index,
                            positions.len()
                        ))
                    })
                };
                Ok(Triangle::new(fetch(a)?, fetch(b)?, fetch(c)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let vertices = positions
            .iter()
            .map(|&position| TexturedVertex::untextured(position))
            .collect();

        Ok(Self::new(triangles, vertices))
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// World positions of every vertex, in input order
    pub fn positions(&self) -> Vec<Point3f> {
        self.vertices.iter().map(|vertex| vertex.position).collect()
    }
}

/// In-memory snapshot provider keyed by frame identifier
#[derive(Debug, Clone, Default)]
pub struct FrameSnapshots {
    frames: BTreeMap<i32, MeshSnapshot>,
}

impl FrameSnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, frame: i32, snapshot: MeshSnapshot) -> Option<MeshSnapshot> {
        self.frames.insert(frame, snapshot)
    }

    pub fn with_frame(mut self, frame: i32, snapshot: MeshSnapshot) -> Self {
        self.frames.insert(frame, snapshot);
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> impl Iterator<Item = i32> + '_ {
        self.frames.keys().copied()
    }
}

impl SnapshotProvider for FrameSnapshots {
    fn snapshot(&self, frame: i32) -> Result<MeshSnapshot> {
        self.frames
            .get(&frame)
            .cloned()
            .ok_or_else(|| Error::snapshot_unavailable(frame, "no snapshot recorded for this frame"))
    }
}

impl FromIterator<(i32, MeshSnapshot)> for FrameSnapshots {
    fn from_iter<I: IntoIterator<Item = (i32, MeshSnapshot)>>(iter: I) -> Self {
        Self {
            frames: BTreeMap::from_iter(iter),
        }
    }
}
