//! Snapshot provider over a numbered sequence of PLY files

use crate::error::IoError;
use crate::{read_polygon_mesh, FRAME_PLACEHOLDER};
use animvox_core::{Error, MeshSnapshot, Result, SnapshotProvider, Transform3D};
use std::path::PathBuf;

/// Reads frame `n` from the file named by substituting `n` into a pattern
/// such as `walk/frame_{frame}.ply`.
///
/// A missing or unreadable file makes that frame unavailable without
/// affecting the others.
#[derive(Debug, Clone)]
pub struct PlySequenceProvider {
    pattern: String,
    padding: usize,
    world: Transform3D,
}

impl PlySequenceProvider {
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains(FRAME_PLACEHOLDER) {
            return Err(IoError::InvalidFormat {
                format: format!("path pattern {:?} has no {} placeholder", pattern, FRAME_PLACEHOLDER),
            }
            .into());
        }

        Ok(Self {
            pattern,
            padding: 0,
            world: Transform3D::identity(),
        })
    }

    /// Zero-pad frame numbers to `width` digits, e.g. `frame_0012.ply`
    pub fn with_padding(mut self, width: usize) -> Self {
        self.padding = width;
        self
    }

    /// Object-to-world transform applied to every frame
    pub fn with_world_transform(mut self, world: Transform3D) -> Self {
        self.world = world;
        self
    }

    pub fn path_for(&self, frame: i32) -> PathBuf {
        let number = format!("{:0width$}", frame, width = self.padding);
        PathBuf::from(self.pattern.replace(FRAME_PLACEHOLDER, &number))
    }
}

impl SnapshotProvider for PlySequenceProvider {
    fn snapshot(&self, frame: i32) -> Result<MeshSnapshot> {
        let path = self.path_for(frame);
        if !path.is_file() {
            return Err(Error::snapshot_unavailable(
                frame,
                IoError::FileNotFound {
                    path: path.display().to_string(),
                }
                .to_string(),
            ));
        }

        log::debug!("Reading frame {} from {}", frame, path.display());
        read_polygon_mesh(&path)
            .and_then(|mesh| mesh.to_snapshot(&self.world))
            .map_err(|e| Error::snapshot_unavailable(frame, format!("{}: {}", path.display(), e)))
    }
}
