//! I/O for animvox
//!
//! Reads animated input as numbered PLY polygon meshes and writes each
//! voxelized frame back out as a PLY mesh of textured cubes.

pub mod error;
pub mod ply;
pub mod sequence;
pub mod voxel_mesh;

pub use error::*;
pub use ply::{PlyReader, PlyWriter};
pub use sequence::PlySequenceProvider;
pub use voxel_mesh::VoxelMesh;

use animvox_core::{PolygonMesh, Result};
use std::path::{Path, PathBuf};

/// Placeholder replaced by the frame number in sequence path patterns
pub const FRAME_PLACEHOLDER: &str = "{frame}";

/// Trait for reading polygon meshes from files
pub trait PolygonMeshReader {
    fn read_polygon_mesh<P: AsRef<Path>>(path: P) -> Result<PolygonMesh>;
}

/// Trait for writing voxel meshes to files
pub trait VoxelMeshWriter {
    fn write_voxel_mesh<P: AsRef<Path>>(mesh: &VoxelMesh, path: P) -> Result<()>;
}

/// Auto-detect format and read a polygon mesh
pub fn read_polygon_mesh<P: AsRef<Path>>(path: P) -> Result<PolygonMesh> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyReader::read_polygon_mesh(path),
        _ => Err(animvox_core::Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write a voxel mesh
pub fn write_voxel_mesh<P: AsRef<Path>>(mesh: &VoxelMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyWriter::write_voxel_mesh(mesh, path),
        _ => Err(animvox_core::Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}

/// Write a voxel mesh as `<dir>/<mesh name>.ply`, returning the path written
pub fn write_voxel_mesh_to_dir<P: AsRef<Path>>(mesh: &VoxelMesh, dir: P) -> Result<PathBuf> {
    let path = dir.as_ref().join(format!("{}.ply", mesh.name));
    write_voxel_mesh(mesh, &path)?;
    Ok(path)
}
