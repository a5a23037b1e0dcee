//! Joined cube meshes built from voxelized frames

use animvox_core::{Point3f, TriangleMesh, Vector3f};
use animvox_voxelize::FrameResult;
use serde::{Deserialize, Serialize};

/// Corner offsets of a unit cube; bit 0 is x, bit 1 is y, bit 2 is z
const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [-0.5, 0.5, 0.5],
    [0.5, 0.5, 0.5],
];

/// Outward-wound triangles over [`CUBE_CORNERS`], two per face
const CUBE_FACES: [[usize; 3]; 12] = [
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
];

/// One frame's occupied voxels as a single mesh of cubes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxelMesh {
    /// `voxelFrame_<frame>`
    pub name: String,
    pub frame_index: i32,
    pub mesh: TriangleMesh,
    /// Opaque material reference, passed through untouched
    pub material: Option<String>,
}

impl VoxelMesh {
    /// Name given to the mesh of `frame`
    pub fn name_for(frame: i32) -> String {
        format!("voxelFrame_{}", frame)
    }

    /// Build one cube of side `grid.scale` per occupied voxel.
    ///
    /// All eight corners of a cube carry the voxel's texture coordinate.
    /// Returns `None` when the frame has no occupied voxels.
    pub fn from_frame(result: &FrameResult, material: Option<&str>) -> Option<Self> {
        let occupied = result.occupied_count();
        if occupied == 0 {
            log::info!("Frame {}: no occupied voxels, no mesh built", result.frame_index);
            return None;
        }

        let scale = result.grid.scale;
        let mut mesh = TriangleMesh::new();
        mesh.vertices.reserve(occupied * CUBE_CORNERS.len());
        mesh.faces.reserve(occupied * CUBE_FACES.len());

        for voxel in result.occupied() {
            let base = mesh.vertex_count();
            for corner in CUBE_CORNERS {
                let position: Point3f = voxel.position + Vector3f::from(corner) * scale;
                mesh.add_vertex(position, voxel.texcoord);
            }
            for [a, b, c] in CUBE_FACES {
                mesh.add_face([base + a, base + b, base + c]);
            }
        }

        Some(Self {
            name: Self::name_for(result.frame_index),
            frame_index: result.frame_index,
            mesh,
            material: material.map(str::to_string),
        })
    }

    pub fn cube_count(&self) -> usize {
        self.mesh.vertex_count() / CUBE_CORNERS.len()
    }
}
