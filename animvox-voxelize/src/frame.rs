//! Single-frame voxelization

use crate::bounds::bounding_box;
use crate::grid::GridParameters;
use crate::intersect::VoxelIntersector;
use crate::sampler::{AttributeSampler, SamplerKind};
use animvox_core::{MeshSnapshot, Point3f, Result, TexCoord};
use serde::{Deserialize, Serialize};

/// One grid cell with its sampled attributes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Voxel {
    /// World-space center of the cell
    pub position: Point3f,
    pub occupied: bool,
    /// Texture coordinate of the nearest snapshot vertex; (0, 0) for empty cells
    pub texcoord: TexCoord,
}

impl Voxel {
    /// An unoccupied voxel at `position`
    pub fn new(position: Point3f) -> Self {
        Self {
            position,
            occupied: false,
            texcoord: TexCoord::zero(),
        }
    }
}

/// Voxelization of one animation frame.
///
/// `voxels` always holds `nx * ny * nz` entries in flat grid order, occupied
/// or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    pub frame_index: i32,
    pub grid: GridParameters,
    pub voxels: Vec<Voxel>,
}

impl FrameResult {
    pub fn occupied(&self) -> impl Iterator<Item = &Voxel> + '_ {
        self.voxels.iter().filter(|voxel| voxel.occupied)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }
}

/// Turns a single mesh snapshot into a [`FrameResult`]
#[derive(Debug, Clone, Copy)]
pub struct FrameVoxelizer {
    scale: f32,
    sampler: SamplerKind,
    parallel: bool,
}

impl FrameVoxelizer {
    /// Create a voxelizer for the given cell size.
    ///
    /// The scale is checked when a frame is voxelized, so an invalid value
    /// surfaces as [`animvox_core::Error::InvalidScale`] there.
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            sampler: SamplerKind::default(),
            parallel: true,
        }
    }

    pub fn with_sampler(mut self, sampler: SamplerKind) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Voxelize one snapshot.
    ///
    /// Fails with [`animvox_core::Error::EmptyGeometry`] when the snapshot has
    /// no vertices or they all coincide, and with
    /// [`animvox_core::Error::GridTooLarge`] when the cell count overflows. A grid with zero cells on some axis is not an error and
    /// yields an empty voxel list.
    pub fn voxelize(&self, frame_index: i32, snapshot: &MeshSnapshot) -> Result<FrameResult> {
        let bounds = bounding_box(&snapshot.positions())?;
        let grid = GridParameters::from_bounds(self.scale, &bounds)?;

        let [nx, ny, nz] = grid.counts;
        log::debug!(
            "Frame {}: grid {}x{}x{} at scale {}, extent {:?}, offset {:?}",
            frame_index,
            nx,
            ny,
            nz,
            grid.scale,
            grid.extent,
            grid.offset
        );

        let occupancy = VoxelIntersector::new(&grid).mark_all(&snapshot.triangles, self.parallel);
        let flags = occupancy.into_flags();

        let mut voxels: Vec<Voxel> = grid
            .cells()
            .map(|(index, center)| Voxel {
                occupied: flags[index],
                ..Voxel::new(center)
            })
            .collect();

        let sampled = AttributeSampler::new(&snapshot.vertices, self.sampler).sample_voxels(&mut voxels, self.parallel);

        log::info!(
            "Frame {}: {} of {} voxels occupied ({} triangles)",
            frame_index,
            sampled,
            voxels.len(),
            snapshot.triangles.len()
        );

        Ok(FrameResult {
            frame_index,
            grid,
            voxels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use animvox_core::{Error, TexturedVertex, Triangle};
    use approx::assert_relative_eq;

    fn tetrahedron() -> MeshSnapshot {
        let positions = [
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(0.0, 0.0, 1.0),
        ];
        MeshSnapshot::from_indexed(&positions, &[[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_empty_snapshot_is_empty_geometry() {
        let result = FrameVoxelizer::new(1.0).voxelize(1, &MeshSnapshot::default());
        assert!(matches!(result, Err(Error::EmptyGeometry)));
    }

    #[test]
    fn test_collapsed_snapshot_is_empty_geometry() {
        let p = Point3f::new(1.0, 2.0, 3.0);
        let snapshot = MeshSnapshot::from_indexed(&[p, p, p], &[[0, 1, 2]]).unwrap();

        let result = FrameVoxelizer::new(0.1).voxelize(1, &snapshot);
        assert!(matches!(result, Err(Error::EmptyGeometry)));
    }

    #[test]
    fn test_invalid_scale() {
        let result = FrameVoxelizer::new(0.0).voxelize(1, &tetrahedron());
        assert!(matches!(result, Err(Error::InvalidScale(_))));
    }

    #[test]
    fn test_unit_tetrahedron() {
        let result = FrameVoxelizer::new(1.0).voxelize(3, &tetrahedron()).unwrap();

        assert_eq!(result.frame_index, 3);
        assert_eq!(result.grid.counts, [1, 1, 1]);
        assert_eq!(result.len(), 1);
        assert!(result.voxels[0].occupied);
        assert_relative_eq!(result.voxels[0].position, Point3f::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_scale_larger_than_extent_yields_empty_grid() {
        let result = FrameVoxelizer::new(10.0).voxelize(1, &tetrahedron()).unwrap();

        assert!(result.is_empty());
        assert_eq!(result.occupied_count(), 0);
    }

    #[test]
    fn test_triangles_outside_vertex_bounds_are_clipped() {
        // Triangles and vertices are independent lists; the grid follows the vertices
        let vertices = vec![
            TexturedVertex::new(Point3f::new(0.0, 0.0, 0.0), TexCoord::new(0.5, 0.5)),
            TexturedVertex::new(Point3f::new(2.0, 2.0, 2.0), TexCoord::new(1.0, 1.0)),
        ];
        let triangles = vec![Triangle::new(
            Point3f::new(10.0, 10.0, 10.0),
            Point3f::new(11.0, 10.0, 10.0),
            Point3f::new(10.0, 11.0, 10.0),
        )];

        let result = FrameVoxelizer::new(1.0).voxelize(1, &MeshSnapshot::new(triangles, vertices)).unwrap();

        assert_eq!(result.len(), 8);
        assert_eq!(result.occupied_count(), 0);
        assert!(result.voxels.iter().all(|voxel| voxel.texcoord == TexCoord::zero()));
    }

    #[test]
    fn test_texcoords_follow_nearest_vertex() {
        let positions = [
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(0.0, 2.0, 0.0),
            Point3f::new(0.0, 0.0, 2.0),
        ];
        let uvs = [
            TexCoord::new(0.0, 0.0),
            TexCoord::new(1.0, 0.0),
            TexCoord::new(0.0, 1.0),
            TexCoord::new(1.0, 1.0),
        ];
        let mut snapshot = MeshSnapshot::from_indexed(&positions, &[[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]]).unwrap();
        for (vertex, uv) in snapshot.vertices.iter_mut().zip(uvs) {
            vertex.texcoord = uv;
        }

        for sampler in [SamplerKind::BruteForce, SamplerKind::RTree] {
            let result = FrameVoxelizer::new(1.0)
                .with_sampler(sampler)
                .with_parallel(false)
                .voxelize(1, &snapshot)
                .unwrap();

            assert_eq!(result.grid.counts, [2, 2, 2]);
            for voxel in &result.voxels {
                if !voxel.occupied {
                    assert_eq!(voxel.texcoord, TexCoord::zero());
                    continue;
                }
                let nearest = positions
                    .iter()
                    .enumerate()
                    .min_by(|a, b| (a.1 - voxel.position).norm().total_cmp(&(b.1 - voxel.position).norm()))
                    .map(|(idx, _)| idx)
                    .unwrap();
                assert_eq!(voxel.texcoord, uvs[nearest]);
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let snapshot = tetrahedron();
        let sequential = FrameVoxelizer::new(0.25).with_parallel(false).voxelize(1, &snapshot).unwrap();
        let parallel = FrameVoxelizer::new(0.25).with_parallel(true).voxelize(1, &snapshot).unwrap();

        assert_eq!(sequential, parallel);
        assert!(sequential.occupied_count() > 0);
    }
}
