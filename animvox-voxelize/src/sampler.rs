//! Nearest-vertex texture coordinate transfer

use crate::frame::Voxel;
use animvox_core::{NearestNeighborSearch, Point3f, TexCoord, TexturedVertex};
use rayon::prelude::*;
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};

/// Linear scan over every vertex.
///
/// Distances are Euclidean and compared with strict `<`, so the first vertex
/// at the minimum distance wins.
pub struct BruteForceSampler {
    points: Vec<Point3f>,
}

impl BruteForceSampler {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl NearestNeighborSearch for BruteForceSampler {
    fn find_nearest(&self, query: &Point3f) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;

        for (idx, point) in self.points.iter().enumerate() {
            let distance = (point - query).norm();
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((idx, distance)),
            }
        }

        best.map(|(idx, _)| idx)
    }
}

type IndexedVertex = GeomWithData<[f32; 3], usize>;

/// R*-tree backed lookup for large vertex sets.
///
/// Candidates are compared on squared distance; among equally distant
/// vertices the lowest index wins. Two vertices whose Euclidean distances
/// round to the same `f32` but whose squared distances differ can therefore
/// resolve differently from [`BruteForceSampler`].
pub struct RTreeSampler {
    tree: RTree<IndexedVertex>,
}

impl RTreeSampler {
    pub fn new(points: &[Point3f]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(idx, point)| IndexedVertex::new([point.x, point.y, point.z], idx))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }
}

impl NearestNeighborSearch for RTreeSampler {
    fn find_nearest(&self, query: &Point3f) -> Option<usize> {
        let mut candidates = self
            .tree
            .nearest_neighbor_iter_with_distance_2(&[query.x, query.y, query.z]);

        let (first, best_distance) = candidates.next()?;
        let mut best = first.data;

        for (entry, distance) in candidates {
            if distance > best_distance {
                break;
            }
            best = best.min(entry.data);
        }

        Some(best)
    }
}

/// Which nearest-vertex lookup to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplerKind {
    /// Linear scan, `O(vertices)` per voxel
    #[default]
    BruteForce,
    /// R*-tree index, built once per frame
    RTree,
}

/// Transfers texture coordinates from the nearest snapshot vertex to voxels
pub struct AttributeSampler<'a> {
    vertices: &'a [TexturedVertex],
    search: Box<dyn NearestNeighborSearch + Send + Sync>,
}

impl<'a> AttributeSampler<'a> {
    pub fn new(vertices: &'a [TexturedVertex], kind: SamplerKind) -> Self {
        let points: Vec<Point3f> = vertices.iter().map(|vertex| vertex.position).collect();

        let search: Box<dyn NearestNeighborSearch + Send + Sync> = match kind {
            SamplerKind::BruteForce => Box::new(BruteForceSampler::new(&points)),
            SamplerKind::RTree => Box::new(RTreeSampler::new(&points)),
        };

        Self { vertices, search }
    }

    /// Texture coordinate of the vertex nearest to `position`, or (0, 0) when
    /// there are no vertices
    pub fn sample(&self, position: &Point3f) -> TexCoord {
        self.search
            .find_nearest(position)
            .map(|idx| self.vertices[idx].texcoord)
            .unwrap_or_default()
    }

    /// Assign a texture coordinate to every occupied voxel. Unoccupied voxels
    /// are left untouched. Returns the number of voxels sampled.
    pub fn sample_voxels(&self, voxels: &mut [Voxel], parallel: bool) -> usize {
        let sample_one = |voxel: &mut Voxel| {
            if voxel.occupied {
                voxel.texcoord = self.sample(&voxel.position);
                1
            } else {
                0
            }
        };

        if parallel {
            voxels.par_iter_mut().map(sample_one).sum()
        } else {
            voxels.iter_mut().map(sample_one).sum()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn textured(points: &[([f32; 3], [f32; 2])]) -> Vec<TexturedVertex> {
        points
            .iter()
            .map(|&(p, uv)| TexturedVertex::new(Point3f::from(p), TexCoord::from(uv)))
            .collect()
    }

    #[test]
    fn test_nearest_vertex_texcoord() {
        let vertices = textured(&[([0.0, 0.0, 0.0], [0.1, 0.2]), ([10.0, 0.0, 0.0], [0.9, 0.8])]);

        for kind in [SamplerKind::BruteForce, SamplerKind::RTree] {
            let sampler = AttributeSampler::new(&vertices, kind);
            assert_eq!(sampler.sample(&Point3f::new(1.0, 0.0, 0.0)), TexCoord::new(0.1, 0.2));
            assert_eq!(sampler.sample(&Point3f::new(9.0, 1.0, 0.0)), TexCoord::new(0.9, 0.8));
        }
    }

    #[test]
    fn test_ties_go_to_first_vertex() {
        let points = [Point3f::new(-1.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0), Point3f::new(-1.0, 0.0, 0.0)];
        let query = Point3f::origin();

        assert_eq!(BruteForceSampler::new(&points).find_nearest(&query), Some(0));
        assert_eq!(RTreeSampler::new(&points).find_nearest(&query), Some(0));

        let reversed = [points[1], points[0]];
        assert_eq!(BruteForceSampler::new(&reversed).find_nearest(&query), Some(0));
        assert_eq!(RTreeSampler::new(&reversed).find_nearest(&query), Some(0));
    }

    #[test]
    fn test_no_vertices() {
        assert_eq!(BruteForceSampler::new(&[]).find_nearest(&Point3f::origin()), None);
        assert_eq!(RTreeSampler::new(&[]).find_nearest(&Point3f::origin()), None);
        assert_eq!(AttributeSampler::new(&[], SamplerKind::RTree).sample(&Point3f::origin()), TexCoord::zero());
    }

    #[test]
    fn test_samplers_agree_on_random_vertices() {
        let mut rng = StdRng::seed_from_u64(7);
        let points: Vec<Point3f> = (0..300)
            .map(|_| Point3f::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)))
            .collect();

        let brute = BruteForceSampler::new(&points);
        let tree = RTreeSampler::new(&points);

        for _ in 0..200 {
            let query = Point3f::new(rng.gen_range(-6.0..6.0), rng.gen_range(-6.0..6.0), rng.gen_range(-6.0..6.0));
            let a = brute.find_nearest(&query).unwrap();
            let b = tree.find_nearest(&query).unwrap();

            // Equal indices, or two vertices at the same distance
            let da = (points[a] - query).norm();
            let db = (points[b] - query).norm();
            assert!(a == b || (da - db).abs() <= f32::EPSILON * da.max(1.0), "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_only_occupied_voxels_are_sampled() {
        let vertices = textured(&[([0.0, 0.0, 0.0], [0.25, 0.75])]);
        let mut voxels = vec![
            Voxel::new(Point3f::new(0.5, 0.5, 0.5)),
            Voxel::new(Point3f::new(1.5, 0.5, 0.5)),
        ];
        voxels[0].occupied = true;

        let sampled = AttributeSampler::new(&vertices, SamplerKind::BruteForce).sample_voxels(&mut voxels, true);

        assert_eq!(sampled, 1);
        assert_eq!(voxels[0].texcoord, TexCoord::new(0.25, 0.75));
        assert_eq!(voxels[1].texcoord, TexCoord::zero());
    }
}
