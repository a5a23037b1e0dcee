//! Triangle/voxel overlap using the separating axis theorem
//!
//! Each triangle is first reduced to the block of grid cells covered by its
//! own bounding box; every candidate cell in that block is then tested
//! against up to 13 potential separating axes. A cell is occupied when no
//! axis separates it from at least one triangle.

use crate::grid::GridParameters;
use animvox_core::{Point3f, Triangle, Vector3f};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Squared length under which a candidate axis carries no separating information
const DEGENERATE_AXIS_EPSILON: f32 = 1e-12;

/// Candidate separating axes of one triangle, held in a fixed buffer
#[derive(Debug, Clone, Copy)]
pub struct SeparatingAxes {
    axes: [Vector3f; 13],
    len: usize,
}

impl SeparatingAxes {
    /// Build the world axes, the nine world-axis x edge cross products and the
    /// unit face normal, dropping any that are (nearly) zero length
    pub fn for_triangle(triangle: &Triangle) -> Self {
        let mut axes = Self {
            axes: [Vector3f::zeros(); 13],
            len: 0,
        };

        let world = [Vector3f::x(), Vector3f::y(), Vector3f::z()];
        let edges = triangle.edges();

        for axis in world {
            axes.push(axis);
        }
        for axis in &world {
            for edge in &edges {
                axes.push(axis.cross(edge));
            }
        }
        if let Some(normal) = triangle.face_normal().try_normalize(0.0) {
            axes.push(normal);
        }

        axes
    }

    fn push(&mut self, axis: Vector3f) {
        if axis.norm_squared() > DEGENERATE_AXIS_EPSILON {
            self.axes[self.len] = axis;
            self.len += 1;
        }
    }

    pub fn as_slice(&self) -> &[Vector3f] {
        &self.axes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Axis-aligned cube of a single voxel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelBox {
    pub center: Point3f,
    pub half_size: f32,
}

impl VoxelBox {
    pub fn new(center: Point3f, size: f32) -> Self {
        Self {
            center,
            half_size: size * 0.5,
        }
    }

    pub fn corners(&self) -> [Point3f; 8] {
        let h = self.half_size;
        [
            Vector3f::new(-h, -h, -h),
            Vector3f::new(h, -h, -h),
            Vector3f::new(-h, -h, h),
            Vector3f::new(h, -h, h),
            Vector3f::new(-h, h, -h),
            Vector3f::new(h, h, -h),
            Vector3f::new(-h, h, h),
            Vector3f::new(h, h, h),
        ]
        .map(|corner| self.center + corner)
    }
}

fn project(points: &[Point3f], axis: &Vector3f) -> (f32, f32) {
    points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), point| {
        let d = axis.dot(&point.coords);
        (min.min(d), max.max(d))
    })
}

/// Whether `triangle` and `voxel` overlap.
///
/// Touching intervals count as overlap. Only the candidates chosen by
/// [`GridParameters::cell_range`] are tested, so a triangle lying exactly on
/// an inner cell face occupies a single layer: the cells above the face.
pub fn triangle_box_overlap(triangle: &Triangle, axes: &SeparatingAxes, voxel: &VoxelBox) -> bool {
    let corners = voxel.corners();

    axes.as_slice().iter().all(|axis| {
        let (t_min, t_max) = project(&triangle.vertices, axis);
        let (v_min, v_max) = project(&corners, axis);
        !(v_min > t_max || t_min > v_max)
    })
}

/// Occupancy flags for a whole grid, safe to mark from several threads
#[derive(Debug, Default)]
pub struct OccupancyGrid {
    cells: Vec<AtomicBool>,
}

impl OccupancyGrid {
    pub fn new(len: usize) -> Self {
        Self {
            cells: (0..len).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    /// Set a cell, returning `true` if it was not set before
    pub fn mark(&self, index: usize) -> bool {
        !self.cells[index].swap(true, Ordering::Relaxed)
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.cells[index].load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.load(Ordering::Relaxed)).count()
    }

    pub fn into_flags(self) -> Vec<bool> {
        self.cells.into_iter().map(AtomicBool::into_inner).collect()
    }
}

/// Marks the grid cells overlapped by triangles
#[derive(Debug, Clone, Copy)]
pub struct VoxelIntersector<'a> {
    grid: &'a GridParameters,
}

impl<'a> VoxelIntersector<'a> {
    pub fn new(grid: &'a GridParameters) -> Self {
        Self { grid }
    }

    /// Mark every cell overlapped by `triangle`, returning how many cells were
    /// newly marked. Cells already marked are not retested.
    pub fn mark_triangle(&self, triangle: &Triangle, occupancy: &OccupancyGrid) -> usize {
        let (min, max) = triangle.bounds();
        let Some([range_x, range_y, range_z]) = self.grid.cell_range(&min, &max) else {
            return 0;
        };

        let axes = SeparatingAxes::for_triangle(triangle);
        let mut marked = 0;

        for ix in range_x {
            for iy in range_y.clone() {
                for iz in range_z.clone() {
                    let index = self.grid.flat_index(ix, iy, iz);
                    if occupancy.is_marked(index) {
                        continue;
                    }

                    let voxel = VoxelBox::new(self.grid.voxel_center(ix, iy, iz), self.grid.scale);
                    if triangle_box_overlap(triangle, &axes, &voxel) && occupancy.mark(index) {
                        marked += 1;
                    }
                }
            }
        }

        marked
    }

    /// Mark all triangles into a fresh occupancy grid
    pub fn mark_all(&self, triangles: &[Triangle], parallel: bool) -> OccupancyGrid {
        let occupancy = OccupancyGrid::new(self.grid.voxel_count());
        self.mark_into(triangles, &occupancy, parallel);
        occupancy
    }

    /// Mark all triangles into an existing occupancy grid
    pub fn mark_into(&self, triangles: &[Triangle], occupancy: &OccupancyGrid, parallel: bool) {
        if occupancy.is_empty() {
            return;
        }

        if parallel {
            triangles.par_iter().for_each(|triangle| {
                self.mark_triangle(triangle, occupancy);
            });
        } else {
            for triangle in triangles {
                self.mark_triangle(triangle, occupancy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::bounding_box;
    use animvox_core::Vector3f;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tri(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Triangle {
        Triangle::new(Point3f::from(a), Point3f::from(b), Point3f::from(c))
    }

    fn occupied_cells(grid: &GridParameters, flags: &[bool]) -> Vec<[usize; 3]> {
        flags
            .iter()
            .enumerate()
            .filter(|(_, &occupied)| occupied)
            .map(|(index, _)| grid.cell_of(index))
            .collect()
    }

    fn random_triangles(rng: &mut StdRng, count: usize) -> Vec<Triangle> {
        let mut point = || {
            Point3f::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
            )
        };
        (0..count).map(|_| Triangle::new(point(), point(), point())).collect()
    }

    fn grid_for(triangles: &[Triangle], scale: f32) -> GridParameters {
        let points: Vec<Point3f> = triangles.iter().flat_map(|t| t.vertices).collect();
        GridParameters::from_bounds(scale, &bounding_box(&points).unwrap()).unwrap()
    }

    #[test]
    fn test_axes_for_regular_triangle() {
        let axes = SeparatingAxes::for_triangle(&tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]));

        // X x edge0 and Y x edge2 vanish because those edges are parallel to the axis
        assert_eq!(axes.len(), 11);
        assert_eq!(*axes.as_slice().last().unwrap(), Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_axes_for_point_triangle() {
        let axes = SeparatingAxes::for_triangle(&tri([1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]));
        assert_eq!(axes.len(), 3);
    }

    #[test]
    fn test_overlap_basic_cases() {
        let voxel = VoxelBox::new(Point3f::new(0.5, 0.5, 0.5), 1.0);

        let inside = tri([0.2, 0.2, 0.5], [0.8, 0.2, 0.5], [0.2, 0.8, 0.5]);
        let far = tri([5.0, 5.0, 5.0], [6.0, 5.0, 5.0], [5.0, 6.0, 5.0]);
        // Bounding boxes overlap but the triangle passes beyond the corner (1, 1, 1)
        let corner_miss = tri([1.6, 0.9, 0.9], [0.9, 1.6, 0.9], [0.9, 0.9, 1.6]);
        let point = tri([0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, 0.5]);

        for (triangle, expected) in [(inside, true), (far, false), (corner_miss, false), (point, true)] {
            let axes = SeparatingAxes::for_triangle(&triangle);
            assert_eq!(triangle_box_overlap(&triangle, &axes, &voxel), expected, "{:?}", triangle);
        }
    }

    #[test]
    fn test_single_triangle_on_unit_grid() {
        // Cells span [i - 1, i) on every axis
        let grid = GridParameters::new(1.0, Vector3f::new(2.0, 2.0, 2.0), Point3f::origin()).unwrap();
        let triangle = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

        let occupancy = VoxelIntersector::new(&grid).mark_all(&[triangle], false);
        let flags = occupancy.into_flags();

        assert_eq!(occupied_cells(&grid, &flags), vec![[1, 1, 1]]);
        assert_eq!(grid.flat_index(1, 1, 1), 7);
        assert_eq!(grid.voxel_center(1, 1, 1), Point3f::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_diagonal_triangle_skips_cells_past_hypotenuse() {
        // 4x4x4 grid, cell i spans [i - 2, i - 1)
        let grid = GridParameters::new(1.0, Vector3f::repeat(4.0), Point3f::origin()).unwrap();
        let triangle = tri([-2.0, -2.0, 0.5], [2.0, -2.0, 0.5], [-2.0, 2.0, 0.5]);

        let flags = VoxelIntersector::new(&grid).mark_all(&[triangle], false).into_flags();
        let cells = occupied_cells(&grid, &flags);

        let mut expected = Vec::new();
        for ix in 0..4 {
            for iy in 0..4 {
                if ix + iy <= 4 {
                    expected.push([ix, iy, 2]);
                }
            }
        }

        assert_eq!(cells, expected);
        assert_eq!(cells.len(), 13);
    }

    #[test]
    fn test_marking_is_idempotent_and_order_independent() {
        let mut rng = StdRng::seed_from_u64(42);
        let triangles = random_triangles(&mut rng, 25);
        let grid = grid_for(&triangles, 0.5);
        let intersector = VoxelIntersector::new(&grid);

        let first = intersector.mark_all(&triangles, false);
        let newly_marked: usize = triangles.iter().map(|t| intersector.mark_triangle(t, &first)).sum();
        assert_eq!(newly_marked, 0);

        let mut reversed = triangles.clone();
        reversed.reverse();
        let second = intersector.mark_all(&reversed, false);
        let parallel = intersector.mark_all(&triangles, true);

        let first = first.into_flags();
        assert!(first.iter().any(|&occupied| occupied));
        assert_eq!(first, second.into_flags());
        assert_eq!(first, parallel.into_flags());
    }

    #[test]
    fn test_cells_containing_vertices_are_occupied() {
        let mut rng = StdRng::seed_from_u64(3);
        let triangles = random_triangles(&mut rng, 40);
        let grid = grid_for(&triangles, 0.25);
        let flags = VoxelIntersector::new(&grid).mark_all(&triangles, true).into_flags();

        let mut checked = 0;
        for vertex in triangles.iter().flat_map(|t| t.vertices) {
            let local = grid.to_grid(&vertex);
            let strictly_inside = (0..3).all(|axis| {
                let fraction = local[axis].fract();
                local[axis] >= 0.0
                    && (local[axis] as usize) < grid.counts[axis]
                    && fraction > 0.01
                    && fraction < 0.99
            });
            if !strictly_inside {
                continue;
            }

            let index = grid.flat_index(local.x as usize, local.y as usize, local.z as usize);
            assert!(flags[index], "vertex {:?} not covered", vertex);
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_occupied_cells_overlap_some_triangle_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let triangles = random_triangles(&mut rng, 10);
        let grid = grid_for(&triangles, 0.5);
        let flags = VoxelIntersector::new(&grid).mark_all(&triangles, false).into_flags();

        let half = grid.scale * 0.5 + 1e-4;
        for [ix, iy, iz] in occupied_cells(&grid, &flags) {
            let center = grid.voxel_center(ix, iy, iz);
            let overlaps_any = triangles.iter().any(|triangle| {
                let (min, max) = triangle.bounds();
                (0..3).all(|axis| center[axis] + half >= min[axis] && center[axis] - half <= max[axis])
            });
            assert!(overlaps_any, "cell ({}, {}, {}) occupied without any triangle nearby", ix, iy, iz);
        }
    }

    #[test]
    fn test_empty_grid_marks_nothing() {
        let grid = GridParameters::new(5.0, Vector3f::new(4.0, 4.0, 4.0), Point3f::origin()).unwrap();
        let triangle = tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

        let occupancy = VoxelIntersector::new(&grid).mark_all(&[triangle], true);
        assert!(occupancy.is_empty());
        assert_eq!(occupancy.count(), 0);
    }
}
