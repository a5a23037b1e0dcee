//! Mesh data structures: triangles, indexed triangle meshes and polygon meshes

use crate::error::{Error, Result};
use crate::point::*;
use crate::snapshot::MeshSnapshot;
use crate::transform::Transform3D;
use serde::{Deserialize, Serialize};

/// A world-space triangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Point3f; 3],
}

impl Triangle {
    pub fn new(v0: Point3f, v1: Point3f, v2: Point3f) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Edge vectors `v1 - v0`, `v2 - v1` and `v0 - v2`
    pub fn edges(&self) -> [Vector3f; 3] {
        let [v0, v1, v2] = self.vertices;
        [v1 - v0, v2 - v1, v0 - v2]
    }

    /// Unnormalized face normal (`edge0 x edge1`)
    pub fn face_normal(&self) -> Vector3f {
        let [e0, e1, _] = self.edges();
        e0.cross(&e1)
    }

    /// Component-wise minimum and maximum of the three vertices
    pub fn bounds(&self) -> (Point3f, Point3f) {
        let [v0, v1, v2] = self.vertices;
        let min = Point3f::new(
            v0.x.min(v1.x).min(v2.x),
            v0.y.min(v1.y).min(v2.y),
            v0.z.min(v1.z).min(v2.z),
        );
        let max = Point3f::new(
            v0.x.max(v1.x).max(v2.x),
            v0.y.max(v1.y).max(v2.y),
            v0.z.max(v1.z).max(v2.z),
        );
        (min, max)
    }
}

/// An indexed triangle mesh with optional per-vertex texture coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub texcoords: Option<Vec<TexCoord>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            texcoords: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            texcoords: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a textured vertex, returning its index
    pub fn add_vertex(&mut self, vertex: Point3f, texcoord: TexCoord) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        self.texcoords
            .get_or_insert_with(|| vec![TexCoord::zero(); index])
            .push(texcoord);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// An object-space polygon mesh as a host stores it.
///
/// `uv_layer`, when present, holds one texture coordinate per polygon corner
/// ("loop"), laid out exactly like `polygons`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolygonMesh {
    pub positions: Vec<Point3f>,
    pub polygons: Vec<Vec<usize>>,
    pub uv_layer: Option<Vec<Vec<TexCoord>>>,
}

impl PolygonMesh {
    pub fn new(positions: Vec<Point3f>, polygons: Vec<Vec<usize>>) -> Self {
        Self {
            positions,
            polygons,
            uv_layer: None,
        }
    }

    pub fn with_uv_layer(mut self, uv_layer: Vec<Vec<TexCoord>>) -> Self {
        self.uv_layer = Some(uv_layer);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Check that every polygon has at least three in-range corners and that the
    /// UV layer matches the polygon layout
    pub fn validate(&self) -> Result<()> {
        for (face_index, polygon) in self.polygons.iter().enumerate() {
            if polygon.len() < 3 {
                return Err(Error::InvalidData(format!(
                    "Polygon {} has {} corners, at least 3 required",
                    face_index,
                    polygon.len()
                )));
            }
            if let Some(&index) = polygon.iter().find(|&&index| index >= self.positions.len()) {
                return Err(Error::InvalidData(format!(
                    "Polygon {} references vertex {} but the mesh has {} vertices",
                    face_index,
                    index,
                    self.positions.len()
                )));
            }
        }

        if let Some(uv_layer) = &self.uv_layer {
            if uv_layer.len() != self.polygons.len() {
                return Err(Error::InvalidData(format!(
                    "UV layer has {} polygons, mesh has {}",
                    uv_layer.len(),
                    self.polygons.len()
                )));
            }
            for (face_index, (uvs, polygon)) in uv_layer.iter().zip(&self.polygons).enumerate() {
                if uvs.len() != polygon.len() {
                    return Err(Error::InvalidData(format!(
                        "UV layer polygon {} has {} corners, mesh polygon has {}",
                        face_index,
                        uvs.len(),
                        polygon.len()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Resolve one texture coordinate per vertex.
    ///
    /// Polygons are walked in index order and corners in loop order; the first
    /// UV seen for a vertex wins. Vertices never referenced with a UV, and every
    /// vertex of a mesh without a UV layer, get (0, 0).
    pub fn vertex_texcoords(&self) -> Vec<TexCoord> {
        let Some(uv_layer) = &self.uv_layer else {
            return vec![TexCoord::zero(); self.positions.len()];
        };

        let mut resolved: Vec<Option<TexCoord>> = vec![None; self.positions.len()];
        for (polygon, uvs) in self.polygons.iter().zip(uv_layer) {
            for (&vertex, &uv) in polygon.iter().zip(uvs) {
                if let Some(slot) = resolved.get_mut(vertex) {
                    slot.get_or_insert(uv);
                }
            }
        }

        resolved
            .into_iter()
            .map(|uv| uv.unwrap_or_default())
            .collect()
    }

    /// Fan-triangulate every polygon: `(p0, p[i], p[i + 1])`
    pub fn triangulate(&self) -> Vec<[usize; 3]> {
        self.polygons
            .iter()
            .filter(|polygon| polygon.len() >= 3)
            .flat_map(|polygon| {
                (1..polygon.len() - 1).map(move |i| [polygon[0], polygon[i], polygon[i + 1]])
            })
            .collect()
    }

    /// Evaluate the mesh under a world transform into an immutable snapshot
    pub fn to_snapshot(&self, world: &Transform3D) -> Result<MeshSnapshot> {
        self.validate()?;

        let world_positions: Vec<Point3f> = self
            .positions
            .iter()
            .map(|position| world.transform_point(position))
            .collect();

        let vertices = world_positions
            .iter()
            .zip(self.vertex_texcoords())
            .map(|(&position, texcoord)| TexturedVertex::new(position, texcoord))
            .collect();

        let triangles = self
            .triangulate()
            .into_iter()
            .map(|[a, b, c]| Triangle::new(world_positions[a], world_positions[b], world_positions[c]))
            .collect();

        Ok(MeshSnapshot::new(triangles, vertices))
    }
}
