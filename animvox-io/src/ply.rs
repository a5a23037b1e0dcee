//! PLY format support

use crate::error::IoError;
use crate::voxel_mesh::VoxelMesh;
use crate::{PolygonMeshReader, VoxelMeshWriter};
use animvox_core::{Point3f, PolygonMesh, Result, TexCoord};
use ply_rs::{
    parser::Parser,
    ply::{Addable, DefaultElement, ElementDef, Ply, Property, PropertyDef, PropertyType, ScalarType},
    writer::Writer,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Texture coordinate property pairs accepted on input, in lookup order
const TEXCOORD_PROPERTIES: [(&str, &str); 3] = [("s", "t"), ("u", "v"), ("texture_u", "texture_v")];

pub struct PlyReader;
pub struct PlyWriter;

impl PolygonMeshReader for PlyReader {
    fn read_polygon_mesh<P: AsRef<Path>>(path: P) -> Result<PolygonMesh> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let vertex_element = ply.payload.get("vertex").map(Vec::as_slice).unwrap_or_default();

        let mut positions = Vec::with_capacity(vertex_element.len());
        for vertex in vertex_element {
            let x = extract_property_value(vertex, "x")?;
            let y = extract_property_value(vertex, "y")?;
            let z = extract_property_value(vertex, "z")?;
            positions.push(Point3f::new(x, y, z));
        }

        let mut polygons = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for face in face_element {
                polygons.push(extract_face_indices(face)?);
            }
        }

        let mut mesh = PolygonMesh::new(positions, polygons);

        // Per-vertex UVs become a per-corner layer so first-wins resolution
        // hands every vertex back its own coordinate
        if let Some(texcoords) = extract_texcoords(vertex_element) {
            let uv_layer = mesh
                .polygons
                .iter()
                .map(|polygon| {
                    polygon
                        .iter()
                        .map(|&index| texcoords.get(index).copied().unwrap_or_default())
                        .collect()
                })
                .collect();
            mesh = mesh.with_uv_layer(uv_layer);
        }

        mesh.validate()?;
        Ok(mesh)
    }
}

impl VoxelMeshWriter for PlyWriter {
    fn write_voxel_mesh<P: AsRef<Path>>(mesh: &VoxelMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.obj_infos.push(mesh.name.clone());
        if let Some(material) = &mesh.material {
            ply.header.comments.push(format!("material {}", material));
        }

        // Define vertex element
        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = mesh.mesh.vertex_count();
        for name in ["x", "y", "z", "s", "t"] {
            vertex_element.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        }
        ply.header.elements.add(vertex_element);

        // Define face element
        let mut face_element = ElementDef::new("face".to_string());
        face_element.count = mesh.mesh.face_count();
        face_element.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        ply.header.elements.add(face_element);

        let texcoords = mesh.mesh.texcoords.as_deref().unwrap_or_default();
        let mut vertices = Vec::with_capacity(mesh.mesh.vertex_count());
        for (i, vertex) in mesh.mesh.vertices.iter().enumerate() {
            let uv = texcoords.get(i).copied().unwrap_or_default();

            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(vertex.x));
            element.insert("y".to_string(), Property::Float(vertex.y));
            element.insert("z".to_string(), Property::Float(vertex.z));
            element.insert("s".to_string(), Property::Float(uv.u));
            element.insert("t".to_string(), Property::Float(uv.v));
            vertices.push(element);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let mut faces = Vec::with_capacity(mesh.mesh.face_count());
        for face in &mesh.mesh.faces {
            let indices = face
                .iter()
                .map(|&index| {
                    i32::try_from(index).map_err(|_| IoError::WriteError {
                        message: format!("Vertex index {} does not fit a PLY int", index),
                    })
                })
                .collect::<std::result::Result<Vec<i32>, IoError>>()?;

            let mut element = DefaultElement::new();
            element.insert("vertex_indices".to_string(), Property::ListInt(indices));
            faces.push(element);
        }
        ply.payload.insert("face".to_string(), faces);

        let writer_instance = Writer::new();
        writer_instance.write_ply(&mut writer, &mut ply)?;

        log::debug!(
            "Wrote {} ({} vertices, {} faces)",
            mesh.name,
            mesh.mesh.vertex_count(),
            mesh.mesh.face_count()
        );
        Ok(())
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> std::result::Result<f32, IoError> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        _ => Err(IoError::parse(format!("Property '{}' not found or invalid type", name))),
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> std::result::Result<Vec<usize>, IoError> {
    let negative = || IoError::parse("Negative vertex index in face");

    match element.get("vertex_indices").or_else(|| element.get("vertex_index")) {
        Some(Property::ListInt(indices)) => indices
            .iter()
            .map(|&idx| usize::try_from(idx).map_err(|_| negative()))
            .collect(),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUShort(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        _ => Err(IoError::parse("Face indices not found")),
    }
}

/// Per-vertex texture coordinates, if every vertex carries one of the
/// accepted property pairs
fn extract_texcoords(vertices: &[DefaultElement]) -> Option<Vec<TexCoord>> {
    let first = vertices.first()?;
    let (u_name, v_name) = TEXCOORD_PROPERTIES
        .iter()
        .find(|(u, v)| first.contains_key(*u) && first.contains_key(*v))?;

    vertices
        .iter()
        .map(|vertex| {
            let u = extract_property_value(vertex, u_name).ok()?;
            let v = extract_property_value(vertex, v_name).ok()?;
            Some(TexCoord::new(u, v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use animvox_core::TriangleMesh;

    #[test]
    fn test_read_quads_with_uv() {
        let file = tempfile::Builder::new().suffix(".ply").tempfile().unwrap();
        let content = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property float u
property float v
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0 0
1 0 0 1 0
1 1 0 1 1
0 1 0 0 1
4 0 1 2 3
";
        std::fs::write(file.path(), content).unwrap();

        let mesh = PlyReader::read_polygon_mesh(file.path()).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.polygons, vec![vec![0, 1, 2, 3]]);
        assert_eq!(mesh.vertex_texcoords()[2], TexCoord::new(1.0, 1.0));
        assert_eq!(mesh.triangulate().len(), 2);
    }

    #[test]
    fn test_read_without_uv() {
        let file = tempfile::Builder::new().suffix(".ply").tempfile().unwrap();
        let content = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 2
";
        std::fs::write(file.path(), content).unwrap();

        let mesh = PlyReader::read_polygon_mesh(file.path()).unwrap();
        assert!(mesh.uv_layer.is_none());
        assert!(mesh.vertex_texcoords().iter().all(|uv| *uv == TexCoord::zero()));
    }

    #[test]
    fn test_out_of_range_face_is_rejected() {
        let file = tempfile::Builder::new().suffix(".ply").tempfile().unwrap();
        let content = "ply
format ascii 1.0
element vertex 1
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
3 0 1 2
";
        std::fs::write(file.path(), content).unwrap();

        let result = PlyReader::read_polygon_mesh(file.path());
        assert!(matches!(result, Err(animvox_core::Error::InvalidData(_))));
    }

    #[test]
    fn test_write_voxel_mesh_header_and_payload() {
        let mut mesh = TriangleMesh::new();
        mesh.add_vertex(Point3f::new(0.0, 0.0, 0.0), TexCoord::new(0.25, 0.75));
        mesh.add_vertex(Point3f::new(1.0, 0.0, 0.0), TexCoord::new(0.25, 0.75));
        mesh.add_vertex(Point3f::new(0.0, 1.0, 0.0), TexCoord::new(0.25, 0.75));
        mesh.add_face([0, 1, 2]);
        let voxel_mesh = VoxelMesh {
            name: VoxelMesh::name_for(4),
            frame_index: 4,
            mesh,
            material: Some("Skin".to_string()),
        };

        let file = tempfile::Builder::new().suffix(".ply").tempfile().unwrap();
        PlyWriter::write_voxel_mesh(&voxel_mesh, file.path()).unwrap();

        let mut reader = BufReader::new(File::open(file.path()).unwrap());
        let ply = Parser::<DefaultElement>::new().read_ply(&mut reader).unwrap();

        assert_eq!(ply.header.obj_infos, vec!["voxelFrame_4".to_string()]);
        assert_eq!(ply.header.comments, vec!["material Skin".to_string()]);

        let vertices = &ply.payload["vertex"];
        assert_eq!(vertices.len(), 3);
        assert_eq!(extract_property_value(&vertices[1], "x").unwrap(), 1.0);
        assert_eq!(extract_property_value(&vertices[1], "s").unwrap(), 0.25);
        assert_eq!(extract_property_value(&vertices[1], "t").unwrap(), 0.75);
        assert_eq!(extract_face_indices(&ply.payload["face"][0]).unwrap(), vec![0, 1, 2]);
    }
}
