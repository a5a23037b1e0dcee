//! Basic usage example for animvox
//!
//! Voxelizes a spinning, textured quad-cube over a handful of frames without
//! touching the file system.

use animvox_core::{MeshSnapshot, Point3f, PolygonMesh, Result, TexCoord, Transform3D, UnitQuaternion, Vector3f};
use animvox_io::VoxelMesh;
use animvox_voxelize::{AnimationVoxelizer, SamplerKind, VoxelizeConfig};

fn textured_cube(size: f32) -> PolygonMesh {
    let positions = (0..8)
        .map(|i| {
            Point3f::new(
                size * (i & 1) as f32,
                size * ((i >> 1) & 1) as f32,
                size * ((i >> 2) & 1) as f32,
            )
        })
        .collect();
    let polygons = vec![
        vec![0, 2, 3, 1],
        vec![4, 5, 7, 6],
        vec![0, 1, 5, 4],
        vec![2, 6, 7, 3],
        vec![1, 3, 7, 5],
        vec![0, 4, 6, 2],
    ];
    let square = [
        TexCoord::new(0.0, 0.0),
        TexCoord::new(1.0, 0.0),
        TexCoord::new(1.0, 1.0),
        TexCoord::new(0.0, 1.0),
    ];
    let uv_layer = polygons.iter().map(|_| square.to_vec()).collect();

    PolygonMesh::new(positions, polygons).with_uv_layer(uv_layer)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    println!("animvox Basic Usage Example");
    println!("===========================");

    let cube = textured_cube(2.0);

    // Frame n rotates the cube by n * 9 degrees about Z
    let provider = |frame: i32| -> Result<MeshSnapshot> {
        let angle = (frame as f32 * 9.0).to_radians();
        let rotation = UnitQuaternion::from_axis_angle(&Vector3f::z_axis(), angle);
        cube.to_snapshot(&Transform3D::from_translation_rotation(Vector3f::zeros(), rotation))
    };

    let config = VoxelizeConfig::default()
        .with_scale(0.25)
        .with_frames("0,5,10")
        .with_material("Checker")
        .with_sampler(SamplerKind::RTree);
    let report = AnimationVoxelizer::from_config(&config)?.run(&provider)?;

    for result in report.voxelized() {
        println!(
            "\nFrame {}: grid {:?}, {} of {} voxels occupied",
            result.frame_index,
            result.grid.counts,
            result.occupied_count(),
            result.len()
        );

        if let Some(mesh) = VoxelMesh::from_frame(result, config.material.as_deref()) {
            println!(
                "- {}: {} cubes, {} vertices, {} triangles, material {:?}",
                mesh.name,
                mesh.cube_count(),
                mesh.mesh.vertex_count(),
                mesh.mesh.face_count(),
                mesh.material
            );
        }
    }

    for (frame, reason) in report.skipped() {
        println!("\nFrame {} skipped: {}", frame, reason);
    }

    Ok(())
}
