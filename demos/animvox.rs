//! Voxelize a numbered PLY sequence and write one cube mesh per frame
//!
//! ```text
//! animvox --input "walk/frame_{frame}.ply" --frames 1,10,20 --scale 0.1 --output voxels/
//! ```

use animvox_io::{write_voxel_mesh_to_dir, PlySequenceProvider, VoxelMesh};
use animvox_voxelize::{AnimationVoxelizer, FrameOutcome, ParallelConfig, SamplerKind, VoxelizeConfig};
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SamplerArg {
    BruteForce,
    RTree,
}

impl From<SamplerArg> for SamplerKind {
    fn from(arg: SamplerArg) -> Self {
        match arg {
            SamplerArg::BruteForce => SamplerKind::BruteForce,
            SamplerArg::RTree => SamplerKind::RTree,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "animvox", version, about = "Per-frame voxelization of animated meshes")]
struct Args {
    /// Path pattern of the input frames, with `{frame}` in place of the number
    #[arg(short, long)]
    input: String,

    /// Zero-pad frame numbers in input paths to this many digits
    #[arg(long, default_value_t = 0)]
    padding: usize,

    /// Comma-separated frames to voxelize
    #[arg(short, long, default_value = animvox_voxelize::DEFAULT_FRAMES)]
    frames: String,

    /// Voxel edge length in world units
    #[arg(short, long, default_value_t = animvox_voxelize::DEFAULT_SCALE)]
    scale: f32,

    /// Material name recorded on every output mesh
    #[arg(short, long)]
    material: Option<String>,

    /// Directory the voxel meshes are written to
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Nearest-vertex lookup used for texture coordinates
    #[arg(long, value_enum, default_value_t = SamplerArg::BruteForce)]
    sampler: SamplerArg,

    /// Process frames and triangles on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Worker thread count (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,
}

impl Args {
    fn config(&self) -> VoxelizeConfig {
        let mut parallel = ParallelConfig::default().with_enabled(!self.sequential);
        if let Some(threads) = self.threads {
            parallel = parallel.with_threads(threads);
        }

        let mut config = VoxelizeConfig::default()
            .with_scale(self.scale)
            .with_frames(self.frames.clone())
            .with_sampler(self.sampler.into())
            .with_parallel(parallel);
        if let Some(material) = &self.material {
            config = config.with_material(material.clone());
        }
        config
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let config = args.config();

    let voxelizer = AnimationVoxelizer::from_config(&config).context("invalid voxelization settings")?;
    let provider = PlySequenceProvider::new(args.input.clone())?.with_padding(args.padding);

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create output directory {}", args.output.display()))?;

    let report = voxelizer.run(&provider)?;

    for outcome in &report.outcomes {
        match outcome {
            FrameOutcome::Voxelized(result) => {
                let Some(mesh) = VoxelMesh::from_frame(result, config.material.as_deref()) else {
                    continue;
                };
                let path = write_voxel_mesh_to_dir(&mesh, &args.output)
                    .with_context(|| format!("cannot write {}", mesh.name))?;
                log::info!(
                    "Frame {}: {} cubes -> {}",
                    result.frame_index,
                    mesh.cube_count(),
                    path.display()
                );
            }
            FrameOutcome::Skipped { frame, reason } => {
                log::info!("Frame {}: skipped ({})", frame, reason);
            }
        }
    }

    log::info!(
        "Done: {} frames voxelized, {} skipped{}",
        report.voxelized_count(),
        report.skipped_count(),
        if report.cancelled { ", cancelled" } else { "" }
    );

    Ok(())
}
