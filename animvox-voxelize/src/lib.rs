//! # animvox Voxelize
//!
//! Converts per-frame triangle mesh snapshots into voxel grids.
//!
//! The pipeline for a single frame is: bounding box ([`bounds`]), grid
//! parameters ([`grid`]), exact triangle/box overlap with the separating axis
//! theorem ([`intersect`]) and nearest-vertex texture coordinate transfer
//! ([`sampler`]), orchestrated by [`frame::FrameVoxelizer`]. [`animation`]
//! runs that pipeline over a list of frames pulled from a
//! [`animvox_core::SnapshotProvider`].

pub mod bounds;
pub mod grid;
pub mod intersect;
pub mod sampler;
pub mod frame;
pub mod frames;
pub mod animation;
pub mod config;
pub mod parallel;

// Re-export commonly used items
pub use bounds::*;
pub use grid::*;
pub use intersect::*;
pub use sampler::*;
pub use frame::*;
pub use frames::*;
pub use animation::*;
pub use config::*;
pub use parallel::ParallelConfig;
