//! Core data structures and traits for animvox
//! 
//! This crate provides the fundamental types shared by the voxelization engine and
//! its hosts: points and texture coordinates, triangles, per-frame mesh snapshots,
//! polygon meshes with UV layers, transforms and the snapshot provider trait.

pub mod point;
pub mod mesh;
pub mod snapshot;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use snapshot::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4, Isometry3, UnitQuaternion};
