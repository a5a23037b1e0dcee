//! Point and texture coordinate types

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A 2D texture coordinate
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
}

impl TexCoord {
    /// Create a texture coordinate from its components
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    /// The (0, 0) coordinate assigned when a mesh has no UV layer
    pub const fn zero() -> Self {
        Self { u: 0.0, v: 0.0 }
    }
}

impl From<[f32; 2]> for TexCoord {
    fn from([u, v]: [f32; 2]) -> Self {
        Self { u, v }
    }
}

impl From<(f32, f32)> for TexCoord {
    fn from((u, v): (f32, f32)) -> Self {
        Self { u, v }
    }
}

/// A world-space vertex position together with its texture coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TexturedVertex {
    pub position: Point3f,
    pub texcoord: TexCoord,
}

impl TexturedVertex {
    pub fn new(position: Point3f, texcoord: TexCoord) -> Self {
        Self { position, texcoord }
    }

    /// A vertex carrying the default (0, 0) texture coordinate
    pub fn untextured(position: Point3f) -> Self {
        Self {
            position,
            texcoord: TexCoord::zero(),
        }
    }
}

impl Default for TexturedVertex {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            texcoord: TexCoord::zero(),
        }
    }
}
