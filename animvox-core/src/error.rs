//! Error types for animvox

use thiserror::Error;

/// Main error type for animvox operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Mesh snapshot has no geometry: no vertices or a zero-extent bounding box")]
    EmptyGeometry,

    #[error("Invalid voxel scale {0}: must be a positive, finite number")]
    InvalidScale(f32),

    #[error("Voxel grid of {}x{}x{} cells is too large", counts[0], counts[1], counts[2])]
    GridTooLarge { counts: [usize; 3] },

    #[error("Invalid frame list {input:?}: {reason}")]
    InvalidFrameList { input: String, reason: String },

    #[error("Snapshot unavailable for frame {frame}: {reason}")]
    SnapshotUnavailable { frame: i32, reason: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

impl Error {
    /// Whether the error only affects a single frame.
    ///
    /// Recoverable errors are reported and the frame is skipped; everything
    /// else aborts the batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::EmptyGeometry | Error::GridTooLarge { .. } | Error::SnapshotUnavailable { .. }
        )
    }

    pub fn snapshot_unavailable(frame: i32, reason: impl Into<String>) -> Self {
        Error::SnapshotUnavailable {
            frame,
            reason: reason.into(),
        }
    }
}

/// Result type alias for animvox operations
pub type Result<T> = std::result::Result<T, Error>;
