//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Write error: {message}")]
    WriteError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IoError {
    pub fn parse(message: impl Into<String>) -> Self {
        IoError::ParseError {
            message: message.into(),
        }
    }
}

impl From<IoError> for animvox_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => animvox_core::Error::Io(e),
            IoError::FileNotFound { path } => animvox_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path),
            )),
            IoError::InvalidFormat { format } => animvox_core::Error::UnsupportedFormat(format),
            other @ (IoError::ParseError { .. } | IoError::WriteError { .. }) => {
                animvox_core::Error::InvalidData(other.to_string())
            }
        }
    }
}
