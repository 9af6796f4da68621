use std::path::PathBuf;

use thiserror::Error;

/// Library error type for infinity-wall operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A configured image directory is missing or is not a directory.
    #[error("invalid image directory: {}", .0.display())]
    BadDir(PathBuf),

    /// A background colour string could not be parsed as hex.
    #[error("invalid colour {0:?}")]
    InvalidColor(String),

    /// An image reference is neither a data URI, a URL nor a plain key.
    #[error("malformed image reference {0:?}")]
    MalformedImageRef(String),

    /// An export was requested without any images to export.
    #[error("no images to export")]
    NothingToExport,

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Gesture script could not be decoded.
    #[error(transparent)]
    Script(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
