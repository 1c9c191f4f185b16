use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("progress file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed progress data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown vehicle: {0}")]
    UnknownVehicle(String),
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("asset {0} is empty")]
    Empty(PathBuf),
}
