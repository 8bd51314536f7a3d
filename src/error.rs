use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing, corrupt or mis-shaped density-model artifact. Fatal at startup.
    #[error("density model artifact {path}: {reason}")]
    Artifact { path: PathBuf, reason: String },

    /// A density model broke the sample(n) contract.
    #[error("sampling error: {0}")]
    Sampling(String),

    #[error("invalid row count {0}: must be a non-negative integer")]
    InvalidRowCount(i64),

    #[error("invalid date window: {0}")]
    InvalidWindow(String),

    #[error("invalid bandwidth {0}: must be finite and positive")]
    InvalidBandwidth(f64),

    #[error("catalog error: {0}")]
    Catalog(String),
}

impl Error {
    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Artifact { path: path.into(), reason: reason.into() }
    }
}
