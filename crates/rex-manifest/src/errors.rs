use std::io;
use thiserror::Error;

/// Errors that can occur while rendering or writing example manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid manifest document: {0}")]
    InvalidDocument(String),
}
