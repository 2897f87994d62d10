use std::path::PathBuf;
use thiserror::Error;

/// Errors callers may want to match on. Everything else travels as `anyhow::Error`.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Read a whole file, tagging a failure with the offending path.
pub fn read_to_string(path: PathBuf) -> Result<String, SetupError> {
    std::fs::read_to_string(&path).map_err(|source| SetupError::Read { path, source })
}
