//! Error types for sift.
//!
//! The walk/load/assemble core never fails; these cover the glue around
//! it (root validation, config files, writing output).

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::output::OutputError;

/// Top-level error type for sift operations.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    #[error("path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Map an error to its exit code.
pub fn exit_code(error: &SiftError) -> i32 {
    match error {
        SiftError::PathNotFound(_) => 3,
        SiftError::NotADirectory(_) => 4,
        SiftError::Io(_) => 1,
        SiftError::Config(_) => 2,
        SiftError::Output(_) => 1,
    }
}
