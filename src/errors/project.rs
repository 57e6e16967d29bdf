//! Project configuration errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Failed to read project config '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Invalid project config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid project config: {0}")]
    Validation(String),
}

impl ProjectError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProjectError::Parse { .. } | ProjectError::Validation(_))
    }
}
