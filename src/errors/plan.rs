//! Planning error types
//!
//! Both variants are terminal: the planner never retries and never returns a
//! partial runlist alongside an error.
//!
//! # Examples
//!
//! ```rust
//! use migrat::errors::PlanError;
//! use migrat::MigrationId;
//!
//! let err = PlanError::BoundNotFound(MigrationId::from("1414006573678-doesnotexist.js"));
//! assert!(err.to_string().contains("was not found"));
//! assert_eq!(err.error_code(), "BOUND_NOT_FOUND");
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::migration::MigrationId;

/// Errors produced while planning a runlist
#[derive(Error, Debug)]
pub enum PlanError {
    /// The migration catalog could not be read
    #[error(
        "Unable to read migrations from '{}' ({}): {source}",
        .path.display(),
        .source.kind()
    )]
    SourceUnavailable {
        /// Location the catalog was read from
        path: PathBuf,
        /// Underlying I/O failure
        source: io::Error,
    },

    /// The `to` bound names a migration absent from the catalog
    #[error("Migration '{0}' was not found among available migrations")]
    BoundNotFound(MigrationId),
}

impl PlanError {
    pub fn source_unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PlanError::SourceUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Check if the catalog source itself does not exist
    pub fn is_not_found(&self) -> bool {
        self.io_kind() == Some(io::ErrorKind::NotFound)
    }

    /// Underlying I/O error kind, if any
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            PlanError::SourceUnavailable { source, .. } => Some(source.kind()),
            PlanError::BoundNotFound(_) => None,
        }
    }

    /// Get error code for CLI/API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            PlanError::SourceUnavailable { .. } => "SOURCE_UNAVAILABLE",
            PlanError::BoundNotFound(_) => "BOUND_NOT_FOUND",
        }
    }
}
