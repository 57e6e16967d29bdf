//! State snapshot loading errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StateError {
    /// Snapshot file exists but could not be read
    #[error("Failed to read state from '{}': {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    /// Snapshot is not a plain `{ "<migration>": <marker> }` object
    #[error("Malformed state snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: StateError = json_err.into();
        assert!(err.to_string().starts_with("Malformed state snapshot"));
    }
}
