use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// `<timestamp>-<description>`, e.g. `1414006573623-first.js`
static ID_CONVENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)-(.+)$").expect("migration id pattern is valid"));

/// Marker for migrations meant to run once on every node.
const NODE_LOCAL_MARKER: &str = ".all.";

/// Identifier of a single migration.
///
/// Ordering is plain lexicographic string order. The timestamp prefix only
/// matters because it makes lexicographic order match creation order; the
/// planner never parses it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct MigrationId(String);

impl MigrationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether a file name follows the `<timestamp>-<description>` convention
    pub fn matches_convention(name: &str) -> bool {
        ID_CONVENTION.is_match(name)
    }

    /// Numeric prefix, when the id follows the naming convention
    pub fn timestamp(&self) -> Option<u64> {
        ID_CONVENTION
            .captures(&self.0)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }

    /// Description part after the timestamp prefix
    pub fn description(&self) -> Option<&str> {
        ID_CONVENTION
            .captures(&self.0)
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str())
    }

    /// Whether the id carries the `.all.` marker (run on every node).
    ///
    /// Such migrations are decided by the local state record only.
    pub fn is_node_local(&self) -> bool {
        self.0.contains(NODE_LOCAL_MARKER)
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MigrationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MigrationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
