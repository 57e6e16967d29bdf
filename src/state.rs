use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::{StateError, StateResult};
use crate::migration::MigrationId;

/// Opaque "has been applied" marker.
///
/// By convention the epoch-millisecond time the migration ran, but any JSON
/// value is accepted; planning only checks for presence.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct AppliedMarker(Value);

impl AppliedMarker {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Numeric marker, also accepting numbers stored as strings
    pub fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Marker read as epoch milliseconds, when numeric and in range
    pub fn applied_at(&self) -> Option<DateTime<Utc>> {
        self.as_i64().and_then(DateTime::from_timestamp_millis)
    }
}

impl fmt::Display for AppliedMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<i64> for AppliedMarker {
    fn from(value: i64) -> Self {
        Self(value.into())
    }
}

impl From<Value> for AppliedMarker {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Which tracking scope a marker came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateScope {
    /// Shared across every node
    Global,
    /// This node only
    Local,
}

impl fmt::Display for StateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateScope::Global => write!(f, "global"),
            StateScope::Local => write!(f, "local"),
        }
    }
}

/// Read-only snapshot of applied migrations for one scope.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct StateRecord {
    applied: BTreeMap<MigrationId, AppliedMarker>,
}

impl StateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(applied: BTreeMap<MigrationId, AppliedMarker>) -> Self {
        Self { applied }
    }

    /// Parse a plain JSON object of `{ "<migration>": <marker> }`
    pub fn from_json_str(json: &str) -> StateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot file; a missing file is an empty record.
    pub fn load(path: impl AsRef<Path>) -> StateResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let record = Self::from_json_str(&content)?;
                debug!(
                    "Loaded {} applied markers from {}",
                    record.len(),
                    path.display()
                );
                Ok(record)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No state at {}, starting empty", path.display());
                Ok(Self::new())
            }
            Err(source) => Err(StateError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn is_applied(&self, id: &MigrationId) -> bool {
        self.applied.contains_key(id)
    }

    pub fn marker(&self, id: &MigrationId) -> Option<&AppliedMarker> {
        self.applied.get(id)
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MigrationId, &AppliedMarker)> {
        self.applied.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for StateRecord
where
    K: Into<MigrationId>,
    V: Into<AppliedMarker>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            applied: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
