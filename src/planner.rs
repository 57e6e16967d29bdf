//! Runlist planning against global and local applied state.
//!
//! ```text
//! Idle ──catalog──▶ Validating bound ──classify──▶ Done
//!   └─────────────────────┴──────────────────────▶ Failed
//! ```
//!
//! A migration is skipped when either state record marks it applied; there is
//! no way to force a re-run of something applied in either scope. Migrations
//! carrying the `.all.` marker run once on every node, so only the local
//! record decides them. Execution of `up` entries happens elsewhere.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogProvider, FsCatalog};
use crate::errors::{PlanError, PlanResult};
use crate::migration::MigrationId;
use crate::plugins::PluginRegistry;
use crate::project::Project;
use crate::state::{AppliedMarker, StateRecord, StateScope};

/// What to do with a migration on this node.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Up,
    Skip,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Up => write!(f, "up"),
            Decision::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PlanEntry {
    #[serde(rename = "action")]
    pub decision: Decision,
    #[serde(rename = "migration")]
    pub id: MigrationId,
}

impl PlanEntry {
    pub fn new(id: MigrationId, decision: Decision) -> Self {
        Self { decision, id }
    }
}

/// Ordered plan produced by [`Planner::plan`], in catalog order.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Runlist {
    entries: Vec<PlanEntry>,
}

impl Runlist {
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanEntry> {
        self.entries.iter()
    }

    /// Migrations the caller should execute, in order
    pub fn to_run(&self) -> impl Iterator<Item = &MigrationId> {
        self.with_decision(Decision::Up)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &MigrationId> {
        self.with_decision(Decision::Skip)
    }

    fn with_decision(&self, decision: Decision) -> impl Iterator<Item = &MigrationId> {
        self.entries
            .iter()
            .filter(move |e| e.decision == decision)
            .map(|e| &e.id)
    }
}

impl<'a> IntoIterator for &'a Runlist {
    type Item = &'a PlanEntry;
    type IntoIter = std::slice::Iter<'a, PlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<PlanEntry> for Runlist {
    fn from_iter<T: IntoIterator<Item = PlanEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Runlist {
    type Item = PlanEntry;
    type IntoIter = std::vec::IntoIter<PlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Last migration to include, inclusive
    pub to: Option<MigrationId>,
}

impl PlanOptions {
    pub fn to(id: impl Into<MigrationId>) -> Self {
        Self {
            to: Some(id.into()),
        }
    }

    /// Bound with blank values treated as absent
    fn bound(&self) -> Option<&MigrationId> {
        self.to.as_ref().filter(|id| !id.as_str().is_empty())
    }
}

/// Why an entry received its decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecisionReason {
    /// No record that decides this migration holds a marker
    Pending,
    /// Marker found in the record that decided the entry
    Applied {
        scope: StateScope,
        marker: AppliedMarker,
    },
}

/// Plan entry together with the state behind its decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplainedEntry {
    pub entry: PlanEntry,
    pub reason: DecisionReason,
}

/// Applied-anywhere classification. Global is reported first when both
/// scopes hold a marker. Node-local (`.all.`) migrations ignore global
/// markers: another node running them says nothing about this one.
fn classify(id: &MigrationId, global: &StateRecord, local: &StateRecord) -> DecisionReason {
    let local_marker = || local.marker(id).map(|marker| (StateScope::Local, marker.clone()));
    let applied = if id.is_node_local() {
        local_marker()
    } else {
        global
            .marker(id)
            .map(|marker| (StateScope::Global, marker.clone()))
            .or_else(local_marker)
    };

    match applied {
        Some((scope, marker)) => DecisionReason::Applied { scope, marker },
        None => DecisionReason::Pending,
    }
}

/// Builds runlists from the catalog a provider returns.
pub struct Planner<C> {
    provider: C,
}

impl<C: CatalogProvider> Planner<C> {
    pub fn new(provider: C) -> Self {
        Self { provider }
    }

    /// Plan an `up` run.
    ///
    /// The bound is validated against the full catalog before any entry is
    /// classified, so a bad `to` never yields a partial runlist.
    pub async fn plan(
        &self,
        project: &Project,
        plugins: &PluginRegistry,
        global: &StateRecord,
        local: &StateRecord,
        options: &PlanOptions,
    ) -> PlanResult<Runlist> {
        let explained = self
            .explain(project, plugins, global, local, options)
            .await?;
        Ok(Runlist {
            entries: explained.into_iter().map(|e| e.entry).collect(),
        })
    }

    /// Same as [`Planner::plan`], keeping the state marker behind each skip.
    pub async fn explain(
        &self,
        project: &Project,
        _plugins: &PluginRegistry,
        global: &StateRecord,
        local: &StateRecord,
        options: &PlanOptions,
    ) -> PlanResult<Vec<ExplainedEntry>> {
        info!(
            "Planning migrations for {}",
            project.migrations_dir().display()
        );

        let catalog = self.provider.list_migrations(project).await?;

        let ids = match options.bound() {
            Some(to) => catalog.through(to).ok_or_else(|| {
                warn!("Target migration {} not in catalog", to);
                PlanError::BoundNotFound(to.clone())
            })?,
            None => catalog.ids(),
        };

        let entries: Vec<ExplainedEntry> = ids
            .iter()
            .map(|id| {
                let reason = classify(id, global, local);
                let decision = match reason {
                    DecisionReason::Pending => Decision::Up,
                    DecisionReason::Applied { .. } => Decision::Skip,
                };
                debug!("{} {} ({:?})", decision, id, reason);
                ExplainedEntry {
                    entry: PlanEntry::new(id.clone(), decision),
                    reason,
                }
            })
            .collect();

        info!(
            "Planned {} of {} migrations ({} to run)",
            entries.len(),
            catalog.len(),
            entries
                .iter()
                .filter(|e| e.entry.decision == Decision::Up)
                .count()
        );
        Ok(entries)
    }
}

/// Plan an `up` run reading migrations from the project directory.
pub async fn up(
    project: &Project,
    plugins: &PluginRegistry,
    global: &StateRecord,
    local: &StateRecord,
    options: &PlanOptions,
) -> PlanResult<Runlist> {
    Planner::new(FsCatalog)
        .plan(project, plugins, global, local, options)
        .await
}
