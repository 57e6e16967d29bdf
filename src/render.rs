use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::planner::{Decision, DecisionReason, ExplainedEntry, PlanEntry, Runlist};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Serialize)]
struct ExplainedRow<'a> {
    action: Decision,
    migration: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    marker: Option<&'a serde_json::Value>,
}

#[derive(Serialize)]
struct CatalogRow<'a> {
    migration: &'a str,
    timestamp: Option<u64>,
    all_nodes: bool,
}

pub fn render_runlist(runlist: &Runlist, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(runlist)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(runlist)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for entry in runlist {
                out.push_str(&text_line(entry, None));
                out.push('\n');
            }
            out.push_str(&summary(runlist.iter()));
            Ok(out)
        }
    }
}

pub fn render_explained(entries: &[ExplainedEntry], format: OutputFormat) -> anyhow::Result<String> {
    let rows: Vec<ExplainedRow> = entries
        .iter()
        .map(|e| {
            let (scope, marker) = match &e.reason {
                DecisionReason::Pending => (None, None),
                DecisionReason::Applied { scope, marker } => {
                    (Some(scope.to_string()), Some(marker.value()))
                }
            };
            ExplainedRow {
                action: e.entry.decision,
                migration: e.entry.id.as_str(),
                scope,
                marker,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&rows)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for e in entries {
                out.push_str(&text_line(&e.entry, Some(&e.reason)));
                out.push('\n');
            }
            out.push_str(&summary(entries.iter().map(|e| &e.entry)));
            Ok(out)
        }
    }
}

pub fn render_catalog(catalog: &Catalog, format: OutputFormat) -> anyhow::Result<String> {
    let rows: Vec<CatalogRow> = catalog
        .iter()
        .map(|id| CatalogRow {
            migration: id.as_str(),
            timestamp: id.timestamp(),
            all_nodes: id.is_node_local(),
        })
        .collect();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&rows)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&rows)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for row in &rows {
                out.push_str(row.migration);
                if row.all_nodes {
                    out.push_str(&format!(" {}", "[all nodes]".cyan()));
                }
                out.push('\n');
            }
            out.push_str(&format!("{} migrations\n", rows.len()));
            Ok(out)
        }
    }
}

fn text_line(entry: &PlanEntry, reason: Option<&DecisionReason>) -> String {
    let action = match entry.decision {
        Decision::Up => format!("{:<5}", "up").green().bold(),
        Decision::Skip => format!("{:<5}", "skip").dimmed(),
    };
    let mut line = format!("{} {}", action, entry.id);

    if let Some(DecisionReason::Applied { scope, marker }) = reason {
        let when = marker
            .applied_at()
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| marker.to_string());
        line.push_str(&format!(" ({} {})", scope, when));
    }
    line
}

fn summary<'a>(entries: impl Iterator<Item = &'a PlanEntry>) -> String {
    let (up, skip) = entries.fold((0, 0), |(up, skip), e| match e.decision {
        Decision::Up => (up + 1, skip),
        Decision::Skip => (up, skip + 1),
    });
    format!("{} to run, {} skipped\n", up, skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::MigrationId;
    use crate::state::{AppliedMarker, StateScope};

    fn runlist() -> Runlist {
        vec![
            PlanEntry::new(MigrationId::from("1414006573623-first.js"), Decision::Up),
            PlanEntry::new(MigrationId::from("1414006573678-second.js"), Decision::Skip),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_text_output() {
        colored::control::set_override(false);
        let out = render_runlist(&runlist(), OutputFormat::Text).unwrap();
        assert_eq!(
            out,
            "up    1414006573623-first.js\nskip  1414006573678-second.js\n1 to run, 1 skipped\n"
        );
    }

    #[test]
    fn test_yaml_output() {
        let out = render_runlist(&runlist(), OutputFormat::Yaml).unwrap();
        assert!(out.contains("action: up"));
        assert!(out.contains("migration: 1414006573678-second.js"));
    }

    #[test]
    fn test_explained_json_includes_scope() {
        let entries = vec![ExplainedEntry {
            entry: PlanEntry::new(MigrationId::from("1-a.js"), Decision::Skip),
            reason: DecisionReason::Applied {
                scope: StateScope::Local,
                marker: AppliedMarker::new(1i64),
            },
        }];
        let out = render_explained(&entries, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["scope"], "local");
        assert_eq!(value[0]["marker"], 1);
        assert_eq!(value[0]["action"], "skip");
    }

    #[test]
    fn test_explained_text_with_non_numeric_marker() {
        colored::control::set_override(false);
        let entries = vec![ExplainedEntry {
            entry: PlanEntry::new(MigrationId::from("1-a.js"), Decision::Skip),
            reason: DecisionReason::Applied {
                scope: StateScope::Global,
                marker: AppliedMarker::new("web-1"),
            },
        }];
        let out = render_explained(&entries, OutputFormat::Text).unwrap();
        assert!(out.starts_with("skip  1-a.js (global web-1)\n"));
    }

    #[test]
    fn test_catalog_json() {
        let catalog: Catalog = ["1414006573679-third.all.js"]
            .into_iter()
            .map(MigrationId::from)
            .collect();
        let out = render_catalog(&catalog, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["all_nodes"], true);
        assert_eq!(value[0]["timestamp"], 1414006573679u64);
    }
}
