//! Project config and state snapshot integration tests

use std::fs;

use anyhow::Result;
use migrat::errors::ProjectError;
use migrat::planner::{self, Decision, PlanOptions};
use migrat::{PluginRegistry, Project, StateRecord};
use tempfile::TempDir;

fn write_project(dir: &TempDir, config: &str, migrations: &[&str]) -> Result<()> {
    fs::write(dir.path().join("migrat.yaml"), config)?;
    let migrations_dir = dir.path().join("db");
    fs::create_dir_all(&migrations_dir)?;
    for name in migrations {
        fs::write(migrations_dir.join(name), "")?;
    }
    Ok(())
}

#[tokio::test]
async fn test_plan_from_config_and_state_files() -> Result<()> {
    let dir = TempDir::new()?;
    write_project(
        &dir,
        "name: inventory\nmigrations_dir: db\nextensions: [sql]\nstate:\n  global: state/global.json\n  local: state/local.json\n",
        &["20240101-create.sql", "20240102-index.all.sql", "20240103-seed.sql", "20240104-notes.txt"],
    )?;
    fs::create_dir_all(dir.path().join("state"))?;
    fs::write(
        dir.path().join("state/global.json"),
        r#"{"20240101-create.sql": 1704067200000}"#,
    )?;

    let project = Project::load(dir.path().join("migrat.yaml"))?;
    assert_eq!(project.name(), Some("inventory"));

    let global = StateRecord::load(project.global_state_path())?;
    let local = StateRecord::load(project.local_state_path())?;
    assert!(local.is_empty());

    let runlist = planner::up(
        &project,
        &PluginRegistry::new(),
        &global,
        &local,
        &PlanOptions::default(),
    )
    .await?;

    let pairs: Vec<(Decision, &str)> = runlist
        .iter()
        .map(|e| (e.decision, e.id.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Decision::Skip, "20240101-create.sql"),
            (Decision::Up, "20240102-index.all.sql"),
            (Decision::Up, "20240103-seed.sql"),
        ]
    );
    Ok(())
}

#[test]
fn test_missing_config_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Project::load(dir.path().join("migrat.yaml")).unwrap_err();
    assert!(matches!(err, ProjectError::Io { .. }));
}

#[test]
fn test_invalid_yaml_is_parse_error() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("migrat.yaml"), "name: [unterminated\n")?;
    let err = Project::load(dir.path().join("migrat.yaml")).unwrap_err();
    assert!(matches!(err, ProjectError::Parse { .. }));
    assert!(err.is_client_error());
    Ok(())
}

#[test]
fn test_blank_migrations_dir_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("migrat.yaml"), "migrations_dir: \"  \"\n")?;
    let err = Project::load(dir.path().join("migrat.yaml")).unwrap_err();
    assert!(matches!(err, ProjectError::Validation(_)));
    Ok(())
}
