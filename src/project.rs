use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{ProjectError, ProjectResult};

/// Default config file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "migrat.yaml";

/// ## Structure
/// Project configuration file layout.
///
/// ```text
/// ProjectConfig
///   ├── name: Option<String>
///   ├── migrations_dir: String
///   ├── extensions: Option<Vec<String>>
///   └── state: Option<StateConfig>
///       ├── global: Option<String>
///       └── local: Option<String>
/// ```
///
/// Relative paths are resolved against the directory holding the config file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProjectConfig {
    pub name: Option<String>,
    pub migrations_dir: String,
    pub extensions: Option<Vec<String>>,
    pub state: Option<StateConfig>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StateConfig {
    pub global: Option<String>,
    pub local: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            migrations_dir: "migrations".to_string(),
            extensions: Some(vec!["js".to_string()]),
            state: Some(StateConfig {
                global: Some(".migrat/global.json".to_string()),
                local: Some(".migrat/local.json".to_string()),
            }),
        }
    }
}

/// Resolved project descriptor handed to catalog providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    name: Option<String>,
    migrations_dir: PathBuf,
    extensions: Vec<String>,
    global_state: PathBuf,
    local_state: PathBuf,
}

impl Project {
    /// Project rooted at `migrations_dir` with default settings
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        let migrations_dir = migrations_dir.into();
        let root = migrations_dir
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let mut project = Self::from_config(ProjectConfig::default(), &root);
        project.migrations_dir = migrations_dir;
        project
    }

    pub fn from_config(config: ProjectConfig, root: &Path) -> Self {
        let state = config.state.unwrap_or_default();
        let defaults = ProjectConfig::default().state.unwrap_or_default();
        let global = state.global.or(defaults.global).unwrap_or_default();
        let local = state.local.or(defaults.local).unwrap_or_default();

        Self {
            name: config.name,
            migrations_dir: root.join(config.migrations_dir),
            extensions: config
                .extensions
                .unwrap_or_else(|| vec!["js".to_string()])
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .collect(),
            global_state: root.join(global),
            local_state: root.join(local),
        }
    }

    /// Load a project from a YAML config file
    pub fn load(path: impl AsRef<Path>) -> ProjectResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ProjectConfig =
            serde_yaml::from_str(&content).map_err(|source| ProjectError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.migrations_dir.trim().is_empty() {
            return Err(ProjectError::Validation(
                "migrations_dir must not be empty".to_string(),
            ));
        }

        let root = path.parent().unwrap_or_else(|| Path::new(""));
        let project = Self::from_config(config, root);
        debug!("Loaded project: {:?}", project);
        Ok(project)
    }

    /// Serialised default config, as written by `migrat init`
    pub fn default_config_yaml() -> ProjectResult<String> {
        serde_yaml::to_string(&ProjectConfig::default()).map_err(|e| {
            ProjectError::Validation(format!("failed to serialise default config: {}", e))
        })
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Accepted migration file extensions; empty accepts any
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn global_state_path(&self) -> &Path {
        &self.global_state
    }

    pub fn local_state_path(&self) -> &Path {
        &self.local_state
    }

    /// Whether `file_name` has one of the accepted extensions
    pub fn accepts_extension(&self, file_name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        Path::new(file_name)
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }
}
