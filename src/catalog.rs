use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::{PlanError, PlanResult};
use crate::migration::MigrationId;
use crate::project::Project;

/// Every migration known to a project, ascending by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    ids: Vec<MigrationId>,
}

impl Catalog {
    /// Build a catalog; ids are sorted lexicographically.
    pub fn new(mut ids: Vec<MigrationId>) -> Self {
        ids.sort();
        Self { ids }
    }

    pub fn ids(&self) -> &[MigrationId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &MigrationId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &MigrationId) -> Option<usize> {
        self.ids.binary_search(id).ok()
    }

    /// Prefix of the catalog ending at `id` inclusive
    pub fn through(&self, id: &MigrationId) -> Option<&[MigrationId]> {
        self.position(id).map(|idx| &self.ids[..=idx])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MigrationId> {
        self.ids.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a MigrationId;
    type IntoIter = std::slice::Iter<'a, MigrationId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

impl FromIterator<MigrationId> for Catalog {
    fn from_iter<T: IntoIterator<Item = MigrationId>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Source of the migration catalog for a project.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_migrations(&self, project: &Project) -> PlanResult<Catalog>;
}

/// Reads migration files from `project.migrations_dir()`.
///
/// Only regular files named `<timestamp>-<description>` with an accepted
/// extension are listed; hidden files and directories are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCatalog;

#[async_trait]
impl CatalogProvider for FsCatalog {
    async fn list_migrations(&self, project: &Project) -> PlanResult<Catalog> {
        let dir = project.migrations_dir();
        let unavailable = |e: std::io::Error| {
            warn!("Unable to read migrations from {}: {}", dir.display(), e);
            PlanError::source_unavailable(dir, e)
        };

        let mut entries = tokio::fs::read_dir(dir).await.map_err(unavailable)?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(unavailable)? {
            let file_type = entry.file_type().await.map_err(unavailable)?;
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!("Skipping non UTF-8 file name: {:?}", entry.file_name());
                continue;
            };
            if name.starts_with('.')
                || !MigrationId::matches_convention(&name)
                || !project.accepts_extension(&name)
            {
                debug!("Ignoring {} in {}", name, dir.display());
                continue;
            }
            ids.push(MigrationId::from(name));
        }

        let catalog = Catalog::new(ids);
        debug!(
            "Found {} migrations in {}",
            catalog.len(),
            dir.display()
        );
        Ok(catalog)
    }
}

/// Fixed in-memory catalog, ignoring the project descriptor.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    catalog: Catalog,
}

impl StaticCatalog {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MigrationId>,
    {
        Self {
            catalog: ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn list_migrations(&self, _project: &Project) -> PlanResult<Catalog> {
        Ok(self.catalog.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        fs::write(dir.path().join(name), "").unwrap();
    }

    #[test]
    fn test_catalog_sorts_and_bounds() {
        let catalog: Catalog = ["3-c.js", "1-a.js", "2-b.js"]
            .into_iter()
            .map(MigrationId::from)
            .collect();
        let ids: Vec<&str> = catalog.iter().map(MigrationId::as_str).collect();
        assert_eq!(ids, vec!["1-a.js", "2-b.js", "3-c.js"]);

        let prefix = catalog.through(&MigrationId::from("2-b.js")).unwrap();
        assert_eq!(prefix.len(), 2);
        assert!(catalog.through(&MigrationId::from("9-z.js")).is_none());
        assert_eq!(catalog.position(&MigrationId::from("3-c.js")), Some(2));
    }

    #[tokio::test]
    async fn test_fs_catalog_filters_entries() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "1414006573700-fourth.js");
        touch(&dir, "1414006573623-first.js");
        touch(&dir, "notes.txt");
        touch(&dir, ".1414006573650-hidden.js");
        touch(&dir, "1414006573660-readme.md");
        fs::create_dir(dir.path().join("1414006573690-folder.js")).unwrap();

        let project = Project::new(dir.path());
        let catalog = FsCatalog.list_migrations(&project).await.unwrap();
        let ids: Vec<&str> = catalog.iter().map(MigrationId::as_str).collect();
        assert_eq!(ids, vec!["1414006573623-first.js", "1414006573700-fourth.js"]);
    }

    #[tokio::test]
    async fn test_fs_catalog_empty_dir() {
        let dir = TempDir::new().unwrap();
        let catalog = FsCatalog
            .list_migrations(&Project::new(dir.path()))
            .await
            .unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_fs_catalog_missing_dir() {
        let dir = TempDir::new().unwrap();
        let project = Project::new(dir.path().join("doesnotexist"));
        let err = FsCatalog.list_migrations(&project).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("doesnotexist"));
    }

    #[tokio::test]
    async fn test_static_catalog() {
        let provider = StaticCatalog::new(["2-b", "1-a"]);
        let catalog = provider
            .list_migrations(&Project::new("unused"))
            .await
            .unwrap();
        assert_eq!(catalog.ids()[0], MigrationId::from("1-a"));
    }
}
