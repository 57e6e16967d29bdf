pub mod catalog;
pub mod common;
pub mod errors;
pub mod migration;
pub mod planner;
pub mod plugins;
pub mod project;
pub mod render;
pub mod state;

pub use catalog::{Catalog, CatalogProvider, FsCatalog, StaticCatalog};
pub use migration::MigrationId;
pub use planner::{Decision, PlanEntry, PlanOptions, Planner, Runlist};
pub use plugins::{Plugin, PluginRegistry};
pub use project::Project;
pub use state::{AppliedMarker, StateRecord, StateScope};
