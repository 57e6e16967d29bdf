//! Domain-specific error types for migrat
//!
//! # Error Categories
//!
//! - **PlanError**: catalog read failures and invalid `to` bounds
//! - **StateError**: loading global/local applied-state snapshots
//! - **ProjectError**: loading and validating the project config
//!
//! ## Using in Functions
//!
//! ```rust
//! use migrat::errors::{PlanError, PlanResult};
//! use migrat::MigrationId;
//!
//! fn require(id: &str, known: &[&str]) -> PlanResult<()> {
//!     if !known.contains(&id) {
//!         return Err(PlanError::BoundNotFound(MigrationId::from(id)));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require("1-a.js", &["1-a.js"]).is_ok());
//! assert!(require("2-b.js", &["1-a.js"]).is_err());
//! ```

pub mod plan;
pub mod project;
pub mod state;

pub use plan::PlanError;
pub use project::ProjectError;
pub use state::StateError;

/// Result type alias for planning operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Result type alias for state snapshot operations
pub type StateResult<T> = Result<T, StateError>;

/// Result type alias for project config operations
pub type ProjectResult<T> = Result<T, ProjectError>;
