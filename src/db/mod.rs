//! Database module: row models and SQL repositories.
//!
//! - `model`: rows as they come out of SQLite, plus conversions into domain types.
//! - `repo`: SQL-only functions used by the directory and the job queue.
//!
//! Callers import from `platform_sync::db`; the repository API is re-exported here.

pub mod model;
pub mod repo;

pub use repo::*;

pub use model::{IntegrationRow, PendingJobCount};
