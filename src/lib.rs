//! Platform sync job dispatch.
//!
//! For every supported advertising/social platform, enumerate the active
//! integrations of one tenant (or all tenants) and queue one background sync
//! job per integration, collecting a per-platform run report and an overall
//! summary.

pub mod config;
pub mod db;
pub mod directory;
pub mod dispatcher;
pub mod jobs;
pub mod model;
pub mod orchestrator;
pub mod output;
pub mod report;
