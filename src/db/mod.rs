//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `patch.rs`: insert / partial-update payloads
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;

mod patch_impl;

pub use models::{DbComparisonAnalysis, DbComparisonGroup, DbRelatedSoftware, DbSoftware};
pub use patch::{SoftwareCreate, SoftwarePatch};
pub use schema::SQLITE_INIT;

pub use actor::{DbActorHandle, spawn};
