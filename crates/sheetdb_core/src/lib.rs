//! Core domain logic for SheetDB.
//! This crate owns the permission state machine and every sheet invariant;
//! shells and expression evaluators live outside it.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DatabaseConfig};
pub use error::{SheetError, SheetResult};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings};
pub use model::permission::{PermissionKey, PermissionRecord, PermissionState};
pub use model::sheet::{format_general, Sheet, DEFAULT_COLS, DEFAULT_ROWS};
pub use model::user::User;
pub use repo::memory_tables::{MemoryTables, TableCounts};
pub use service::database::Database;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
