//! Use-case services exposed to shells and embedders.
//!
//! # Responsibility
//! - Route public operations through the permission policy.
//! - Own the locking discipline over the in-memory tables.

pub mod database;
