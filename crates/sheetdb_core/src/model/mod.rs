//! Domain model for users, sheets and per-sheet permissions.
//!
//! # Responsibility
//! - Define the canonical records owned by the in-memory tables.
//! - Keep rendering rules for sheets next to the sheet shape.
//!
//! # Invariants
//! - Users and sheets are keyed by their name/id; neither is ever removed.
//! - A missing permission record means `ReadOnly { is_owner: false }`.

pub mod permission;
pub mod sheet;
pub mod user;
