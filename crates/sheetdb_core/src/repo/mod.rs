//! In-memory storage tables.
//!
//! # Responsibility
//! - Own the user, sheet and permission maps behind one value.
//! - Keep lookup-or-default semantics for permissions in one place.
//!
//! # Invariants
//! - Nothing is ever removed from any table.
//! - Tables carry no locking; callers hold the database lock.

pub mod memory_tables;
