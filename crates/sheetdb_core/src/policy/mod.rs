//! Permission state machine.
//!
//! # Responsibility
//! - Decide, per permission record, what create/get/patch/reshare do.
//! - Touch only the tables handed in; never resolve users.
//!
//! # Invariants
//! - Reads are never gated by permission state, only by sheet existence.
//! - Cell writes require `Editable`.
//! - Resharing requires the owner flag and copies it onto the grantee.

pub mod permission_policy;
