//! Per-(user, sheet) permission records.
//!
//! # Responsibility
//! - Define the closed permission state set and the owner flag.
//! - Provide the composite key used by the permission table.
//!
//! # Invariants
//! - The default record is `ReadOnly { is_owner: false }`.
//! - Records are replaced wholesale on transition, never edited in place.

use crate::error::SheetError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Access state of one user on one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Cell writes are rejected.
    ReadOnly,
    /// Cell writes are allowed.
    Editable,
}

impl PermissionState {
    /// Stable lowercase id accepted by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "readonly",
            Self::Editable => "editable",
        }
    }
}

/// Upper-case name used in diagnostics (`READONLY` / `EDITABLE`).
impl Display for PermissionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadOnly => f.write_str("READONLY"),
            Self::Editable => f.write_str("EDITABLE"),
        }
    }
}

impl FromStr for PermissionState {
    type Err = SheetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "readonly" => Ok(Self::ReadOnly),
            "editable" => Ok(Self::Editable),
            _ => Err(SheetError::InvalidState(value.to_string())),
        }
    }
}

/// Permission state plus ownership flag for one (user, sheet) pair.
///
/// The owner flag grants authority to reshare; it is independent of whether
/// the holder may edit cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub state: PermissionState,
    pub is_owner: bool,
}

impl PermissionRecord {
    pub fn new(state: PermissionState, is_owner: bool) -> Self {
        Self { state, is_owner }
    }

    pub fn read_only(is_owner: bool) -> Self {
        Self::new(PermissionState::ReadOnly, is_owner)
    }

    pub fn editable(is_owner: bool) -> Self {
        Self::new(PermissionState::Editable, is_owner)
    }

    /// Record granted to the creator of a sheet.
    pub fn owner() -> Self {
        Self::editable(true)
    }
}

impl Default for PermissionRecord {
    fn default() -> Self {
        Self::read_only(false)
    }
}

/// Composite permission table key. Names and ids may contain any character.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
    pub username: String,
    pub sheet_id: String,
}

impl PermissionKey {
    pub fn new(username: impl Into<String>, sheet_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            sheet_id: sheet_id.into(),
        }
    }
}
