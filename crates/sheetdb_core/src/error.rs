//! Error taxonomy shared by tables, policy and database service.
//!
//! # Invariants
//! - Every variant is an expected, recoverable outcome; none is fatal.
//! - A failed operation leaves users, sheets and permissions unchanged.

use crate::model::permission::PermissionState;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SheetResult<T> = Result<T, SheetError>;

/// Outcome of a rejected database operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// `register` called with a username that is already taken.
    UserAlreadyExists(String),
    /// Principal could not be resolved; the operation was a no-op.
    UserNotFound(String),
    /// `create` called with a sheet id that has been consumed.
    SheetAlreadyExists(String),
    SheetNotFound(String),
    /// Read-only record rejected a cell write.
    ReadOnly(String),
    OutOfBounds {
        sheet_id: String,
        row: usize,
        col: usize,
    },
    /// Acting record does not carry the owner flag.
    NotOwner {
        sheet_id: String,
        requested: PermissionState,
    },
    /// Requested permission state is not one of `readonly|editable`.
    InvalidState(String),
}

impl SheetError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserAlreadyExists(_) => "user_already_exists",
            Self::UserNotFound(_) => "user_not_found",
            Self::SheetAlreadyExists(_) => "sheet_already_exists",
            Self::SheetNotFound(_) => "sheet_not_found",
            Self::ReadOnly(_) => "denied",
            Self::OutOfBounds { .. } => "out_of_bounds",
            Self::NotOwner { .. } => "not_owner",
            Self::InvalidState(_) => "invalid_state",
        }
    }
}

impl Display for SheetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UserAlreadyExists(name) => write!(f, "user {name} already exists"),
            Self::UserNotFound(name) => write!(f, "user {name} does not exist"),
            Self::SheetAlreadyExists(id) => write!(f, "sheet '{id}' already exists"),
            Self::SheetNotFound(id) => write!(f, "sheet '{id}' does not exist"),
            Self::ReadOnly(id) => write!(f, "sheet '{id}' is read-only"),
            Self::OutOfBounds { row, col, .. } => write!(f, "invalid row {row} or col {col}"),
            Self::NotOwner {
                sheet_id,
                requested,
            } => write!(
                f,
                "sheet '{sheet_id}' denies permission change to {requested}"
            ),
            Self::InvalidState(value) => write!(
                f,
                "invalid permission state `{value}`; expected readonly|editable"
            ),
        }
    }
}

impl Error for SheetError {}
