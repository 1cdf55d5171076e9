//! Map-backed tables for users, sheets and permission records.
//!
//! # Responsibility
//! - Provide keyed access to the three tables used by the permission policy.
//! - Materialize default permission records lazily on first lookup.
//!
//! # Invariants
//! - Usernames and sheet ids are unique keys; inserts never overwrite.
//! - `permission_or_default` never fails; a miss stores and returns
//!   `ReadOnly { is_owner: false }`.

use crate::config::DatabaseConfig;
use crate::error::{SheetError, SheetResult};
use crate::model::permission::{PermissionKey, PermissionRecord};
use crate::model::sheet::Sheet;
use crate::model::user::User;
use std::collections::BTreeMap;

/// Row counts of every table, used for inspection and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub users: usize,
    pub sheets: usize,
    pub permissions: usize,
}

/// Users, sheets and permission records owned by one database.
#[derive(Debug, Default)]
pub struct MemoryTables {
    config: DatabaseConfig,
    users: BTreeMap<String, User>,
    sheets: BTreeMap<String, Sheet>,
    permissions: BTreeMap<PermissionKey, PermissionRecord>,
}

impl MemoryTables {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> DatabaseConfig {
        self.config
    }

    /// Registers one user.
    ///
    /// # Errors
    /// - `UserAlreadyExists` when the name is taken; the stored user is kept.
    pub fn insert_user(&mut self, name: &str) -> SheetResult<User> {
        if self.users.contains_key(name) {
            return Err(SheetError::UserAlreadyExists(name.to_string()));
        }
        let user = User::new(name);
        self.users.insert(name.to_string(), user.clone());
        Ok(user)
    }

    pub fn get_user(&self, name: &str) -> SheetResult<User> {
        self.users
            .get(name)
            .cloned()
            .ok_or_else(|| SheetError::UserNotFound(name.to_string()))
    }

    pub fn contains_sheet(&self, sheet_id: &str) -> bool {
        self.sheets.contains_key(sheet_id)
    }

    /// Inserts a zero-filled sheet with the configured shape.
    ///
    /// # Errors
    /// - `SheetAlreadyExists` when the id has been consumed before.
    pub fn insert_sheet(&mut self, sheet_id: &str) -> SheetResult<()> {
        if self.contains_sheet(sheet_id) {
            return Err(SheetError::SheetAlreadyExists(sheet_id.to_string()));
        }
        let sheet = Sheet::with_shape(sheet_id, self.config.rows(), self.config.cols());
        self.sheets.insert(sheet_id.to_string(), sheet);
        Ok(())
    }

    pub fn sheet(&self, sheet_id: &str) -> SheetResult<&Sheet> {
        self.sheets
            .get(sheet_id)
            .ok_or_else(|| SheetError::SheetNotFound(sheet_id.to_string()))
    }

    pub fn sheet_mut(&mut self, sheet_id: &str) -> SheetResult<&mut Sheet> {
        self.sheets
            .get_mut(sheet_id)
            .ok_or_else(|| SheetError::SheetNotFound(sheet_id.to_string()))
    }

    /// Returns the record for `(username, sheet_id)`, storing the default on a
    /// miss.
    pub fn permission_or_default(&mut self, username: &str, sheet_id: &str) -> PermissionRecord {
        *self
            .permissions
            .entry(PermissionKey::new(username, sheet_id))
            .or_default()
    }

    /// Returns the effective record without materializing a default.
    pub fn peek_permission(&self, username: &str, sheet_id: &str) -> PermissionRecord {
        self.permissions
            .get(&PermissionKey::new(username, sheet_id))
            .copied()
            .unwrap_or_default()
    }

    /// Replaces the record for `(username, sheet_id)`.
    pub fn set_permission(&mut self, username: &str, sheet_id: &str, record: PermissionRecord) {
        self.permissions
            .insert(PermissionKey::new(username, sheet_id), record);
    }

    pub fn counts(&self) -> TableCounts {
        TableCounts {
            users: self.users.len(),
            sheets: self.sheets.len(),
            permissions: self.permissions.len(),
        }
    }
}
