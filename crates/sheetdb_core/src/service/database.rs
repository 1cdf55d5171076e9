//! Sheet database service.
//!
//! # Responsibility
//! - Resolve principals, fetch their permission record and route each
//!   operation to the permission policy.
//! - Serialize all table access behind one lock.
//!
//! # Invariants
//! - Every operation runs under a single lock acquisition, so create is an
//!   atomic test-and-set and reshare reads the acting owner flag and writes
//!   the target record as one unit.
//! - An unresolved principal fails with `UserNotFound` before any table is
//!   touched; no permission record is created on that path.
//! - Reshare gating uses the acting principal's record, never the target's.

use crate::config::DatabaseConfig;
use crate::error::{SheetError, SheetResult};
use crate::model::permission::{PermissionRecord, PermissionState};
use crate::model::sheet::Sheet;
use crate::model::user::User;
use crate::repo::memory_tables::{MemoryTables, TableCounts};
use log::{debug, info, warn};
use parking_lot::Mutex;

/// In-memory, access-controlled sheet store.
///
/// The type is `Send + Sync`; one internal mutex guards users, sheets and
/// permission records together. Returned sheets are snapshots taken while
/// the lock was held.
#[derive(Debug, Default)]
pub struct Database {
    tables: Mutex<MemoryTables>,
}

impl Database {
    /// Creates an empty database with the default 3x3 sheet shape.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DatabaseConfig) -> Self {
        Self {
            tables: Mutex::new(MemoryTables::new(config)),
        }
    }

    pub fn config(&self) -> DatabaseConfig {
        self.tables.lock().config()
    }

    /// Registers a new user.
    ///
    /// # Errors
    /// - `UserAlreadyExists` when `name` is registered; the existing user is
    ///   unchanged.
    pub fn register_user(&self, name: &str) -> SheetResult<User> {
        let result = self.tables.lock().insert_user(name);
        log_outcome("user_register", &format!("user={name}"), &result);
        result
    }

    /// Looks up a registered user.
    pub fn get_user(&self, name: &str) -> SheetResult<User> {
        let tables = self.tables.lock();
        resolve_user(&tables, name)
    }

    /// Creates `sheet_id` owned by `username`.
    ///
    /// # Errors
    /// - `UserNotFound` when `username` is not registered.
    /// - `SheetAlreadyExists` when the id was created before, by anyone.
    pub fn create_sheet(&self, username: &str, sheet_id: &str) -> SheetResult<Sheet> {
        let result = {
            let mut tables = self.tables.lock();
            resolve_user(&tables, username).and_then(|user| {
                let record = tables.permission_or_default(&user.name, sheet_id);
                record
                    .create(&mut tables, &user.name, sheet_id)
                    .map(Sheet::clone)
            })
        };
        log_outcome(
            "sheet_create",
            &format!("user={username} sheet_id={sheet_id}"),
            &result,
        );
        result
    }

    /// Reads `sheet_id` on behalf of `username`.
    ///
    /// Reads are not gated by the permission state: any resolved user can
    /// read any existing sheet.
    pub fn read_sheet(&self, username: &str, sheet_id: &str) -> SheetResult<Sheet> {
        let result = {
            let mut tables = self.tables.lock();
            resolve_user(&tables, username).and_then(|user| {
                let record = tables.permission_or_default(&user.name, sheet_id);
                record.get(&tables, sheet_id).map(Sheet::clone)
            })
        };
        log_outcome(
            "sheet_read",
            &format!("user={username} sheet_id={sheet_id}"),
            &result,
        );
        result
    }

    /// Writes `value` into one cell of `sheet_id`.
    ///
    /// # Errors
    /// - `UserNotFound` when `username` is not registered.
    /// - `ReadOnly` when the user's record is read-only.
    /// - `SheetNotFound` / `OutOfBounds` from an editable record.
    pub fn patch_sheet(
        &self,
        username: &str,
        sheet_id: &str,
        row: usize,
        col: usize,
        value: f64,
    ) -> SheetResult<Sheet> {
        let result = {
            let mut tables = self.tables.lock();
            resolve_user(&tables, username).and_then(|user| {
                let record = tables.permission_or_default(&user.name, sheet_id);
                record
                    .patch(&mut tables, sheet_id, row, col, value)
                    .map(Sheet::clone)
            })
        };
        log_outcome(
            "sheet_patch",
            &format!("user={username} sheet_id={sheet_id} row={row} col={col}"),
            &result,
        );
        result
    }

    /// Sets `target`'s permission on `sheet_id` on behalf of `acting`.
    ///
    /// The grantee inherits the acting record's owner flag. Both users must
    /// resolve before anything else happens.
    ///
    /// # Errors
    /// - `UserNotFound` when either user is not registered.
    /// - `NotOwner` when the acting record lacks the owner flag.
    pub fn reshare(
        &self,
        acting: &str,
        target: &str,
        sheet_id: &str,
        state: PermissionState,
    ) -> SheetResult<PermissionRecord> {
        let result = {
            let mut tables = self.tables.lock();
            resolve_user(&tables, acting).and_then(|acting_user| {
                let target_user = resolve_user(&tables, target)?;
                let record = tables.permission_or_default(&acting_user.name, sheet_id);
                record.reshare(&mut tables, &target_user.name, sheet_id, state)
            })
        };
        log_outcome(
            "permission_change",
            &format!(
                "acting={acting} target={target} sheet_id={sheet_id} state={}",
                state.as_str()
            ),
            &result,
        );
        result
    }

    /// Changes the caller's own permission on `sheet_id`.
    pub fn set_own_permission(
        &self,
        username: &str,
        sheet_id: &str,
        state: PermissionState,
    ) -> SheetResult<PermissionRecord> {
        self.reshare(username, username, sheet_id, state)
    }

    /// Grants `other` editable access to `sheet_id`.
    pub fn share(
        &self,
        username: &str,
        sheet_id: &str,
        other: &str,
    ) -> SheetResult<PermissionRecord> {
        self.reshare(username, other, sheet_id, PermissionState::Editable)
    }

    /// Returns the effective permission of `username` on `sheet_id`.
    ///
    /// Does not materialize a default record.
    pub fn permission(&self, username: &str, sheet_id: &str) -> PermissionRecord {
        self.tables.lock().peek_permission(username, sheet_id)
    }

    pub fn counts(&self) -> TableCounts {
        self.tables.lock().counts()
    }
}

fn resolve_user(tables: &MemoryTables, name: &str) -> SheetResult<User> {
    let result = tables.get_user(name);
    match &result {
        Ok(_) => debug!("event=user_get module=service status=ok user={name}"),
        Err(err) => warn!(
            "event=user_get module=service status=error error_code={} user={name}",
            err.code()
        ),
    }
    result
}

fn log_outcome<T>(event: &str, fields: &str, result: &Result<T, SheetError>) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok {fields}"),
        Err(err) => warn!(
            "event={event} module=service status=error error_code={} {fields}",
            err.code()
        ),
    }
}
