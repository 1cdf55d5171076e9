//! Permission policy dispatched on `PermissionRecord`.
//!
//! # Responsibility
//! - Implement the four sheet operations for both permission states.
//! - Keep transitions as whole-record replacement in the permission table.
//!
//! # Invariants
//! - `create` is not gated by the caller's record and always grants
//!   `Editable { is_owner: true }` to the creator.
//! - `patch` from `ReadOnly` never reaches the sheet table.
//! - `reshare` writes the grantee record with the acting record's owner flag,
//!   so owners propagate ownership even when granting read-only access.

use crate::error::{SheetError, SheetResult};
use crate::model::permission::{PermissionRecord, PermissionState};
use crate::model::sheet::Sheet;
use crate::repo::memory_tables::MemoryTables;

impl PermissionRecord {
    /// Creates `sheet_id` and makes `username` its owner.
    ///
    /// # Errors
    /// - `SheetAlreadyExists` when the id is taken; no table changes.
    pub fn create<'t>(
        &self,
        tables: &'t mut MemoryTables,
        username: &str,
        sheet_id: &str,
    ) -> SheetResult<&'t Sheet> {
        tables.insert_sheet(sheet_id)?;
        tables.set_permission(username, sheet_id, PermissionRecord::owner());
        tables.sheet(sheet_id)
    }

    /// Resolves `sheet_id` regardless of permission state.
    pub fn get<'t>(&self, tables: &'t MemoryTables, sheet_id: &str) -> SheetResult<&'t Sheet> {
        tables.sheet(sheet_id)
    }

    /// Writes one cell when this record allows editing.
    ///
    /// # Errors
    /// - `ReadOnly` for read-only records, checked before sheet existence.
    /// - `SheetNotFound` when the sheet does not exist.
    /// - `OutOfBounds` when `row`/`col` fall outside the grid; the grid is
    ///   unchanged.
    pub fn patch<'t>(
        &self,
        tables: &'t mut MemoryTables,
        sheet_id: &str,
        row: usize,
        col: usize,
        value: f64,
    ) -> SheetResult<&'t Sheet> {
        match self.state {
            PermissionState::ReadOnly => Err(SheetError::ReadOnly(sheet_id.to_string())),
            PermissionState::Editable => {
                let sheet = tables.sheet_mut(sheet_id)?;
                if !sheet.patch(row, col, value) {
                    return Err(SheetError::OutOfBounds {
                        sheet_id: sheet_id.to_string(),
                        row,
                        col,
                    });
                }
                Ok(&*sheet)
            }
        }
    }

    /// Replaces `target`'s record on `sheet_id` with `requested`.
    ///
    /// Returns the record written for `target`.
    ///
    /// # Errors
    /// - `NotOwner` when this record lacks the owner flag; no table changes.
    pub fn reshare(
        &self,
        tables: &mut MemoryTables,
        target: &str,
        sheet_id: &str,
        requested: PermissionState,
    ) -> SheetResult<PermissionRecord> {
        if !self.is_owner {
            return Err(SheetError::NotOwner {
                sheet_id: sheet_id.to_string(),
                requested,
            });
        }

        let granted = match requested {
            PermissionState::ReadOnly => PermissionRecord::read_only(self.is_owner),
            PermissionState::Editable => PermissionRecord::editable(self.is_owner),
        };
        tables.set_permission(target, sheet_id, granted);
        Ok(granted)
    }
}
