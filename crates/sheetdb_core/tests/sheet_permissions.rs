use sheetdb_core::{
    Database, DatabaseConfig, PermissionRecord, PermissionState, Sheet, SheetError, TableCounts,
};

fn db_with_users(names: &[&str]) -> Database {
    let db = Database::new();
    for name in names {
        db.register_user(name).unwrap();
    }
    db
}

#[test]
fn create_returns_zero_grid_and_grants_ownership() {
    let db = db_with_users(&["alice"]);
    let sheet = db.create_sheet("alice", "s1").unwrap();

    assert_eq!(sheet, Sheet::new("s1"));
    assert_eq!((sheet.rows(), sheet.cols()), (3, 3));
    assert_eq!(db.permission("alice", "s1"), PermissionRecord::editable(true));
}

#[test]
fn second_create_fails_and_ownership_stays_with_first_creator() {
    let db = db_with_users(&["alice", "bob"]);
    db.create_sheet("alice", "s1").unwrap();

    let err = db.create_sheet("bob", "s1").unwrap_err();
    assert_eq!(err, SheetError::SheetAlreadyExists("s1".to_string()));
    assert_eq!(db.permission("alice", "s1"), PermissionRecord::owner());
    assert!(!db.permission("bob", "s1").is_owner);
    assert_eq!(db.counts().sheets, 1);
}

#[test]
fn sheet_ids_are_global_across_users() {
    let db = db_with_users(&["alice", "bob"]);
    db.create_sheet("alice", "shared-name").unwrap();
    assert!(matches!(
        db.create_sheet("alice", "shared-name"),
        Err(SheetError::SheetAlreadyExists(_))
    ));
    assert!(matches!(
        db.create_sheet("bob", "shared-name"),
        Err(SheetError::SheetAlreadyExists(_))
    ));
}

#[test]
fn reads_are_not_gated_by_permission_state() {
    let db = db_with_users(&["alice", "carol"]);
    db.create_sheet("alice", "s1").unwrap();
    db.patch_sheet("alice", "s1", 2, 1, 5.0).unwrap();

    assert_eq!(db.permission("carol", "s1"), PermissionRecord::default());
    let seen = db.read_sheet("carol", "s1").unwrap();
    assert_eq!(seen.cell(2, 1), Some(5.0));
}

#[test]
fn read_of_missing_sheet_fails_not_found() {
    let db = db_with_users(&["alice"]);
    let err = db.read_sheet("alice", "nope").unwrap_err();
    assert_eq!(err, SheetError::SheetNotFound("nope".to_string()));
}

#[test]
fn read_only_record_can_never_patch() {
    let db = db_with_users(&["alice", "bob"]);

    let err = db.patch_sheet("bob", "missing", 0, 0, 1.0).unwrap_err();
    assert_eq!(err, SheetError::ReadOnly("missing".to_string()));

    db.create_sheet("alice", "s1").unwrap();
    let err = db.patch_sheet("bob", "s1", 0, 0, 1.0).unwrap_err();
    assert_eq!(err, SheetError::ReadOnly("s1".to_string()));
    assert_eq!(db.read_sheet("alice", "s1").unwrap(), Sheet::new("s1"));
}

#[test]
fn owner_may_downgrade_own_access_and_then_cannot_patch() {
    let db = db_with_users(&["alice"]);
    db.create_sheet("alice", "s1").unwrap();

    let record = db
        .set_own_permission("alice", "s1", PermissionState::ReadOnly)
        .unwrap();
    assert_eq!(record, PermissionRecord::read_only(true));
    assert!(matches!(
        db.patch_sheet("alice", "s1", 0, 0, 1.0),
        Err(SheetError::ReadOnly(_))
    ));

    db.set_own_permission("alice", "s1", PermissionState::Editable)
        .unwrap();
    db.patch_sheet("alice", "s1", 0, 0, 1.0).unwrap();
}

#[test]
fn out_of_bounds_patch_leaves_grid_unchanged() {
    let db = db_with_users(&["alice"]);
    db.create_sheet("alice", "s1").unwrap();
    db.patch_sheet("alice", "s1", 1, 1, 3.5).unwrap();
    let before = db.read_sheet("alice", "s1").unwrap();

    let err = db.patch_sheet("alice", "s1", 5, 5, 1.0).unwrap_err();
    assert_eq!(
        err,
        SheetError::OutOfBounds {
            sheet_id: "s1".to_string(),
            row: 5,
            col: 5,
        }
    );
    assert_eq!(err.to_string(), "invalid row 5 or col 5");

    let after = db.read_sheet("alice", "s1").unwrap();
    assert_eq!(after, before);
    assert_eq!(after.to_string(), before.to_string());
}

#[test]
fn editable_record_is_scoped_to_its_sheet_id() {
    let db = db_with_users(&["alice", "bob"]);
    db.create_sheet("alice", "s1").unwrap();
    db.create_sheet("alice", "s2").unwrap();
    db.share("alice", "s1", "bob").unwrap();

    db.patch_sheet("bob", "s1", 0, 0, 1.0).unwrap();
    assert!(matches!(
        db.patch_sheet("bob", "s2", 0, 0, 1.0),
        Err(SheetError::ReadOnly(_))
    ));
}

#[test]
fn read_only_grant_from_owner_propagates_ownership() {
    let db = db_with_users(&["alice", "bob", "carol"]);
    db.create_sheet("alice", "s1").unwrap();

    let granted = db
        .reshare("alice", "bob", "s1", PermissionState::ReadOnly)
        .unwrap();
    assert_eq!(granted, PermissionRecord::read_only(true));

    // bob cannot edit, yet inherited the owner flag and may reshare further.
    assert!(matches!(
        db.patch_sheet("bob", "s1", 0, 0, 1.0),
        Err(SheetError::ReadOnly(_))
    ));
    let carol = db
        .reshare("bob", "carol", "s1", PermissionState::Editable)
        .unwrap();
    assert_eq!(carol, PermissionRecord::editable(true));
    db.patch_sheet("carol", "s1", 2, 2, 9.0).unwrap();
}

#[test]
fn non_owner_cannot_reshare() {
    let db = db_with_users(&["alice", "bob", "carol"]);
    db.create_sheet("alice", "s1").unwrap();
    db.reshare("alice", "carol", "s1", PermissionState::ReadOnly)
        .unwrap();

    let before = db.permission("carol", "s1");
    // bob's default record is `ReadOnly { is_owner: false }`.
    let err = db
        .reshare("bob", "carol", "s1", PermissionState::Editable)
        .unwrap_err();
    assert_eq!(
        err,
        SheetError::NotOwner {
            sheet_id: "s1".to_string(),
            requested: PermissionState::Editable,
        }
    );
    assert_eq!(
        err.to_string(),
        "sheet 's1' denies permission change to EDITABLE"
    );
    assert_eq!(db.permission("carol", "s1"), before);
}

#[test]
fn editable_non_owner_record_is_denied_reshare() {
    // Editable { is_owner: false } is not reachable through the public
    // surface alone, so build it through the tables directly.
    let mut tables = sheetdb_core::MemoryTables::default();
    tables.set_permission("bob", "s1", PermissionRecord::editable(false));
    tables.set_permission("carol", "s1", PermissionRecord::read_only(false));

    let acting = tables.permission_or_default("bob", "s1");
    let err = acting
        .reshare(&mut tables, "carol", "s1", PermissionState::Editable)
        .unwrap_err();
    assert!(matches!(err, SheetError::NotOwner { .. }));
    assert_eq!(
        tables.peek_permission("carol", "s1"),
        PermissionRecord::read_only(false)
    );
}

#[test]
fn reshare_gates_on_acting_record_not_target_record() {
    let db = db_with_users(&["alice", "bob"]);
    db.create_sheet("alice", "s1").unwrap();

    // target alice owns s1, but acting bob does not.
    assert!(matches!(
        db.reshare("bob", "alice", "s1", PermissionState::ReadOnly),
        Err(SheetError::NotOwner { .. })
    ));
    assert_eq!(db.permission("alice", "s1"), PermissionRecord::owner());
}

#[test]
fn ownership_is_scoped_per_sheet_id() {
    let db = db_with_users(&["alice", "bob"]);
    db.create_sheet("alice", "s1").unwrap();
    assert!(matches!(
        db.share("alice", "s2", "bob"),
        Err(SheetError::NotOwner { .. })
    ));
}

#[test]
fn unresolved_principal_is_a_no_op_everywhere() {
    let db = db_with_users(&["alice"]);
    db.create_sheet("alice", "s1").unwrap();
    let before = db.counts();

    assert_eq!(
        db.create_sheet("ghost", "s2").unwrap_err(),
        SheetError::UserNotFound("ghost".to_string())
    );
    assert!(matches!(
        db.read_sheet("ghost", "s1"),
        Err(SheetError::UserNotFound(_))
    ));
    assert!(matches!(
        db.patch_sheet("ghost", "s1", 0, 0, 1.0),
        Err(SheetError::UserNotFound(_))
    ));
    assert!(matches!(
        db.share("alice", "s1", "ghost"),
        Err(SheetError::UserNotFound(_))
    ));
    assert!(matches!(
        db.share("ghost", "s1", "alice"),
        Err(SheetError::UserNotFound(_))
    ));

    assert_eq!(db.counts(), before);
    assert_eq!(db.permission("alice", "s1"), PermissionRecord::owner());
}

#[test]
fn lookups_materialize_default_records_for_resolved_users() {
    let db = db_with_users(&["alice", "bob"]);
    db.create_sheet("alice", "s1").unwrap();
    assert_eq!(db.counts().permissions, 1);

    db.read_sheet("bob", "s1").unwrap();
    assert_eq!(
        db.counts(),
        TableCounts {
            users: 2,
            sheets: 1,
            permissions: 2,
        }
    );
    assert_eq!(db.permission("bob", "s1"), PermissionRecord::default());
}

#[test]
fn configured_shape_applies_to_new_sheets() {
    let db = Database::with_config(DatabaseConfig::new(2, 5).unwrap());
    db.register_user("alice").unwrap();
    let sheet = db.create_sheet("alice", "wide").unwrap();
    assert_eq!((sheet.rows(), sheet.cols()), (2, 5));
    assert!(db.patch_sheet("alice", "wide", 1, 4, 1.0).is_ok());
    assert!(matches!(
        db.patch_sheet("alice", "wide", 2, 0, 1.0),
        Err(SheetError::OutOfBounds { .. })
    ));
}

#[test]
fn end_to_end_share_scenario() {
    let db = Database::new();
    db.register_user("alice").unwrap();
    db.register_user("bob").unwrap();

    let created = db.create_sheet("alice", "s1").unwrap();
    assert!(created.data.iter().flatten().all(|value| *value == 0.0));
    assert_eq!(db.permission("alice", "s1"), PermissionRecord::owner());

    let patched = db.patch_sheet("alice", "s1", 0, 0, 42.0).unwrap();
    assert_eq!(patched.cell(0, 0), Some(42.0));
    assert_eq!(
        patched.to_string(),
        "   42     0     0\n    0     0     0\n    0     0     0"
    );

    db.share("alice", "s1", "bob").unwrap();
    assert_eq!(db.permission("bob", "s1"), PermissionRecord::editable(true));

    let by_bob = db.patch_sheet("bob", "s1", 1, 1, 7.5).unwrap();
    assert_eq!(
        by_bob.to_string(),
        "   42     0     0\n    0   7.5     0\n    0     0     0"
    );
}
