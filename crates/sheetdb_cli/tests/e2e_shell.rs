//! End-to-end tests for the `sheetdb` binary.
//!
//! Commands are fed through stdin; outcomes are asserted on stdout and
//! parse failures on stderr.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

fn sheetdb_cmd() -> assert_cmd::Command {
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("sheetdb");
    cmd.timeout(TIMEOUT);
    cmd
}

#[test]
fn empty_stdin_exits_gracefully() {
    sheetdb_cmd().write_stdin("").assert().success().stdout(contains("> "));
}

#[test]
fn owner_shares_and_grantee_edits() {
    let script = "\
user alice
user bob
sheet alice s1
patch alice s1 0 0 42
share alice s1 bob
patch bob s1 1 1 \"15 / 2\"
check bob s1
";
    sheetdb_cmd()
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("user alice created"))
        .stdout(contains("user bob created"))
        .stdout(contains("sheet 's1' created"))
        .stdout(contains("Ultimate Question"))
        .stdout(contains("expression (=7.5) is an arithmetic operation"))
        .stdout(contains("sheet 's1' retrieved"))
        .stdout(contains(
            "   42     0     0\n    0   7.5     0\n    0     0     0",
        ));
}

#[test]
fn rejected_expressions_leave_sheet_untouched() {
    let script = "\
user alice
sheet alice s1
patch alice s1 0 0 1/0
patch alice s1 0 0 __import__('os')
patch alice s1 0 0 '1 +'
check alice s1
";
    sheetdb_cmd()
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("division by zero"))
        .stdout(contains("invalid expression"))
        .stdout(contains("invalid syntax"))
        .stdout(contains("sheet 's1' updated").not())
        .stdout(contains("    0     0     0\n    0     0     0\n    0     0     0"));
}

#[test]
fn unknown_users_change_nothing() {
    let script = "\
user alice
sheet ghost s1
sheet alice s1
share alice s1 ghost
";
    sheetdb_cmd()
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("user ghost does not exist"))
        .stdout(contains("sheet 's1' created"));
}

#[test]
fn read_only_owner_can_restore_editing() {
    let script = "\
user alice
sheet alice s1
chmod alice s1 readonly
patch alice s1 0 0 1
chmod alice s1 editable
patch alice s1 0 0 1
";
    sheetdb_cmd()
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("sheet 's1' permission changed to READONLY"))
        .stdout(contains("sheet 's1' is read-only"))
        .stdout(contains("sheet 's1' updated"));
}

#[test]
fn configured_shape_applies_to_new_sheets() {
    sheetdb_cmd()
        .args(["--rows", "2", "--cols", "4"])
        .write_stdin("user alice\nsheet alice s1\ncheck alice s1\npatch alice s1 2 0 1\n")
        .assert()
        .success()
        .stdout(contains("    0     0     0     0\n    0     0     0     0\n"))
        .stdout(contains("invalid row 2 or col 0"));
}

#[test]
fn zero_shape_is_rejected_at_startup() {
    sheetdb_cmd()
        .args(["--rows", "0"])
        .write_stdin("")
        .assert()
        .code(2);
}

#[test]
fn malformed_commands_report_on_stderr() {
    sheetdb_cmd()
        .write_stdin("frobnicate\npatch alice s1\n")
        .assert()
        .success()
        .stderr(contains("frobnicate"))
        .stderr(contains("required"));
}

#[test]
fn oversized_cell_index_reports_out_of_bounds() {
    sheetdb_cmd()
        .write_stdin("user alice\nsheet alice s1\npatch alice s1 99999999999999999999 0 1\n")
        .assert()
        .success()
        .stdout(contains("invalid row 99999999999999999999 or col 0"))
        .stderr(contains("invalid value").not());
}
