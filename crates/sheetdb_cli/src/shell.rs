//! Interactive command shell over one `Database`.
//!
//! # Responsibility
//! - Split input lines with `shell_words` and parse them into typed commands.
//! - Route commands into the core and print user-facing outcomes.
//!
//! # Invariants
//! - Parse failures are printed to the error stream; the loop continues.
//! - A rejected `patch` expression never reaches the database.
//! - The shell never parses sheet contents; the core renders them.

use crate::expr::evaluate;
use clap::{CommandFactory, Parser, Subcommand};
use log::{debug, info};
use sheetdb_core::{Database, PermissionRecord, PermissionState, SheetError, SheetResult};
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};

/// One input line.
#[derive(Debug, Parser)]
#[command(multicall = true, disable_help_subcommand = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    /// Create a new user
    User { username: String },
    /// Create a new sheet
    Sheet { username: String, sheet_id: String },
    /// Check a sheet
    Check { username: String, sheet_id: String },
    /// Patch a sheet
    Patch {
        username: String,
        sheet_id: String,
        #[arg(allow_negative_numbers = true, value_parser = parse_cell_index)]
        row: CellIndex,
        #[arg(allow_negative_numbers = true, value_parser = parse_cell_index)]
        col: CellIndex,
        #[arg(allow_hyphen_values = true)]
        expr: String,
    },
    /// Change permissions
    Chmod {
        username: String,
        sheet_id: String,
        state: String,
    },
    /// Share a sheet to another user
    Share {
        username: String,
        sheet_id: String,
        other: String,
    },
    /// Show available commands
    Help,
}

/// Line-oriented front end for a database.
pub struct Shell {
    db: Database,
}

impl Shell {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Reads commands until end of input, printing `prompt` before each line.
    pub fn run(
        &self,
        input: impl BufRead,
        out: &mut impl Write,
        err: &mut impl Write,
        prompt: &str,
    ) -> io::Result<()> {
        info!("event=shell_start module=cli status=ok");
        let mut lines = input.lines();
        loop {
            write!(out, "{prompt}")?;
            out.flush()?;
            let Some(line) = lines.next() else {
                break;
            };
            self.execute_line(&line?, out, err)?;
        }
        writeln!(out)?;
        info!("event=shell_stop module=cli status=ok");
        Ok(())
    }

    /// Executes one input line.
    pub fn execute_line(
        &self,
        line: &str,
        out: &mut impl Write,
        err: &mut impl Write,
    ) -> io::Result<()> {
        let words = match shell_words::split(line) {
            Ok(words) => words,
            Err(split_error) => {
                return writeln!(err, "cannot split command line: {split_error}");
            }
        };
        if words.is_empty() {
            return Ok(());
        }

        match ShellLine::try_parse_from(&words) {
            Ok(parsed) => {
                debug!("event=shell_command module=cli status=ok command={}", words[0]);
                self.dispatch(parsed.command, out)
            }
            Err(parse_error) => write!(err, "{}", parse_error.render()),
        }
    }

    fn dispatch(&self, command: ShellCommand, out: &mut impl Write) -> io::Result<()> {
        match command {
            ShellCommand::User { username } => match self.db.register_user(&username) {
                Ok(user) => writeln!(out, "user {} created", user.name),
                Err(error) => writeln!(out, "{error}"),
            },
            ShellCommand::Sheet { username, sheet_id } => {
                match self.db.create_sheet(&username, &sheet_id) {
                    Ok(sheet) => {
                        writeln!(out, "sheet '{}' created", sheet.id)?;
                        writeln!(
                            out,
                            "sheet '{}' permission changed to {}",
                            sheet.id,
                            PermissionState::Editable
                        )
                    }
                    Err(error) => writeln!(out, "{error}"),
                }
            }
            ShellCommand::Check { username, sheet_id } => {
                match self.db.read_sheet(&username, &sheet_id) {
                    Ok(sheet) => {
                        writeln!(out, "sheet '{}' retrieved", sheet.id)?;
                        writeln!(out, "{sheet}")
                    }
                    Err(error) => writeln!(out, "{error}"),
                }
            }
            ShellCommand::Patch {
                username,
                sheet_id,
                row,
                col,
                expr,
            } => {
                let evaluation = match evaluate(&expr) {
                    Ok(evaluation) => evaluation,
                    Err(error) => return writeln!(out, "{error}"),
                };
                writeln!(out, "{}", evaluation.message())?;

                let result = self.db.patch_sheet(
                    &username,
                    &sheet_id,
                    row.index,
                    col.index,
                    evaluation.value.as_f64(),
                );
                match result {
                    Ok(sheet) => writeln!(out, "sheet '{}' updated", sheet.id),
                    // Report the indices as typed, including negative ones.
                    Err(SheetError::OutOfBounds { .. }) => {
                        writeln!(out, "invalid row {row} or col {col}")
                    }
                    Err(error) => writeln!(out, "{error}"),
                }
            }
            ShellCommand::Chmod {
                username,
                sheet_id,
                state,
            } => {
                let result = state
                    .parse::<PermissionState>()
                    .and_then(|state| self.db.set_own_permission(&username, &sheet_id, state));
                self.report_permission_change(&sheet_id, result, out)
            }
            ShellCommand::Share {
                username,
                sheet_id,
                other,
            } => {
                let result = self.db.share(&username, &sheet_id, &other);
                self.report_permission_change(&sheet_id, result, out)
            }
            ShellCommand::Help => {
                let command = ShellLine::command();
                for sub in command.get_subcommands() {
                    let about = sub.get_about().map(|about| about.to_string());
                    writeln!(
                        out,
                        "  {:<8}{}",
                        sub.get_name(),
                        about.unwrap_or_default()
                    )?;
                }
                Ok(())
            }
        }
    }

    fn report_permission_change(
        &self,
        sheet_id: &str,
        result: SheetResult<PermissionRecord>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        match result {
            Ok(record) => writeln!(
                out,
                "sheet '{sheet_id}' permission changed to {}",
                record.state
            ),
            Err(error) => writeln!(out, "{error}"),
        }
    }
}

/// Cell coordinate as typed, plus the index it addresses.
///
/// Negative or oversized values saturate to `usize::MAX`, which no sheet can
/// address.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CellIndex {
    index: usize,
    text: String,
}

impl Display for CellIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

fn parse_cell_index(value: &str) -> Result<CellIndex, String> {
    let trimmed = value.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(format!("`{value}` is not an integer"));
    }

    let magnitude = match digits.trim_start_matches('0') {
        "" => "0",
        rest => rest,
    };
    if negative && magnitude != "0" {
        return Ok(CellIndex {
            index: usize::MAX,
            text: format!("-{magnitude}"),
        });
    }
    Ok(CellIndex {
        index: magnitude.parse().unwrap_or(usize::MAX),
        text: magnitude.to_string(),
    })
}
