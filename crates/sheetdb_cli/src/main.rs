//! Interactive sheet database shell.
//!
//! # Responsibility
//! - Parse process flags into a `DatabaseConfig` and optional file logging.
//! - Run the command shell over stdin/stdout until end of input.

mod expr;
mod shell;

use clap::Parser;
use log::{error, info};
use sheetdb_core::{default_log_level, init_logging, Database, DatabaseConfig};
use shell::Shell;
use std::io;
use std::process::ExitCode;

const PROMPT: &str = "> ";

#[derive(Debug, Parser)]
#[command(name = "sheetdb", version, about = "Access-controlled in-memory sheet database")]
struct Cli {
    /// Row count of newly created sheets.
    #[arg(long, default_value_t = sheetdb_core::DEFAULT_ROWS)]
    rows: usize,
    /// Column count of newly created sheets.
    #[arg(long, default_value_t = sheetdb_core::DEFAULT_COLS)]
    cols: usize,
    /// Log level used when file logging is enabled.
    #[arg(long, default_value_t = default_log_level().to_string())]
    log_level: String,
    /// Absolute directory for rotated log files; logging is off without it.
    #[arg(long)]
    log_dir: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config = match DatabaseConfig::new(cli.rows, cli.cols) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    info!(
        "event=cli_start module=cli status=ok rows={} cols={} version={}",
        config.rows(),
        config.cols(),
        sheetdb_core::core_version()
    );

    let shell = Shell::new(Database::with_config(config));
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    match shell.run(stdin.lock(), &mut stdout, &mut stderr, PROMPT) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_stop module=cli status=error error={err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
