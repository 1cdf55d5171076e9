//! Database construction options.
//!
//! # Invariants
//! - Sheet dimensions are non-zero.
//! - Defaults reproduce the 3x3 sheet shape.

use crate::model::sheet::{DEFAULT_COLS, DEFAULT_ROWS};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Shape applied to every sheet created by one database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseConfig {
    rows: usize,
    cols: usize,
}

impl DatabaseConfig {
    /// Builds a config with an explicit default sheet shape.
    ///
    /// # Errors
    /// - Returns `ConfigError::EmptyShape` when either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self, ConfigError> {
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyShape { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyShape { rows: usize, cols: usize },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyShape { rows, cols } => write!(
                f,
                "sheet shape must be at least 1x1, got {rows}x{cols}"
            ),
        }
    }
}

impl Error for ConfigError {}
