//! Sheet domain model.
//!
//! # Responsibility
//! - Own the fixed-shape numeric grid behind one sheet id.
//! - Render the grid as aligned text for shell output.
//!
//! # Invariants
//! - Shape is fixed at construction; only single-cell writes mutate a sheet.
//! - Out-of-bounds writes leave the grid untouched.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Default row count for newly created sheets.
pub const DEFAULT_ROWS: usize = 3;
/// Default column count for newly created sheets.
pub const DEFAULT_COLS: usize = 3;

const CELL_PRECISION: usize = 3;
const CELL_WIDTH: usize = 5;

/// Numeric grid identified by a globally unique sheet id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: String,
    pub data: Vec<Vec<f64>>,
}

impl Sheet {
    /// Creates a zero-filled sheet with the default 3x3 shape.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_shape(id, DEFAULT_ROWS, DEFAULT_COLS)
    }

    /// Creates a zero-filled sheet with an explicit shape.
    pub fn with_shape(id: impl Into<String>, rows: usize, cols: usize) -> Self {
        Self {
            id: id.into(),
            data: vec![vec![0.0; cols]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.data.len()
    }

    pub fn cols(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|cells| cells.get(col)).copied()
    }

    /// Writes one cell in place.
    ///
    /// Returns `false` without touching the grid when `row`/`col` fall outside
    /// the sheet shape.
    pub fn patch(&mut self, row: usize, col: usize, value: f64) -> bool {
        if row >= self.rows() || col >= self.cols() {
            return false;
        }
        self.data[row][col] = value;
        true
    }
}

impl Display for Sheet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, row) in self.data.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let line = row
                .iter()
                .map(|value| format_general(*value, CELL_PRECISION, CELL_WIDTH))
                .collect::<Vec<_>>()
                .join(" ");
            f.write_str(&line)?;
        }
        Ok(())
    }
}

/// Formats a float using general (`g`) notation, right-aligned to `width`.
///
/// Rules:
/// - `precision` significant digits (at least 1).
/// - Fixed notation when the rounded decimal exponent is in `-4..precision`,
///   scientific (`1.23e+03`) otherwise.
/// - Trailing zeros and a dangling decimal point are removed.
/// - Non-finite values render as `inf`, `-inf` or `nan`.
pub fn format_general(value: f64, precision: usize, width: usize) -> String {
    let body = general_body(value, precision.max(1));
    format!("{body:>width$}")
}

fn general_body(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf" } else { "inf" }.to_string();
    }

    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..precision as i32).contains(&exponent) {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        return strip_fraction_zeros(&format!("{value:.decimals$}"));
    }

    let sign = if exponent < 0 { '-' } else { '+' };
    format!(
        "{}e{sign}{:02}",
        strip_fraction_zeros(mantissa),
        exponent.unsigned_abs()
    )
}

fn strip_fraction_zeros(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
