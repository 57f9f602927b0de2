//! Row filtering, header resolution, and numeric coercion.

use crate::{ReaderError, ReaderResult, SheetSource};
use donation_sync_core::SheetRow;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Header name of the form-slug column.
pub const COL_FORM_NAME: &str = "form_name";
/// Header name of the dollars-raised column.
pub const COL_DOLLARS: &str = "dollars_raised";
/// Header name of the donation-count column.
pub const COL_COUNT: &str = "num_of_donations";

/// Reads qualifying donation rows for the current candidate keys.
pub trait RowReader: Send + Sync {
    /// Read all rows of `sheet_name` whose form slug is in `candidate_keys`
    /// and whose measures are not both zero.
    fn read_matching_rows(
        &self,
        sheet_name: &str,
        candidate_keys: &HashSet<String>,
    ) -> ReaderResult<Vec<SheetRow>>;
}

/// [`RowReader`] over any [`SheetSource`].
pub struct GridReader {
    source: Arc<dyn SheetSource>,
}

impl GridReader {
    /// Create a reader over the given sheet source.
    pub fn new(source: Arc<dyn SheetSource>) -> Self {
        Self { source }
    }
}

impl RowReader for GridReader {
    fn read_matching_rows(
        &self,
        sheet_name: &str,
        candidate_keys: &HashSet<String>,
    ) -> ReaderResult<Vec<SheetRow>> {
        let grid = self
            .source
            .read_grid(sheet_name)?
            .ok_or_else(|| ReaderError::SheetNotFound(sheet_name.to_string()))?;

        let Some((header, data)) = grid.split_first() else {
            debug!(sheet = sheet_name, "sheet is empty");
            return Ok(Vec::new());
        };

        let form_col = resolve_column(header, COL_FORM_NAME)?;
        let dollars_col = resolve_column(header, COL_DOLLARS)?;
        let count_col = resolve_column(header, COL_COUNT)?;

        // Single linear scan; membership is O(1) against the hash set even
        // for very large sheets.
        let mut rows = Vec::new();
        for cells in data {
            let Some(match_key) = cells
                .get(form_col)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|key| !key.is_empty())
            else {
                continue;
            };

            if !candidate_keys.contains(match_key) {
                continue;
            }

            let amount = coerce_amount(cells.get(dollars_col));
            let count = coerce_count(cells.get(count_col));
            if amount <= 0.0 && count <= 0 {
                continue;
            }

            rows.push(SheetRow {
                match_key: match_key.to_string(),
                amount,
                count,
            });
        }

        debug!(
            sheet = sheet_name,
            scanned = data.len(),
            kept = rows.len(),
            "read matching rows"
        );
        Ok(rows)
    }
}

/// Find a column index by exact (trimmed) header name.
fn resolve_column(header: &[Value], name: &str) -> ReaderResult<usize> {
    header
        .iter()
        .position(|cell| cell.as_str().map(str::trim) == Some(name))
        .ok_or_else(|| ReaderError::MissingColumn(name.to_string()))
}

/// Coerce a cell to a dollar amount. Numbers pass through, strings are
/// parsed, everything else (parse failures and non-finite values like
/// "nan" or "inf") becomes 0.0, keeping the positive-measure row filter
/// sound.
fn coerce_amount(cell: Option<&Value>) -> f64 {
    match cell {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Coerce a cell to a donation count. Fractional values truncate toward
/// zero; unparseable cells become 0.
fn coerce_count(cell: Option<&Value>) -> i64 {
    match cell {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f.trunc() as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}
