//! Sheet source seam and the JSON workbook binding.

use crate::{ReaderError, ReaderResult};
use serde_json::Value;
use std::path::PathBuf;

/// Provides access to named sheets as rectangular grids of JSON cells.
///
/// The engine depends only on this trait; the spreadsheet host (a workbook
/// file here, a live spreadsheet API elsewhere) is an injected binding.
pub trait SheetSource: Send + Sync {
    /// Read the full grid of the named sheet, header row included.
    /// Returns `Ok(None)` when no sheet with that name exists.
    fn read_grid(&self, sheet_name: &str) -> ReaderResult<Option<Vec<Vec<Value>>>>;
}

/// Sheet source backed by a JSON workbook file.
///
/// Expected shape: `{"sheets": {"<name>": [[cell, ...], ...], ...}}`.
/// The file is re-read on every call so long-lived watch loops observe
/// edits without a restart.
pub struct JsonWorkbook {
    path: PathBuf,
}

impl JsonWorkbook {
    /// Create a workbook source over the given file.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> ReaderResult<Value> {
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| ReaderError::Workbook(e.to_string()))
    }
}

impl SheetSource for JsonWorkbook {
    fn read_grid(&self, sheet_name: &str) -> ReaderResult<Option<Vec<Vec<Value>>>> {
        let workbook = self.load()?;

        let sheets = workbook
            .get("sheets")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                ReaderError::Workbook("workbook has no top-level \"sheets\" object".to_string())
            })?;

        let Some(grid) = sheets.get(sheet_name) else {
            return Ok(None);
        };

        let rows = grid.as_array().ok_or_else(|| {
            ReaderError::Workbook(format!("sheet {sheet_name} is not an array of rows"))
        })?;

        rows.iter()
            .map(|row| {
                row.as_array().cloned().ok_or_else(|| {
                    ReaderError::Workbook(format!("sheet {sheet_name} contains a non-array row"))
                })
            })
            .collect::<ReaderResult<Vec<Vec<Value>>>>()
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn workbook_with(content: &str) -> (tempfile::TempDir, JsonWorkbook) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("workbook.json");
        std::fs::write(&path, content).unwrap();
        (dir, JsonWorkbook::new(path))
    }

    #[test]
    fn reads_named_sheet_grid() {
        let (_dir, wb) = workbook_with(
            r#"{"sheets": {"Donations": [["form_name"], ["alpha"]]}}"#,
        );
        let grid = wb.read_grid("Donations").unwrap().unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[1][0], Value::String("alpha".to_string()));
    }

    #[test]
    fn missing_sheet_is_none() {
        let (_dir, wb) = workbook_with(r#"{"sheets": {}}"#);
        assert!(wb.read_grid("Donations").unwrap().is_none());
    }

    #[test]
    fn malformed_workbook_is_an_error() {
        let (_dir, wb) = workbook_with(r#"{"tabs": []}"#);
        assert!(matches!(
            wb.read_grid("Donations"),
            Err(ReaderError::Workbook(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let wb = JsonWorkbook::new(dir.path().join("absent.json"));
        assert!(matches!(wb.read_grid("Donations"), Err(ReaderError::Io(_))));
    }
}
