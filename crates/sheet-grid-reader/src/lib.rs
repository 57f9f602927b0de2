//! Tabular reading of the donations sheet.
//!
//! A sheet is a rectangular grid of JSON cells behind the [`SheetSource`]
//! seam. Row 0 is the header; the three donation columns are located by
//! name in any order. The reader materializes only rows whose form slug is
//! in the current candidate-key set and whose measures are not both zero.

mod reader;
mod source;

pub use reader::{GridReader, RowReader, COL_COUNT, COL_DOLLARS, COL_FORM_NAME};
pub use source::{JsonWorkbook, SheetSource};

use thiserror::Error;

/// Error type for sheet reading.
#[derive(Error, Debug)]
pub enum ReaderError {
    /// The named sheet does not exist in the workbook.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// A required header column is missing.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// The workbook file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook file is not valid JSON of the expected shape.
    #[error("Workbook error: {0}")]
    Workbook(String),
}

/// Result type alias for sheet reading.
pub type ReaderResult<T> = Result<T, ReaderError>;
