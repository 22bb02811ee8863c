use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
/// Csv error
pub enum CsvError {
    #[error("The file '{0}' does not exist")]
    MissingFile(PathBuf),

    #[error("The new row's columns {found:?} do not match the file's columns {expected:?}")]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("No data rows to derive the header from")]
    EmptyData,

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] csv::Error),
}
