use std::path::Path;

use log::info;

use crate::{
    codec::encoder::serialize_row,
    core::{
        options::Options,
        row::{Records, Row},
        storage::Storage,
    },
    error::CsvError,
};

/// Appends one row to an existing CSV file.
///
/// When `validate` is set, the file's first line is split on the bare
/// delimiter, enclosure characters are stripped from each name, and the
/// result must equal the row's column names in order. Validation happens
/// before anything is written.
///
/// The check does not go through the quote-aware splitter, so header names
/// that contain the delimiter never validate.
///
/// # Errors
///
/// - [`CsvError::MissingFile`] if `path` does not exist
/// - [`CsvError::HeaderMismatch`] if validation fails
pub fn append_row<S: Storage>(
    storage: &S,
    path: impl AsRef<Path>,
    row: &Row,
    options: &Options,
    validate: bool,
) -> Result<(), CsvError> {
    let path = path.as_ref();
    if !storage.exists(path) {
        return Err(CsvError::MissingFile(path.to_path_buf()));
    }

    if validate {
        check_header(storage, path, row, options)?;
    }

    let line = serialize_row(row, options);
    storage.append_all(path, line.as_bytes())?;
    info!("Appended {} bytes to {}", line.len(), path.display());
    Ok(())
}

/// Appends rows one at a time, in order, each validated on its own.
///
/// Rows appended before a failing one stay in the file.
pub fn append_rows<S: Storage>(
    storage: &S,
    path: impl AsRef<Path>,
    records: impl Into<Records>,
    options: &Options,
    validate: bool,
) -> Result<(), CsvError> {
    let path = path.as_ref();
    for row in records.into().into_rows() {
        append_row(storage, path, &row, options, validate)?;
    }
    Ok(())
}

fn check_header<S: Storage>(
    storage: &S,
    path: &Path,
    row: &Row,
    options: &Options,
) -> Result<(), CsvError> {
    let line = storage.first_line(path)?.unwrap_or_default();
    let enclosure = char::from(options.enclosure);
    let expected: Vec<String> = line
        .trim()
        .split(char::from(options.delimiter))
        .map(|name| name.replace(enclosure, ""))
        .collect();
    let found: Vec<String> = row.keys().into_iter().map(String::from).collect();

    if expected != found {
        return Err(CsvError::HeaderMismatch { expected, found });
    }
    Ok(())
}
