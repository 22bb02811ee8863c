use std::{
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::Path,
};

use crate::error::CsvError;

/// File access needed by the codec.
///
/// Every call is a single-shot operation: no handle or cursor outlives it.
/// Nothing here locks the target, so concurrent appenders against the same
/// file must be serialized by the caller.
pub trait Storage {
    fn read_all(&self, path: &Path) -> Result<Vec<u8>, CsvError>;
    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<(), CsvError>;
    fn append_all(&self, path: &Path, bytes: &[u8]) -> Result<(), CsvError>;
    fn exists(&self, path: &Path) -> bool;

    /// The first line of the file without its terminator, or `None` for an
    /// empty file.
    fn first_line(&self, path: &Path) -> Result<Option<String>, CsvError> {
        let bytes = self.read_all(path)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text
            .split(['\n', '\r'])
            .next()
            .filter(|_| !bytes.is_empty())
            .map(str::to_string))
    }
}

/// [`Storage`] backed by the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl Storage for LocalStorage {
    fn read_all(&self, path: &Path) -> Result<Vec<u8>, CsvError> {
        Ok(fs::read(path)?)
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<(), CsvError> {
        Ok(fs::write(path, bytes)?)
    }

    fn append_all(&self, path: &Path, bytes: &[u8]) -> Result<(), CsvError> {
        let mut file = OpenOptions::new().append(true).open(path)?;
        file.write_all(bytes)?;
        Ok(file.flush()?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    // Reads up to the first LF, then cuts at the first CR for CR-only files.
    fn first_line(&self, path: &Path) -> Result<Option<String>, CsvError> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(line.split(['\n', '\r']).next().map(str::to_string))
    }
}
