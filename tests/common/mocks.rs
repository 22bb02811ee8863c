//! Mock version of the file storage used by the codec.
use mockall::mock;

use std::path::Path;

use csv_codec::{core::storage::Storage, error::CsvError};

mock! {
    pub Disk {}
    impl Storage for Disk {
        fn read_all(&self, path: &Path) -> Result<Vec<u8>, CsvError>;
        fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<(), CsvError>;
        fn append_all(&self, path: &Path, bytes: &[u8]) -> Result<(), CsvError>;
        fn exists(&self, path: &Path) -> bool;
        fn first_line(&self, path: &Path) -> Result<Option<String>, CsvError>;
    }
}
