#[path = "common/mocks.rs"]
mod mocks;

use std::{
    env::temp_dir,
    path::{Path, PathBuf},
};

use mocks::MockDisk;

use csv_codec::{
    codec::append::append_row,
    core::{options::Options, row::Row},
    document::{append_row_to_file, Csv},
    error::CsvError,
};
use rand::distr::{Alphanumeric, SampleString};
use serde_json::json;

fn new_row() -> Row {
    Row::from_pairs([("first_name", "John")])
}

#[test]
fn append_to_missing_file_should_fail_without_io() {
    let mut disk = MockDisk::new();
    disk.expect_exists()
        .withf(|path| path == Path::new("bad.csv"))
        .times(1)
        .return_const(false);
    disk.expect_first_line().never();
    disk.expect_append_all().never();

    let result = append_row(&disk, "bad.csv", &new_row(), &Options::default(), true);

    assert!(matches!(result, Err(CsvError::MissingFile(path)) if path == PathBuf::from("bad.csv")));
}

#[test]
fn append_with_mismatched_header_should_not_write() {
    let mut disk = MockDisk::new();
    disk.expect_exists().return_const(true);
    disk.expect_first_line()
        .times(1)
        .returning(|_| Ok(Some("first_name,last_name".to_string())));
    disk.expect_append_all().never();

    let result = append_row(&disk, "test.csv", &new_row(), &Options::default(), true);

    match result {
        Err(CsvError::HeaderMismatch { expected, found }) => {
            assert_eq!(expected, vec!["first_name", "last_name"]);
            assert_eq!(found, vec!["first_name"]);
        }
        other => panic!("expected a header mismatch, got {:?}", other),
    }
}

#[test]
fn append_with_matching_header_should_write_one_line() {
    let mut disk = MockDisk::new();
    disk.expect_exists().return_const(true);
    disk.expect_first_line()
        .returning(|_| Ok(Some("\"first_name\"".to_string())));
    disk.expect_append_all()
        .withf(|_, bytes| bytes == b"John\n")
        .times(1)
        .returning(|_, _| Ok(()));

    append_row(&disk, "test.csv", &new_row(), &Options::default(), true).unwrap();
}

#[test]
fn storage_error_should_surface() {
    let mut disk = MockDisk::new();
    disk.expect_exists().return_const(true);
    disk.expect_append_all().returning(|_, _| {
        Err(CsvError::Io(std::io::Error::other("disk full")))
    });

    let result = append_row(&disk, "test.csv", &new_row(), &Options::default(), false);

    assert!(matches!(result, Err(CsvError::Io(_))));
}

#[test]
fn blank_file_without_rows_should_not_be_written() {
    let mut disk = MockDisk::new();
    disk.expect_write_all().never();

    let csv = Csv::with_storage(disk);

    assert!(matches!(
        csv.write_blank_file("test.csv"),
        Err(CsvError::EmptyData)
    ));
}

#[test]
fn append_row_to_missing_local_file_should_fail() {
    let file_name = Alphanumeric.sample_string(&mut rand::rng(), 16);
    let path = temp_dir().join(format!("{}.csv", file_name));

    let result = append_row_to_file(
        &path,
        &Row::from_pairs([("first_name", "John"), ("last_name", "Smith")]),
        &Options::default(),
        true,
    );

    assert!(matches!(result, Err(CsvError::MissingFile(_))));
    assert!(!path.exists());
}

#[test]
fn invalid_options_should_be_rejected() {
    assert!(matches!(
        Options::from_json(&json!({"enclosure": ""})),
        Err(CsvError::InvalidOption(_))
    ));
    assert!(matches!(
        Options::from_json(&json!({"limit": "ten"})),
        Err(CsvError::InvalidOption(_))
    ));
    assert!(matches!(
        Options::from_json(&json!({"escape": "é"})),
        Err(CsvError::InvalidOption(_))
    ));
}

#[test]
fn ragged_input_should_not_be_an_error() {
    let csv = Csv::load_string("a,b\n1\n1,2,3\n", Options::default()).unwrap();

    assert_eq!(csv.data().len(), 2);
    assert!(csv.data().iter().all(|row| !row.is_keyed()));
}
