use std::{fmt, path::Path};

use log::info;

use crate::{
    codec::{
        append::{append_row, append_rows},
        decoder::decode,
        encoder::{encode, template},
    },
    core::{
        options::Options,
        row::{Records, Row},
        storage::{LocalStorage, Storage},
    },
    error::CsvError,
};

/// A CSV document caching its last conversion.
///
/// The document holds a row snapshot and a text snapshot. `serialize`
/// refreshes the text from the rows and `unserialize` refreshes the rows
/// from the text; neither touches the other snapshot otherwise.
///
/// # Examples
///
/// ```
/// use csv_codec::{core::row::Row, document::Csv};
///
/// let mut csv = Csv::new();
/// csv.set_data(vec![Row::from_pairs([("first_name", "Bob"), ("last_name", "Smith, III")])]);
///
/// assert!(csv.serialize().contains("Bob,\"Smith, III\""));
/// assert!(csv.is_serialized());
/// ```
pub struct Csv<S: Storage = LocalStorage> {
    storage: S,
    options: Options,
    data: Vec<Row>,
    string: String,
}

impl Csv<LocalStorage> {
    pub fn new() -> Self {
        Self::with_storage(LocalStorage)
    }

    /// Reads a file and decodes it.
    pub fn load_file(path: impl AsRef<Path>, options: Options) -> Result<Self, CsvError> {
        let mut csv = Self::new().with_options(options);
        let bytes = csv.storage.read_all(path.as_ref())?;
        csv.string = String::from_utf8_lossy(&bytes).into_owned();
        csv.unserialize()?;
        Ok(csv)
    }

    /// Decodes CSV text.
    pub fn load_string(text: impl Into<String>, options: Options) -> Result<Self, CsvError> {
        let mut csv = Self::new().with_options(options);
        csv.string = text.into();
        csv.unserialize()?;
        Ok(csv)
    }

    /// Encodes rows, flattening grouped records.
    pub fn load_data(records: impl Into<Records>, options: Options) -> Self {
        let mut csv = Self::new().with_options(options);
        csv.set_data(records);
        csv.serialize();
        csv
    }
}

impl Default for Csv<LocalStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Storage> Csv<S> {
    pub fn with_storage(storage: S) -> Self {
        Self {
            storage,
            options: Options::default(),
            data: Vec::new(),
            string: String::new(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn data(&self) -> &[Row] {
        &self.data
    }

    pub fn set_data(&mut self, records: impl Into<Records>) -> &mut Self {
        self.data = records.into().into_rows();
        self
    }

    pub fn string(&self) -> &str {
        &self.string
    }

    pub fn set_string(&mut self, text: impl Into<String>) -> &mut Self {
        self.string = text.into();
        self
    }

    /// Encodes the row snapshot into the text snapshot.
    pub fn serialize(&mut self) -> &str {
        self.string = encode(self.data.clone(), &self.options);
        &self.string
    }

    /// Decodes the text snapshot into the row snapshot.
    pub fn unserialize(&mut self) -> Result<&[Row], CsvError> {
        self.data = decode(&self.string, &self.options)?;
        Ok(&self.data)
    }

    pub fn is_serialized(&self) -> bool {
        !self.string.is_empty()
    }

    pub fn is_unserialized(&self) -> bool {
        !self.data.is_empty()
    }

    /// The header line of the row snapshot alone.
    pub fn template(&self) -> Result<String, CsvError> {
        template(self.data.clone(), &self.options)
    }

    /// Writes the text snapshot, serializing the rows first when there is
    /// no text yet.
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), CsvError> {
        if !self.is_serialized() {
            self.serialize();
        }
        self.storage
            .write_all(path.as_ref(), self.string.as_bytes())?;
        info!("Wrote {} bytes to {}", self.string.len(), path.as_ref().display());
        Ok(())
    }

    /// Writes only the header line of the row snapshot.
    ///
    /// Fails with [`CsvError::EmptyData`] when there are no rows, and no
    /// file is created.
    pub fn write_blank_file(&self, path: impl AsRef<Path>) -> Result<(), CsvError> {
        let header = self.template()?;
        self.storage.write_all(path.as_ref(), header.as_bytes())?;
        info!("Wrote blank file {}", path.as_ref().display());
        Ok(())
    }

    pub fn append_row(
        &self,
        path: impl AsRef<Path>,
        row: &Row,
        validate: bool,
    ) -> Result<(), CsvError> {
        append_row(&self.storage, path, row, &self.options, validate)
    }

    pub fn append_data(
        &self,
        path: impl AsRef<Path>,
        records: impl Into<Records>,
        validate: bool,
    ) -> Result<(), CsvError> {
        append_rows(&self.storage, path, records, &self.options, validate)
    }
}

impl<S: Storage> fmt::Display for Csv<S> {
    /// Renders the text snapshot, or the encoded rows when there is no text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_serialized() {
            f.write_str(&self.string)
        } else {
            f.write_str(&encode(self.data.clone(), &self.options))
        }
    }
}

/// Reads and decodes a file.
pub fn read_file(path: impl AsRef<Path>, options: Options) -> Result<Vec<Row>, CsvError> {
    Ok(Csv::load_file(path, options)?.data)
}

/// Encodes rows and writes them to a file.
pub fn write_data_to_file(
    records: impl Into<Records>,
    path: impl AsRef<Path>,
    options: Options,
) -> Result<(), CsvError> {
    Csv::load_data(records, options).write_to_file(path)
}

/// Writes a headers-only file from the first row of `records`.
pub fn write_template_to_file(
    records: impl Into<Records>,
    path: impl AsRef<Path>,
    options: Options,
) -> Result<(), CsvError> {
    let mut csv = Csv::new().with_options(options);
    csv.set_data(records);
    csv.write_blank_file(path)
}

pub fn append_row_to_file(
    path: impl AsRef<Path>,
    row: &Row,
    options: &Options,
    validate: bool,
) -> Result<(), CsvError> {
    append_row(&LocalStorage, path, row, options, validate)
}

pub fn append_data_to_file(
    path: impl AsRef<Path>,
    records: impl Into<Records>,
    options: &Options,
    validate: bool,
) -> Result<(), CsvError> {
    append_rows(&LocalStorage, path, records, options, validate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::row::Field;

    fn people() -> Vec<Row> {
        vec![
            Row::from_pairs([("first_name", "Bob"), ("last_name", "Smith")]),
            Row::from_pairs([("first_name", "Jane"), ("last_name", "Smith")]),
        ]
    }

    #[test]
    fn loaded_string_should_be_unserialized() -> Result<(), CsvError> {
        let csv = Csv::load_string(
            "username,email\ntestuser1,testuser1@test.com\n",
            Options::default(),
        )?;

        assert!(csv.is_serialized());
        assert!(csv.is_unserialized());
        assert_eq!(csv.data()[0].get("username"), Some(&Field::from("testuser1")));
        Ok(())
    }

    #[test]
    fn unserialized_data_should_serialize_again() -> Result<(), CsvError> {
        let source = Csv::load_string(
            "username,email\ntestuser1,testuser1@test.com\n",
            Options::default(),
        )?;

        let csv = Csv::load_data(source.data().to_vec(), Options::default());

        assert!(csv.string().contains("testuser1,testuser1@test.com"));
        Ok(())
    }

    #[test]
    fn setters_should_replace_snapshots_independently() {
        let mut csv = Csv::new();
        csv.set_string("a,b\n1,2\n").set_data(people());

        assert_eq!(csv.string(), "a,b\n1,2\n");
        assert_eq!(csv.data().len(), 2);
        assert_eq!(csv.to_string(), "a,b\n1,2\n");
    }

    #[test]
    fn display_should_encode_when_not_serialized() {
        let mut csv = Csv::new();
        csv.set_data(people());

        assert!(csv.to_string().contains("Jane,Smith"));
        assert!(!csv.is_serialized());
    }

    #[test]
    fn empty_document_template_should_fail() {
        let csv = Csv::new();

        assert!(matches!(csv.template(), Err(CsvError::EmptyData)));
    }
}
