use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::CsvError;

/// Dialect and shaping settings shared by the encoder and the decoder.
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Enclosure: double quote (")
/// - Escape: double quote ("), so an embedded quote is written as `""`
/// - Header row: enabled
/// - Embedded newlines: preserved
/// - Truncation: disabled (0)
/// - No excluded or included columns, no projections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Field separator.
    pub delimiter: u8,
    /// Character wrapping a field that holds structural characters.
    pub enclosure: u8,
    /// Character written before an embedded enclosure character.
    pub escape: u8,
    /// Whether the first line carries the column names.
    pub use_header_row: bool,
    /// When false, CR and LF inside a field are written as spaces.
    pub preserve_embedded_newlines: bool,
    /// Maximum number of characters kept per field, 0 for unlimited.
    pub truncate_length: usize,
    /// Columns never written.
    pub exclude: Vec<String>,
    /// When not empty, the only columns written.
    pub include: Vec<String>,
    /// Column name to the sub-key projecting a nested mapping to a scalar.
    pub map: IndexMap<String, String>,
    /// Column name to the sub-key joined across a sequence of mappings.
    pub columns: IndexMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            delimiter: b',',
            enclosure: b'"',
            escape: b'"',
            use_header_row: true,
            preserve_embedded_newlines: true,
            truncate_length: 0,
            exclude: Vec::new(),
            include: Vec::new(),
            map: IndexMap::new(),
            columns: IndexMap::new(),
        }
    }
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }

    /// Whether a column survives the exclude and include lists.
    pub fn is_column_selected(&self, column: &str) -> bool {
        !self.exclude.iter().any(|name| name == column)
            && (self.include.is_empty() || self.include.iter().any(|name| name == column))
    }

    /// Resolves options from a loosely typed settings object.
    ///
    /// Recognized keys are `delimiter`, `enclosure`, `escape`, `fields`,
    /// `newline`, `limit`, `map`, `columns`, `exclude` and `include`.
    /// Unknown keys are ignored and absent keys keep their default.
    /// `exclude` and `include` accept a single column name or a list.
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_codec::core::options::Options;
    /// use serde_json::json;
    ///
    /// let options = Options::from_json(&json!({
    ///     "delimiter": ";",
    ///     "exclude": "password",
    ///     "limit": 10,
    ///     "theme": "ignored"
    /// })).unwrap();
    ///
    /// assert_eq!(options.delimiter, b';');
    /// assert_eq!(options.exclude, vec!["password"]);
    /// assert_eq!(options.truncate_length, 10);
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, CsvError> {
        let raw: RawOptions = serde_json::from_value(value.clone())
            .map_err(|error| CsvError::InvalidOption(error.to_string()))?;

        let mut builder = OptionsBuilder::new();
        if let Some(delimiter) = raw.delimiter {
            builder = builder.delimiter(single_byte("delimiter", &delimiter)?);
        }
        if let Some(enclosure) = raw.enclosure {
            builder = builder.enclosure(single_byte("enclosure", &enclosure)?);
        }
        if let Some(escape) = raw.escape {
            builder = builder.escape(single_byte("escape", &escape)?);
        }
        if let Some(fields) = raw.fields {
            builder = builder.use_header_row(fields);
        }
        if let Some(newline) = raw.newline {
            builder = builder.preserve_embedded_newlines(newline);
        }
        if let Some(limit) = raw.limit {
            builder = builder.truncate_length(limit);
        }

        Ok(builder
            .exclude(raw.exclude.map(OneOrMany::into_vec).unwrap_or_default())
            .include(raw.include.map(OneOrMany::into_vec).unwrap_or_default())
            .map(raw.map)
            .columns(raw.columns)
            .build())
    }
}

/// A builder for configuring [`Options`].
///
/// # Examples
///
/// ```
/// use csv_codec::core::options::Options;
///
/// let options = Options::builder()
///     .delimiter(b'\t')
///     .use_header_row(false)
///     .exclude(["password"])
///     .build();
///
/// assert_eq!(options.delimiter, b'\t');
/// assert!(!options.use_header_row);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: Options::default(),
        }
    }

    /// # Panics
    ///
    /// Panics if `delimiter` is not an ASCII byte.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        assert_ascii("delimiter", delimiter);
        self.options.delimiter = delimiter;
        self
    }

    /// # Panics
    ///
    /// Panics if `enclosure` is not an ASCII byte.
    pub fn enclosure(mut self, enclosure: u8) -> Self {
        assert_ascii("enclosure", enclosure);
        self.options.enclosure = enclosure;
        self
    }

    /// # Panics
    ///
    /// Panics if `escape` is not an ASCII byte.
    pub fn escape(mut self, escape: u8) -> Self {
        assert_ascii("escape", escape);
        self.options.escape = escape;
        self
    }

    pub fn use_header_row(mut self, yes: bool) -> Self {
        self.options.use_header_row = yes;
        self
    }

    pub fn preserve_embedded_newlines(mut self, yes: bool) -> Self {
        self.options.preserve_embedded_newlines = yes;
        self
    }

    pub fn truncate_length(mut self, length: usize) -> Self {
        self.options.truncate_length = length;
        self
    }

    pub fn exclude<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.exclude = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn include<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.include = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Projects the nested mapping in `column` to its `sub_key` value.
    pub fn map_column(mut self, column: impl Into<String>, sub_key: impl Into<String>) -> Self {
        self.options.map.insert(column.into(), sub_key.into());
        self
    }

    pub fn map(mut self, map: IndexMap<String, String>) -> Self {
        self.options.map = map;
        self
    }

    /// Joins the `sub_key` values of the mapping sequence in `column`.
    pub fn join_column(mut self, column: impl Into<String>, sub_key: impl Into<String>) -> Self {
        self.options.columns.insert(column.into(), sub_key.into());
        self
    }

    pub fn columns(mut self, columns: IndexMap<String, String>) -> Self {
        self.options.columns = columns;
        self
    }

    pub fn build(self) -> Options {
        self.options
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawOptions {
    delimiter: Option<String>,
    enclosure: Option<String>,
    escape: Option<String>,
    fields: Option<bool>,
    newline: Option<bool>,
    limit: Option<usize>,
    map: IndexMap<String, String>,
    columns: IndexMap<String, String>,
    exclude: Option<OneOrMany>,
    include: Option<OneOrMany>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

// The encoder writes these as chars and the decoder matches them as bytes,
// which only agree for ASCII.
fn assert_ascii(name: &str, byte: u8) {
    assert!(byte.is_ascii(), "{} must be an ASCII byte, got {:#04x}", name, byte);
}

fn single_byte(name: &str, value: &str) -> Result<u8, CsvError> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(CsvError::InvalidOption(format!(
            "{} must be a single ASCII character, got {:?}",
            name, value
        ))),
    }
}
