use std::borrow::Cow;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::CsvError;

/// A nested mapping held in a single field slot, e.g. `{id: 1, code: "US"}`.
///
/// Nested values are kept in their textual form; a `map` or `columns`
/// projection picks one of them when the row is encoded.
pub type Mapping = IndexMap<String, String>;

/// The value of one column in a row.
///
/// Only `Scalar` fields reach the textual encoding directly. The composite
/// variants must be reduced by a projection first, otherwise they are
/// written as an empty field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Field {
    /// A plain string value.
    Scalar(String),
    /// A nested mapping, reduced by a `map` projection.
    Mapping(Mapping),
    /// A sequence of nested mappings, reduced by a `columns` projection.
    MappingSequence(Vec<Mapping>),
    /// A sequence of plain values. No projection applies to it.
    Sequence(Vec<String>),
}

impl Field {
    /// Returns the string value if the field is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Field::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Field::Scalar(_))
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Scalar(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Scalar(value)
    }
}

impl From<Mapping> for Field {
    fn from(value: Mapping) -> Self {
        Field::Mapping(value)
    }
}

impl From<Vec<Mapping>> for Field {
    fn from(value: Vec<Mapping>) -> Self {
        Field::MappingSequence(value)
    }
}

impl From<&Value> for Field {
    fn from(value: &Value) -> Self {
        match value {
            Value::Object(map) => Field::Mapping(to_mapping(map)),
            Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
                Field::MappingSequence(
                    items
                        .iter()
                        .filter_map(Value::as_object)
                        .map(to_mapping)
                        .collect(),
                )
            }
            Value::Array(items) => Field::Sequence(items.iter().map(scalar_text).collect()),
            other => Field::Scalar(scalar_text(other)),
        }
    }
}

/// One record of a table.
///
/// Decoding produces a `Keyed` row when the record lines up with the header
/// and a `Positional` row otherwise, so both shapes can coexist in a single
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Keyed(IndexMap<String, Field>),
    Positional(Vec<Field>),
}

impl Row {
    /// Builds a keyed row from `(column, value)` pairs, keeping their order.
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_codec::core::row::Row;
    ///
    /// let row = Row::from_pairs([("first_name", "Bob"), ("last_name", "Smith")]);
    /// assert_eq!(row.keys(), vec!["first_name", "last_name"]);
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Field>,
    {
        Row::Keyed(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// Builds a positional row from plain values.
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Field>,
    {
        Row::Positional(values.into_iter().map(Into::into).collect())
    }

    pub fn is_keyed(&self) -> bool {
        matches!(self, Row::Keyed(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Keyed(fields) => fields.len(),
            Row::Positional(fields) => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names in row order. Positional rows are keyed by their index.
    pub fn keys(&self) -> Vec<Cow<'_, str>> {
        self.entries().into_iter().map(|(key, _)| key).collect()
    }

    /// Looks a field up by column name, or by index for positional rows.
    pub fn get(&self, key: &str) -> Option<&Field> {
        match self {
            Row::Keyed(fields) => fields.get(key),
            Row::Positional(fields) => key.parse::<usize>().ok().and_then(|i| fields.get(i)),
        }
    }

    /// `(column, field)` pairs in row order.
    pub fn entries(&self) -> Vec<(Cow<'_, str>, &Field)> {
        match self {
            Row::Keyed(fields) => fields
                .iter()
                .map(|(key, field)| (Cow::Borrowed(key.as_str()), field))
                .collect(),
            Row::Positional(fields) => fields
                .iter()
                .enumerate()
                .map(|(index, field)| (Cow::Owned(index.to_string()), field))
                .collect(),
        }
    }
}

impl From<&Value> for Row {
    fn from(value: &Value) -> Self {
        match value {
            Value::Object(map) => Row::Keyed(
                map.iter()
                    .map(|(key, value)| (key.clone(), Field::from(value)))
                    .collect(),
            ),
            Value::Array(items) => Row::Positional(items.iter().map(Field::from).collect()),
            other => Row::Positional(vec![Field::from(other)]),
        }
    }
}

/// The input of an encode call.
///
/// Callers either hand over a plain list of rows or group rows under
/// arbitrary labels. Grouped records are flattened one level, in label
/// order, and the labels are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Records {
    Rows(Vec<Row>),
    Grouped(IndexMap<String, Vec<Row>>),
}

impl Records {
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Records::Rows(rows) => rows,
            Records::Grouped(groups) => groups.into_values().flatten().collect(),
        }
    }

    /// Converts a JSON document into records.
    ///
    /// An array is a list of rows. An object whose keys are all numeric is
    /// read as a list too, in key order; any other object is a grouping
    /// wrapper whose values must each be a list of rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use csv_codec::core::row::Records;
    /// use serde_json::json;
    ///
    /// let records = Records::from_json(&json!({
    ///     "my_table": [{"first_name": "Bob"}, {"first_name": "Jane"}]
    /// })).unwrap();
    /// assert_eq!(records.into_rows().len(), 2);
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, CsvError> {
        match value {
            Value::Array(_) => Ok(Records::Rows(rows_from_list(value)?)),
            Value::Object(map) if map.keys().all(|key| key.parse::<u64>().is_ok()) => {
                Ok(Records::Rows(map.values().map(Row::from).collect()))
            }
            Value::Object(map) => {
                let mut groups = IndexMap::with_capacity(map.len());
                for (label, rows) in map {
                    groups.insert(label.clone(), rows_from_list(rows)?);
                }
                Ok(Records::Grouped(groups))
            }
            other => Err(CsvError::InvalidData(format!(
                "expected a list of rows or a grouping object, found {}",
                other
            ))),
        }
    }
}

impl From<Vec<Row>> for Records {
    fn from(rows: Vec<Row>) -> Self {
        Records::Rows(rows)
    }
}

impl From<IndexMap<String, Vec<Row>>> for Records {
    fn from(groups: IndexMap<String, Vec<Row>>) -> Self {
        Records::Grouped(groups)
    }
}

fn rows_from_list(value: &Value) -> Result<Vec<Row>, CsvError> {
    match value {
        Value::Array(items) => Ok(items.iter().map(Row::from).collect()),
        Value::Object(map) if map.keys().all(|key| key.parse::<u64>().is_ok()) => {
            Ok(map.values().map(Row::from).collect())
        }
        other => Err(CsvError::InvalidData(format!(
            "expected a list of rows, found {}",
            other
        ))),
    }
}

fn to_mapping(map: &serde_json::Map<String, Value>) -> Mapping {
    map.iter()
        .map(|(key, value)| (key.clone(), scalar_text(value)))
        .collect()
}

/// Textual form of a JSON value: `null` and `false` are empty, `true` is `1`.
/// Nested composites have no textual form and become empty.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}
