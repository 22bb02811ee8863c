use std::borrow::Cow;

use log::debug;

use crate::{
    core::{
        options::Options,
        row::{Field, Records, Row},
    },
    error::CsvError,
};

/// Terminator of the header line.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Terminator of the header line.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Encodes rows into CSV text.
///
/// Grouped records are flattened first. When `use_header_row` is set and
/// the first row is keyed, its selected column names form the header line.
/// Every row is then written with [`serialize_row`].
///
/// An empty input yields an empty string.
///
/// # Examples
///
/// ```
/// use csv_codec::codec::encoder::encode;
/// use csv_codec::core::{options::Options, row::Row};
///
/// let rows = vec![
///     Row::from_pairs([("first_name", "Bob"), ("last_name", "Smith, III")]),
///     Row::from_pairs([("first_name", "Jane"), ("last_name", "Smith \"Janey\"")]),
/// ];
///
/// let csv = encode(rows, &Options::default());
/// assert!(csv.contains("first_name,last_name"));
/// assert!(csv.contains("Bob,\"Smith, III\"\n"));
/// assert!(csv.contains("Jane,\"Smith \"\"Janey\"\"\"\n"));
/// ```
pub fn encode(records: impl Into<Records>, options: &Options) -> String {
    let rows = records.into().into_rows();
    let mut csv = String::new();

    if options.use_header_row {
        if let Some(first) = rows.first().filter(|row| row.is_keyed()) {
            csv.push_str(&header_line(first, options));
        }
    }

    for row in &rows {
        csv.push_str(&serialize_row(row, options));
    }

    csv
}

/// The header line derived from the column names of `row`, honoring the
/// exclude and include lists.
pub fn header_line(row: &Row, options: &Options) -> String {
    let delimiter = char::from(options.delimiter).to_string();
    let headers: Vec<_> = row
        .keys()
        .into_iter()
        .filter(|key| options.is_column_selected(key))
        .collect();

    headers.join(delimiter.as_str()) + LINE_ENDING
}

/// A headers-only document, used for blank template downloads.
///
/// Fails with [`CsvError::EmptyData`] when there is no row to take the
/// column names from.
pub fn template(records: impl Into<Records>, options: &Options) -> Result<String, CsvError> {
    let rows = records.into().into_rows();
    let first = rows.first().ok_or(CsvError::EmptyData)?;
    Ok(header_line(first, options))
}

/// Serializes one row into a single `\n` terminated line.
///
/// For each selected column, in row order:
///
/// 1. scalar values have CR and LF folded to spaces when embedded newlines
///    are not preserved, then are cut to `truncate_length` characters;
/// 2. composite values are reduced through the `map` or `columns`
///    projection, and become empty when no projection applies;
/// 3. enclosure characters are prefixed with the escape character; when the
///    escape differs from the enclosure, escape characters are doubled too;
/// 4. the escaped value is enclosed when it holds the delimiter, a line
///    break, an escaped enclosure or a doubled escape.
///
/// # Examples
///
/// ```
/// use csv_codec::codec::encoder::serialize_row;
/// use csv_codec::core::{options::Options, row::{Field, Mapping, Row}};
///
/// let roles: Vec<Mapping> = vec![
///     [("id", "1"), ("role", "Admin")].into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
///     [("id", "2"), ("role", "Editor")].into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
/// ];
/// let row = Row::from_pairs([
///     ("username", Field::from("bobsmith")),
///     ("roles", Field::from(roles)),
/// ]);
/// let options = Options::builder().join_column("roles", "role").build();
///
/// assert_eq!(serialize_row(&row, &options), "bobsmith,\"Admin,Editor\"\n");
/// ```
pub fn serialize_row(row: &Row, options: &Options) -> String {
    let delimiter = char::from(options.delimiter).to_string();
    let tokens: Vec<String> = row
        .entries()
        .into_iter()
        .filter(|(key, _)| options.is_column_selected(key))
        .map(|(key, field)| encode_field(&key, field, options))
        .collect();

    tokens.join(delimiter.as_str()) + "\n"
}

fn encode_field(key: &str, field: &Field, options: &Options) -> String {
    let mut value = reduce(key, field, options);
    let enclosure = char::from(options.enclosure);
    let escape = char::from(options.escape);
    let escaped_enclosure = format!("{}{}", escape, enclosure);

    // A distinct escape character is itself escaped and forces enclosure,
    // since the decoder consumes every escape byte inside an enclosed field.
    let distinct_escape = escape != enclosure && value.contains(escape);
    if distinct_escape {
        value = Cow::Owned(value.replace(escape, &format!("{}{}", escape, escape)));
    }
    if value.contains(enclosure) {
        value = Cow::Owned(value.replace(enclosure, &escaped_enclosure));
    }

    if distinct_escape
        || value.contains(char::from(options.delimiter))
        || value.contains(['\n', '\r'])
        || value.contains(escaped_enclosure.as_str())
    {
        format!("{}{}{}", enclosure, value, enclosure)
    } else {
        value.into_owned()
    }
}

/// Reduces a field to the scalar text that gets written.
fn reduce<'a>(key: &str, field: &'a Field, options: &Options) -> Cow<'a, str> {
    match field {
        Field::Scalar(value) => {
            let mut value = Cow::Borrowed(value.as_str());
            if !options.preserve_embedded_newlines && value.contains(['\n', '\r']) {
                value = Cow::Owned(value.replace(['\n', '\r'], " "));
            }
            if options.truncate_length > 0 {
                let cut = value
                    .char_indices()
                    .nth(options.truncate_length)
                    .map(|(index, _)| index);
                if let Some(cut) = cut {
                    value = Cow::Owned(value[..cut].to_string());
                }
            }
            value
        }
        Field::Mapping(mapping) => {
            match options.map.get(key).and_then(|sub_key| mapping.get(sub_key)) {
                Some(value) => Cow::Borrowed(value.as_str()),
                None => {
                    debug!("No map projection for column '{}', writing an empty field", key);
                    Cow::Borrowed("")
                }
            }
        }
        Field::MappingSequence(items) => {
            let joined = options.columns.get(key).and_then(|sub_key| {
                items
                    .iter()
                    .map(|item| item.get(sub_key).map(String::as_str))
                    .collect::<Option<Vec<_>>>()
            });
            match joined {
                Some(values) => Cow::Owned(values.join(",")),
                None => {
                    debug!("No columns projection for column '{}', writing an empty field", key);
                    Cow::Borrowed("")
                }
            }
        }
        Field::Sequence(_) => {
            debug!("Column '{}' holds a plain sequence, writing an empty field", key);
            Cow::Borrowed("")
        }
    }
}
