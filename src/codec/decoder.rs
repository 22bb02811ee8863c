use csv::{ReaderBuilder, StringRecord, Trim};
use indexmap::IndexMap;
use log::debug;

use crate::{
    core::{
        options::Options,
        row::{Field, Row},
    },
    error::CsvError,
};

/// Decodes CSV text into rows.
///
/// Line endings may be LF, CRLF or CR, and blank lines are skipped. When
/// `use_header_row` is set, the first record supplies the column names and
/// every following record with the same number of fields becomes a keyed
/// row. Records of any other length, or all records when there is no
/// header, become positional rows. A record that repeats the header
/// verbatim is dropped.
///
/// # Examples
///
/// ```
/// use csv_codec::codec::decoder::decode;
/// use csv_codec::core::{options::Options, row::{Field, Row}};
///
/// let csv = "first_name,last_name\nBob,\"Smith, III\"\nJane\n";
/// let rows = decode(csv, &Options::default()).unwrap();
///
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0].get("last_name"), Some(&Field::from("Smith, III")));
/// assert_eq!(rows[1], Row::from_values(["Jane"]));
/// ```
pub fn decode(text: &str, options: &Options) -> Result<Vec<Row>, CsvError> {
    let mut header: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for fields in split_records(text, options)? {
        if options.use_header_row && header.is_none() {
            header = Some(fields);
            continue;
        }

        match &header {
            Some(names) if *names == fields => {
                debug!("Dropping record identical to the header: {:?}", fields);
            }
            Some(names) if names.len() == fields.len() => {
                let row: IndexMap<String, Field> = names
                    .iter()
                    .cloned()
                    .zip(fields.into_iter().map(Field::Scalar))
                    .collect();
                rows.push(Row::Keyed(row));
            }
            _ => {
                if let Some(names) = &header {
                    debug!(
                        "Record has {} fields, header has {}: keeping it positional",
                        fields.len(),
                        names.len()
                    );
                }
                rows.push(Row::from_values(fields));
            }
        }
    }

    Ok(rows)
}

/// Whether the first non-blank record of `text` holds at least one field,
/// using the default dialect.
///
/// This is a cheap smoke test, not a validation of the whole document.
pub fn is_valid(text: &str) -> bool {
    split_records(text, &Options::default())
        .map(|records| records.first().is_some_and(|fields| !fields.is_empty()))
        .unwrap_or(false)
}

/// Splits `text` into records of trimmed fields, honoring enclosed
/// delimiters and line breaks. Lines holding only whitespace yield no
/// record, while an enclosed empty field such as `""` does.
pub fn split_records(text: &str, options: &Options) -> Result<Vec<Vec<String>>, CsvError> {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(options.delimiter)
        .quote(options.enclosure)
        .double_quote(true);
    if options.escape != options.enclosure {
        builder.escape(Some(options.escape));
    }

    let records = builder
        .from_reader(text.as_bytes())
        .into_records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

    let starts: Vec<usize> = records
        .iter()
        .map(|record| record.position().map_or(0, |position| position.byte() as usize))
        .collect();

    Ok(records
        .iter()
        .enumerate()
        .filter(|(index, record)| {
            let end = starts.get(index + 1).copied().unwrap_or(text.len());
            !is_blank(record, &text.as_bytes()[starts[*index].min(end)..end])
        })
        .map(|(_, record)| record.iter().map(str::to_string).collect())
        .collect())
}

/// A blank record is a single empty field whose raw bytes are all
/// whitespace or line terminators.
fn is_blank(record: &StringRecord, raw: &[u8]) -> bool {
    record.len() == 1 && record[0].is_empty() && raw.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encoder::encode;

    fn scalar(row: &Row, key: &str) -> String {
        row.get(key)
            .and_then(Field::as_scalar)
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn rows_should_be_keyed_by_header() -> Result<(), CsvError> {
        let data = "username,email
        testuser1,testuser1@test.com
        testuser2,testuser2@test.com";

        let rows = decode(data, &Options::default())?;

        assert_eq!(rows.len(), 2);
        assert_eq!(scalar(&rows[0], "username"), "testuser1");
        assert_eq!(scalar(&rows[1], "email"), "testuser2@test.com");
        Ok(())
    }

    #[test]
    fn mixed_line_endings_and_blank_lines_should_be_skipped() -> Result<(), CsvError> {
        let data = "\r\n  a , b \r\n\r\n1,2\r3,4\n   \n5,6\n";

        let rows = decode(data, &Options::default())?;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], Row::from_pairs([("a", "1"), ("b", "2")]));
        assert_eq!(scalar(&rows[2], "b"), "6");
        Ok(())
    }

    #[test]
    fn ragged_records_should_stay_positional() -> Result<(), CsvError> {
        let rows = decode("a,b\n1\n1,2,3\n4,5\n", &Options::default())?;

        assert_eq!(rows[0], Row::from_values(["1"]));
        assert_eq!(rows[1], Row::from_values(["1", "2", "3"]));
        assert!(rows[2].is_keyed());
        Ok(())
    }

    #[test]
    fn records_repeating_the_header_should_be_dropped() -> Result<(), CsvError> {
        let rows = decode("a,b\n1,2\na,b\n3,4\n", &Options::default())?;

        assert_eq!(rows.len(), 2);
        assert_eq!(scalar(&rows[1], "a"), "3");
        Ok(())
    }

    #[test]
    fn without_header_every_record_should_be_positional() -> Result<(), CsvError> {
        let options = Options::builder().use_header_row(false).build();

        let rows = decode("a,b\n1,2\n", &options)?;

        assert_eq!(
            rows,
            vec![Row::from_values(["a", "b"]), Row::from_values(["1", "2"])]
        );
        Ok(())
    }

    #[test]
    fn escaped_enclosure_should_decode_to_literal() -> Result<(), CsvError> {
        let rows = decode("name\n\"Smith \"\"Janey\"\"\"\n", &Options::default())?;

        assert_eq!(scalar(&rows[0], "name"), "Smith \"Janey\"");
        Ok(())
    }

    #[test]
    fn custom_escape_should_decode_to_literal() -> Result<(), CsvError> {
        let options = Options::builder().escape(b'\\').build();

        let rows = decode("name\n\"Smith \\\"Janey\\\"\"\n", &options)?;

        assert_eq!(scalar(&rows[0], "name"), "Smith \"Janey\"");
        Ok(())
    }

    #[test]
    fn enclosed_line_break_should_stay_in_field() -> Result<(), CsvError> {
        let rows = decode("id,notes\n1,\"Hello\nWorld\"\n2,Bye\n", &Options::default())?;

        assert_eq!(rows.len(), 2);
        assert_eq!(scalar(&rows[0], "notes"), "Hello\nWorld");
        Ok(())
    }

    #[test]
    fn custom_delimiter_should_split_fields() -> Result<(), CsvError> {
        let options = Options::builder().delimiter(b';').build();

        let rows = decode("a;b\n\"x;y\";z,w\n", &options)?;

        assert_eq!(rows[0], Row::from_pairs([("a", "x;y"), ("b", "z,w")]));
        Ok(())
    }

    #[test]
    fn encoded_rows_should_decode_back() -> Result<(), CsvError> {
        let rows = vec![
            Row::from_pairs([("first_name", "Bob"), ("last_name", "Smith, III")]),
            Row::from_pairs([("first_name", "Jane"), ("last_name", "Smith \"Janey\"")]),
            Row::from_pairs([("first_name", "Jim"), ("last_name", "Smith, Jr. \"Junior\"")]),
        ];
        let options = Options::default();

        assert_eq!(decode(&encode(rows.clone(), &options), &options)?, rows);
        Ok(())
    }

    #[test]
    fn folded_newlines_should_decode_to_a_single_record() -> Result<(), CsvError> {
        let options = Options::builder().preserve_embedded_newlines(false).build();
        let rows = vec![Row::from_pairs([
            ("first_name", "Bob"),
            ("notes", "Hello What's up?\nHow are you doing?\nI'm doing fine!"),
        ])];

        let decoded = decode(&encode(rows, &options), &options)?;

        assert_eq!(decoded.len(), 1);
        assert_eq!(
            scalar(&decoded[0], "notes"),
            "Hello What's up? How are you doing? I'm doing fine!"
        );
        Ok(())
    }

    #[test]
    fn enclosed_empty_field_should_not_be_blank() -> Result<(), CsvError> {
        let rows = decode("name\n\"\"\n  \nBob\n", &Options::default())?;

        assert_eq!(
            rows,
            vec![
                Row::from_pairs([("name", "")]),
                Row::from_pairs([("name", "Bob")]),
            ]
        );
        Ok(())
    }

    #[test]
    fn custom_escape_should_round_trip_backslashes() -> Result<(), CsvError> {
        let options = Options::builder().escape(b'\\').build();
        let rows = vec![Row::from_pairs([
            ("path", "C:\\dir, x"),
            ("plain", "a\\b"),
            ("quote", "say \"hi\", \\o/"),
        ])];

        assert_eq!(decode(&encode(rows.clone(), &options), &options)?, rows);
        Ok(())
    }

    #[test]
    fn validity_should_only_need_one_field() {
        assert!(is_valid("first_name,last_name\nBob,Smith"));
        assert!(is_valid("\n\njust text"));
        assert!(!is_valid(""));
        assert!(!is_valid("  \n \r\n"));
    }
}
