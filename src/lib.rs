#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # CSV codec

 Converts between an in-memory table, an ordered list of rows mapping column
 names to values, and CSV text. Existing CSV files can be extended one row at
 a time after checking that their header matches.

 ## Core Concepts

- **Row:** either a keyed row (column name to field) or a positional row (a plain
  list of fields). Decoding yields positional rows when a record does not line up
  with the header.
- **Field:** a scalar string, or a nested value (a mapping, a sequence of mappings)
  that a `map` or `columns` projection reduces to a scalar when encoding.
- **Options:** the dialect (delimiter, enclosure, escape) and shaping rules (header
  row, newline folding, truncation, excluded/included columns, projections).
- **Csv:** an optional document wrapper caching the last text and row snapshots.

 ## Dialect

 The default dialect is comma delimited, double-quote enclosed and
 double-quote escaped. Any single ASCII character can be used for each role.

 ## Getting Started

```rust
use csv_codec::{
    codec::{decoder::decode, encoder::encode},
    core::{options::Options, row::{Field, Row}},
};

let rows = vec![
    Row::from_pairs([("first_name", "Bob"), ("last_name", "Smith, III")]),
    Row::from_pairs([("first_name", "Jane"), ("last_name", "Smith \"Janey\"")]),
];

let options = Options::default();
let csv = encode(rows.clone(), &options);
assert!(csv.contains("Jane,\"Smith \"\"Janey\"\"\""));

let decoded = decode(&csv, &options).unwrap();
assert_eq!(decoded, rows);
assert_eq!(decoded[0].get("last_name"), Some(&Field::from("Smith, III")));
```

 Loosely typed input is accepted through `serde_json`:

```rust
use csv_codec::{codec::encoder::encode, core::{options::Options, row::Records}};
use serde_json::json;

let records = Records::from_json(&json!([
    {"username": "bobsmith", "country": {"id": 1, "code": "US"}},
    {"username": "janesmith", "country": {"id": 2, "code": "FR"}}
])).unwrap();
let options = Options::from_json(&json!({"map": {"country": "code"}})).unwrap();

let csv = encode(records, &options);
assert!(csv.contains("bobsmith,US\n"));
assert!(csv.contains("janesmith,FR\n"));
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Data model, options and file access
pub mod core;

/// Encoder, decoder and append path
pub mod codec;

/// Stateful document and file helpers
pub mod document;

/// Error types for codec operations
pub mod error;

#[doc(inline)]
pub use error::*;

pub use codec::{
    append::{append_row, append_rows},
    decoder::{decode, is_valid},
    encoder::{encode, serialize_row, template},
};
pub use document::Csv;
