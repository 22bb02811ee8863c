//! Conversion between rows and CSV text.
//!
//! - [`encoder`] writes rows as text: header derivation, quoting, escaping,
//!   truncation and nested-value projection.
//! - [`decoder`] reads text back into rows, splitting records with quote
//!   awareness and falling back to positional rows on shape mismatch.
//! - [`append`] validates an existing file's header and appends rows to it,
//!   reusing the encoder's row serialization.

/// Encoding of rows into CSV text.
pub mod encoder;

/// Decoding of CSV text into rows.
pub mod decoder;

/// Appending rows to existing CSV files.
pub mod append;
