/// Rows, fields and the records handed to the encoder
pub mod row;

/// Dialect and shaping options
pub mod options;

/// File access used by the append path and the document helpers
pub mod storage;
