//! Email parsing: MBOX splitting, header decoding, and MIME structure extraction.

pub mod header;
pub mod mbox;
pub mod mime;
