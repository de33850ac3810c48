//! Core data model: messages, MIME trees, verification outcomes, and header rows.

pub mod header_output;
pub mod message;
pub mod mime;
pub mod verification;
