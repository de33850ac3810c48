//! `smimecheck`: S/MIME signature verification for mail viewers.
//!
//! This crate detects `multipart/signed` messages with a PKCS#7 signature,
//! verifies them against configured trust anchors, and annotates the
//! displayed header set with a trust indicator.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod smime;
pub mod store;
