//! Centralized error types for smimecheck.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::message::MessageUid;

/// All errors produced by the smimecheck library.
#[derive(Error, Debug)]
pub enum SmimeError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file or directory does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The file does not appear to be a valid MBOX.
    #[error("File does not appear to be a valid MBOX: {0}")]
    InvalidMbox(PathBuf),

    /// The mail store has no message with this identifier.
    #[error("No message with uid '{0}'")]
    MessageNotFound(MessageUid),

    /// The raw bytes of a message could not be materialized for verification.
    #[error("Could not retrieve raw body of message '{uid}': {source}")]
    Retrieval {
        uid: MessageUid,
        source: Box<SmimeError>,
    },

    /// The cryptographic backend is not usable in this process.
    #[error("S/MIME verification unavailable: {0}")]
    EnvironmentUnavailable(String),

    /// A configured trust-anchor bundle could not be loaded.
    #[error("Cannot load trust anchors from '{path}': {reason}")]
    TrustBundle { path: PathBuf, reason: String },

    /// An error reported by OpenSSL.
    #[error("OpenSSL error: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),
}

/// Convenience alias for `Result<T, SmimeError>`.
pub type Result<T> = std::result::Result<T, SmimeError>;

impl SmimeError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Map a `NotFound` I/O error to [`SmimeError::FileNotFound`], anything else to `Io`.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Wrap an error as a retrieval failure for `uid`.
    pub fn retrieval(uid: &MessageUid, source: SmimeError) -> Self {
        Self::Retrieval {
            uid: uid.clone(),
            source: Box::new(source),
        }
    }
}

/// Allow `?` on `std::io::Error` when no path context is available
/// (rare, prefer `SmimeError::io`).
impl From<std::io::Error> for SmimeError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
