//! Trust anchors used to validate signer certificate chains.

use std::path::{Path, PathBuf};

use openssl::ssl::SslFiletype;
use openssl::x509::store::{X509Lookup, X509Store, X509StoreBuilder};
use openssl::x509::X509;
use tracing::debug;

use crate::error::{Result, SmimeError};

/// Ordered list of trust-anchor bundle locations.
///
/// A path may be a PEM file holding one or more certificates, or an
/// OpenSSL hashed certificate directory (`c_rehash` layout). Loaded once
/// and never modified; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustConfiguration {
    paths: Vec<PathBuf>,
}

impl TrustConfiguration {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// No anchors at all: every signer is rejected.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Build a certificate store holding exactly the configured anchors.
    ///
    /// System default locations are never consulted. Any unreadable path
    /// fails the whole build.
    pub fn build_store(&self) -> Result<X509Store> {
        let mut builder = X509StoreBuilder::new()?;
        for path in &self.paths {
            if path.is_dir() {
                add_directory(&mut builder, path)?;
            } else {
                add_bundle(&mut builder, path)?;
            }
        }
        Ok(builder.build())
    }
}

fn add_bundle(builder: &mut X509StoreBuilder, path: &Path) -> Result<()> {
    let pem = std::fs::read(path).map_err(|e| SmimeError::TrustBundle {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let certs = X509::stack_from_pem(&pem).map_err(|e| SmimeError::TrustBundle {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if certs.is_empty() {
        return Err(SmimeError::TrustBundle {
            path: path.to_path_buf(),
            reason: "no PEM certificates found".to_string(),
        });
    }

    debug!(path = %path.display(), count = certs.len(), "Loaded trust bundle");
    for cert in certs {
        builder.add_cert(cert)?;
    }
    Ok(())
}

fn add_directory(builder: &mut X509StoreBuilder, path: &Path) -> Result<()> {
    let dir = path.to_str().ok_or_else(|| SmimeError::TrustBundle {
        path: path.to_path_buf(),
        reason: "directory path is not valid UTF-8".to_string(),
    })?;
    builder
        .add_lookup(X509Lookup::hash_dir())?
        .add_dir(dir, SslFiletype::PEM)
        .map_err(|e| SmimeError::TrustBundle {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    debug!(path = %path.display(), "Registered trust directory");
    Ok(())
}
