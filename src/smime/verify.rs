//! Signature verifier: PKCS#7 detached-signature check of a materialized message.

use std::path::Path;

use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use openssl::x509::X509;
use tracing::{debug, warn};

use crate::error::{Result, SmimeError};
use crate::model::verification::Verdict;

use super::trust::TrustConfiguration;

/// Verify the S/MIME message stored at `artifact` against `trust`.
///
/// Every failure, whatever its cause, is reported as [`Verdict::Invalid`].
pub fn verify(artifact: &Path, trust: &TrustConfiguration) -> Verdict {
    match check_signature(artifact, trust) {
        Ok(()) => Verdict::Valid,
        Err(e @ SmimeError::TrustBundle { .. }) => {
            warn!(error = %e, "Trust anchors unusable, rejecting signature");
            Verdict::Invalid
        }
        Err(e) => {
            debug!(path = %artifact.display(), error = %e, "Signature rejected");
            Verdict::Invalid
        }
    }
}

/// The fallible core of [`verify`].
///
/// Parses the `multipart/signed` body, checks the digest over the first part
/// and validates the signer chain against the configured anchors only. The
/// signed content is extracted as text and thrown away.
pub fn check_signature(artifact: &Path, trust: &TrustConfiguration) -> Result<()> {
    let raw = std::fs::read(artifact).map_err(|e| SmimeError::io(artifact, e))?;
    let (pkcs7, detached_content) = Pkcs7::from_smime(&raw)?;

    let store = trust.build_store()?;
    let extra_certs = Stack::<X509>::new()?;
    let mut signed_text = Vec::new();

    pkcs7.verify(
        &extra_certs,
        &store,
        detached_content.as_deref(),
        Some(&mut signed_text),
        Pkcs7Flags::TEXT,
    )?;
    Ok(())
}
