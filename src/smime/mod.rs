//! S/MIME signature detection, verification, and header annotation.
//!
//! One render cycle per viewed message:
//!
//! 1. [`classify`] decides from the parsed structure whether the message is
//!    `multipart/signed` with an `application/pkcs7-signature` part.
//! 2. [`materialize`] copies the raw stored bytes into a scoped temp file.
//! 3. [`verify`] checks the PKCS#7 signature against the trust anchors.
//! 4. [`annotate`] adds the trust indicator to the header rows.
//!
//! [`Smime`] ties the steps together and is shared by all cycles;
//! [`RenderCycle`] carries the per-message state between the two host hooks.

pub mod annotate;
pub mod classify;
pub mod cycle;
pub mod materialize;
pub mod trust;
pub mod verify;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use openssl::hash::{hash, MessageDigest};
use openssl::x509::store::X509StoreBuilder;
use tracing::{info, warn};

use crate::config::SmimeConfig;
use crate::error::{Result, SmimeError};
use crate::model::message::Message;
use crate::model::verification::{Classification, VerificationState};
use crate::store::MailStore;

pub use annotate::annotate;
pub use classify::{classify, classify_message};
pub use cycle::RenderCycle;
pub use materialize::{materialize, TemporaryArtifact};
pub use trust::TrustConfiguration;
pub use verify::verify;

/// Check that the OpenSSL primitives needed for PKCS#7 verification work.
pub fn probe_environment() -> Result<()> {
    let unavailable =
        |e: openssl::error::ErrorStack| SmimeError::EnvironmentUnavailable(e.to_string());
    openssl::init();
    X509StoreBuilder::new().map_err(unavailable)?;
    hash(MessageDigest::sha256(), b"").map_err(unavailable)?;
    Ok(())
}

/// The S/MIME subsystem: trust anchors plus an availability flag.
///
/// Immutable after construction and `Send + Sync`; share one instance
/// across all render cycles.
#[derive(Debug, Clone)]
pub struct Smime {
    trust: Arc<TrustConfiguration>,
    temp_dir: Option<PathBuf>,
    enabled: bool,
}

impl Smime {
    /// Create the subsystem, probing the crypto backend once.
    pub fn new(trust: TrustConfiguration) -> Self {
        Self::with_probe(trust, probe_environment)
    }

    /// Create the subsystem from the `[smime]` config section.
    pub fn from_config(config: &SmimeConfig) -> Self {
        let smime = Self::new(config.trust_configuration());
        match &config.temp_dir {
            Some(dir) => smime.with_temp_dir(dir),
            None => smime,
        }
    }

    /// Like [`Smime::new`] with a custom environment check.
    ///
    /// A failing probe disables the subsystem with a single warning; every
    /// message is then reported as unsigned.
    pub fn with_probe(trust: TrustConfiguration, probe: impl FnOnce() -> Result<()>) -> Self {
        let enabled = match probe() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "S/MIME verification disabled");
                false
            }
        };
        Self {
            trust: Arc::new(trust),
            temp_dir: None,
            enabled,
        }
    }

    /// Materialize raw messages under `dir` instead of the system temp dir.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn trust(&self) -> &TrustConfiguration {
        &self.trust
    }

    pub fn temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    /// Start a render cycle reading raw bytes from `store`.
    pub fn cycle<'a>(&'a self, store: &'a dyn MailStore) -> RenderCycle<'a> {
        RenderCycle::new(self, store)
    }

    /// Classify `message` and, if it is signed, verify it.
    ///
    /// Unsigned messages never touch the store or the filesystem. A message
    /// whose raw bytes cannot be retrieved stays
    /// [`VerificationState::SignedPendingVerification`].
    pub fn classify_and_verify(
        &self,
        message: &Message,
        store: &dyn MailStore,
    ) -> VerificationState {
        if !self.enabled {
            return VerificationState::NotSigned;
        }
        if classify_message(message) == Classification::NotSigned {
            return VerificationState::NotSigned;
        }

        let artifact = match materialize(&message.uid, store, self.temp_dir()) {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(uid = %message.uid, error = %e, "Cannot verify signed message");
                return VerificationState::SignedPendingVerification;
            }
        };

        let verdict = verify(artifact.path(), &self.trust);
        if let Err(e) = artifact.close() {
            warn!(uid = %message.uid, error = %e, "Failed to remove verification artifact");
        }

        info!(uid = %message.uid, ?verdict, "Checked S/MIME signature");
        verdict.into()
    }
}
