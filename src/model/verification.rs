//! Outcomes of classification and signature verification.

use serde::Serialize;

/// Result of inspecting a message's structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    NotSigned,
    CandidateSigned,
}

/// Trust verdict of a signature check. There is no "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    Invalid,
}

/// Per-message verification state for one render cycle.
///
/// Never stored beyond the cycle that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    #[default]
    NotSigned,
    /// Signed structure found, but no verdict was reached (e.g. the raw
    /// bytes could not be retrieved).
    SignedPendingVerification,
    SignedValid,
    SignedInvalid,
}

impl VerificationState {
    pub fn is_signed(self) -> bool {
        !matches!(self, Self::NotSigned)
    }

    /// The verdict to display. Only `SignedValid` counts as valid.
    pub fn verdict(self) -> Option<Verdict> {
        match self {
            Self::NotSigned => None,
            Self::SignedValid => Some(Verdict::Valid),
            Self::SignedInvalid | Self::SignedPendingVerification => Some(Verdict::Invalid),
        }
    }
}

impl From<Verdict> for VerificationState {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Valid => Self::SignedValid,
            Verdict::Invalid => Self::SignedInvalid,
        }
    }
}
