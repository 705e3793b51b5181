//! Errors
//!
//! Every fallible operation in the crate returns [`Error`]. Variants are grouped into
//! [kinds](ErrorKind) so callers can branch on the class of failure without matching
//! every variant. None of them are transient: a failed session must be restarted from
//! scratch with fresh nonces.

use thiserror::Error;

use crate::ShareholderId;

/// Class of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required input is absent (e.g. nil message)
    IsNil,
    /// Input is present but has zero length
    IsZero,
    /// Malformed input, out-of-range index or reused nonce
    Validation,
    /// Party is not authorized by the access structure
    Membership,
    /// Wrong number of messages, shares or participants
    Count,
    /// Set of shares is not authorized to reconstruct the secret
    Failed,
    /// Repeated nonce commitment or share
    Duplicate,
    /// Received point is the group identity
    IsIdentity,
    /// Received point doesn't decode to a valid curve point
    NotOnCurve,
    /// Expected message from a participant never arrived
    Missing,
    /// Attestation, share or signature didn't verify
    Verification,
    /// Specific participant misbehaved, see [`Error::culprit`]
    IdentifiableAbort,
    /// Round function invoked out of sequence
    Round,
    /// Internal invariant violated
    Bug,
}

/// Error returned by sharing, pre-generation, signing and aggregation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Required input is absent
    #[error("{0} is nil")]
    IsNil(&'static str),
    /// Input has zero length
    #[error("{0} is empty")]
    IsZero(&'static str),
    /// Malformed input
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Pre-signature at this index was already consumed
    #[error("pre-signature at index {0} has already been used")]
    NonceReuse(usize),
    /// Private nonce pair doesn't match the commitment published in the batch
    #[error("private nonce pair at index {0} doesn't match published commitment")]
    NonceMismatch(usize),
    /// Shareholder is not part of the access structure
    #[error("shareholder {0} is not a member of the access structure")]
    Membership(ShareholderId),
    /// Fewer than `threshold` distinct shareholders
    #[error("not authorized: {got} distinct shareholders, at least {threshold} required")]
    NotAuthorized {
        /// Reconstruction threshold
        threshold: u16,
        /// Number of distinct shareholders that were provided
        got: usize,
    },
    /// Wrong number of items
    #[error("expected {expected} {what}, got {got}")]
    Count {
        /// What's being counted
        what: &'static str,
        /// Expected amount
        expected: usize,
        /// Actual amount
        got: usize,
    },
    /// Repeated item
    #[error("duplicate {0}")]
    Duplicate(&'static str),
    /// Point is the identity element
    #[error("{0} is the identity element")]
    IsIdentity(&'static str),
    /// Point encoding is not valid
    #[error("{0} is not a valid curve point")]
    NotOnCurve(&'static str),
    /// Message from the participant is missing
    #[error("missing message from participant {0}")]
    Missing(ShareholderId),
    /// Attestation over a nonce commitment is invalid
    #[error("invalid attestation from participant {0}")]
    InvalidAttestation(ShareholderId),
    /// Share doesn't match the verification vector
    #[error("share of participant {0} doesn't match verification vector")]
    InvalidShare(ShareholderId),
    /// Final signature doesn't verify under the public key
    #[error("invalid signature")]
    InvalidSignature,
    /// Participant produced an invalid partial signature
    #[error("participant {0} is misbehaving")]
    IdentifiableAbort(ShareholderId),
    /// Round function invoked in a wrong state
    #[error("round mismatch: expected state `{expected}`, actual state `{actual}`")]
    RoundMismatch {
        /// State required by the round
        expected: &'static str,
        /// State the participant is in
        actual: &'static str,
    },
    /// Bug occurred
    #[error("bug occurred: {0}")]
    Bug(&'static str),
}

impl Error {
    /// Returns class of the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IsNil(_) => ErrorKind::IsNil,
            Error::IsZero(_) => ErrorKind::IsZero,
            Error::InvalidArgument(_) | Error::NonceReuse(_) | Error::NonceMismatch(_) => {
                ErrorKind::Validation
            }
            Error::Membership(_) => ErrorKind::Membership,
            Error::NotAuthorized { .. } => ErrorKind::Failed,
            Error::Count { .. } => ErrorKind::Count,
            Error::Duplicate(_) => ErrorKind::Duplicate,
            Error::IsIdentity(_) => ErrorKind::IsIdentity,
            Error::NotOnCurve(_) => ErrorKind::NotOnCurve,
            Error::Missing(_) => ErrorKind::Missing,
            Error::InvalidAttestation(_) | Error::InvalidShare(_) | Error::InvalidSignature => {
                ErrorKind::Verification
            }
            Error::IdentifiableAbort(_) => ErrorKind::IdentifiableAbort,
            Error::RoundMismatch { .. } => ErrorKind::Round,
            Error::Bug(_) => ErrorKind::Bug,
        }
    }

    /// Returns the misbehaving participant if the error is an identifiable abort
    pub fn culprit(&self) -> Option<ShareholderId> {
        match self {
            Error::IdentifiableAbort(j) => Some(*j),
            _ => None,
        }
    }

    pub(crate) fn count(what: &'static str, expected: usize, got: usize) -> Self {
        Error::Count {
            what,
            expected,
            got,
        }
    }
}

/// Checks that message to be signed is present and not empty
pub(crate) fn validate_message(msg: Option<&[u8]>) -> Result<&[u8], Error> {
    match msg {
        None => Err(Error::IsNil("message")),
        Some([]) => Err(Error::IsZero("message")),
        Some(msg) => Ok(msg),
    }
}
