//! Threshold Signing
//!
//! Any `t` out of `n` signers jointly produce a regular Schnorr [signature](crate::schnorr::Signature)
//! that verifies under the group public key. Two flavours of the protocol are provided:
//!
//! ## Interactive
//! [`InteractiveCosigner`](interactive::InteractiveCosigner) samples fresh nonces in every session:
//! 1. [Round 1](interactive::InteractiveCosigner::round1): each signer publishes commitments
//!    to a fresh nonce pair. Message doesn't need to be known yet.
//! 2. [Round 2](interactive::InteractiveCosigner::round2): once commitments of all other
//!    signers are received, each signer issues a [partial signature](utils::PartialSignature).
//! 3. Designated aggregators [aggregate](interactive::InteractiveCosigner::aggregate) partial
//!    signatures into the final signature.
//!
//! When `full-signing` feature is enabled, [`full_signing`] carries out all the steps over
//! the [`round_based`] transport.
//!
//! ## Non-interactive
//! Nonces are taken from a batch agreed upon during [pre-generation](crate::pregen), so
//! [`NonInteractiveCosigner`](noninteractive::NonInteractiveCosigner) issues a partial signature
//! right away, without any round of communication. Every pre-signature is single-use.
//!
//! ## Aggregation
//! Partial signatures are combined by [`SignatureAggregator`](aggregate::SignatureAggregator).
//! If public key shares of signers are known to the aggregator, every partial signature is
//! checked individually, and a misbehaving signer is reported via
//! [`Error::IdentifiableAbort`](crate::Error::IdentifiableAbort).

pub mod aggregate;
#[cfg(feature = "full-signing")]
pub mod full_signing;
pub mod interactive;
pub mod noninteractive;
pub mod utils;

pub use self::{
    aggregate::SignatureAggregator, interactive::InteractiveCosigner,
    noninteractive::NonInteractiveCosigner, utils::{NonceCommitment, PartialSignature},
};
