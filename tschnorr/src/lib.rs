//! Threshold Schnorr signatures with identifiable abort
//!
//! Any `t` out of `n` shareholders jointly produce a regular Schnorr signature that verifies
//! under the group public key, while no coalition of fewer than `t` shareholders learns
//! anything about the secret key. Signing follows the two-nonce construction of [FROST][draft]:
//! every signer commits to a hiding and a binding nonce, and nonces are bound to the message
//! and the set of signers before they're used.
//!
//! This crate provides:
//! * [Secret sharing](sharing) \
//!   Shamir, Feldman-verifiable and additive sharing, along with conversion of Shamir shares
//!   into additive ones for a fixed quorum
//! * [Key distribution](keys) \
//!   [Trusted dealer](keys::trusted_dealer) that produces a [`Shard`] per shareholder, or
//!   distributed key generation based on [CGGMP21] when `cggmp21-keygen` feature is enabled
//!   (see [`Shard::from_key_share`])
//! * [Nonce pre-generation](pregen) \
//!   Shareholders agree on a batch of attested nonce commitments ahead of time, so signing
//!   later takes no rounds of communication
//! * [Signing](mod@signing) \
//!   Interactive (two rounds with fresh nonces) and non-interactive (from a pre-generated batch)
//!   signing, aggregation of partial signatures with identifiable abort, and a full
//!   interactive protocol over [`round_based`] transport when `full-signing` feature is enabled
//!
//! Every fallible operation returns [`Error`], classified by [`ErrorKind`].
//!
//! The crate is `no_std` compatible (requires `alloc`) when `std` feature is turned off.
//!
//! [CGGMP21]: https://github.com/dfns/cggmp21
//! [draft]: https://www.ietf.org/archive/id/draft-irtf-cfrg-frost-15.html

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![forbid(unsafe_code)]
#![cfg_attr(not(test), forbid(unused_crate_dependencies))]
#![deny(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
#![deny(missing_docs)]
#![allow(clippy::type_complexity)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub use generic_ec;
#[cfg(feature = "full-signing")]
pub use round_based;

pub mod ciphersuite;
pub mod errors;
pub mod identity;
pub mod keys;
pub mod pregen;
pub mod schnorr;
pub mod sharing;
pub mod signing;

/// Key share produced by distributed key generation
///
/// This module re-exports type definitions from [`key_share`](::key_share) crate. Key shares
/// are turned into shards via [`Shard::from_key_share`].
pub mod key_share {
    #[doc(inline)]
    pub use key_share::{
        CoreKeyShare as KeyShare, DirtyCoreKeyShare as DirtyKeyShare, DirtyKeyInfo,
        InvalidCoreShare as InvalidKeyShare, KeyInfo, Validate, VssSetup,
    };
}

/// Distributed Key Generation (DKG) protocol based on CGGMP21 paper
///
/// This module just re-exports [`cggmp21_keygen`] crate when `cggmp21-keygen` feature is enabled.
/// Output of threshold keygen can be converted into a [`Shard`] via [`Shard::from_key_share`].
#[cfg(feature = "cggmp21-keygen")]
pub mod keygen {
    #[doc(inline)]
    pub use cggmp21_keygen::*;
}

#[cfg(feature = "cggmp21-keygen")]
#[doc(inline)]
pub use cggmp21_keygen::keygen;

pub use self::{
    ciphersuite::Ciphersuite,
    errors::{Error, ErrorKind},
    keys::Shard,
};

/// Shareholder identifier
///
/// Ids are positive: shareholder `i` holds the evaluation of the sharing polynomial at `x = i`.
pub type ShareholderId = u16;

/// Interactive Signing
///
/// Carries out the full interactive signing protocol over [`round_based`] transport: each
/// signer commits to fresh nonces, issues a partial signature and aggregates all partial
/// signatures into the final signature.
///
/// ## Inputs
/// * Index of the signer in `signers`, which is also its index at the transport layer
/// * Shard of the signer
/// * Ids of all signers of the session, at least threshold of them
/// * `msg` to be signed
///
/// ## Example
/// ```rust,no_run
/// use tschnorr::round_based;
/// use tschnorr::ciphersuite::Ed25519;
/// #
/// # fn retrieve_shard() -> tschnorr::Shard<<Ed25519 as tschnorr::Ciphersuite>::Curve> { unimplemented!() }
/// # fn join_network<M>() -> (u16, impl round_based::Delivery<M>) {
/// #     (0, (futures::stream::pending::<Result<_, std::convert::Infallible>>(), futures::sink::drain()))
/// # }
/// # async fn __doc() -> Result<(), tschnorr::signing::full_signing::FullSigningError> {
///
/// let shard = retrieve_shard();
/// let (i, delivery) = join_network();
/// let signers = [1, 2, 3];
/// let msg = b"Hello, TSS World!";
///
/// let party = round_based::MpcParty::connected(delivery);
/// let sig = tschnorr::signing::<Ed25519>(i, &shard, &signers, msg)
///     .sign(&mut rand_core::OsRng, party)
///     .await?;
/// # Ok(()) }
/// ```
#[cfg(feature = "full-signing")]
pub fn signing<'a, C: Ciphersuite>(
    i: u16,
    shard: &'a Shard<C::Curve>,
    signers: &'a [ShareholderId],
    msg: &'a [u8],
) -> signing::full_signing::SigningBuilder<'a, C> {
    signing::full_signing::SigningBuilder::new(i, shard, signers, msg)
}
