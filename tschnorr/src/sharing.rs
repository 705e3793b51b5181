//! Secret Sharing
//!
//! * [shamir]: threshold sharing: any `t` out of `n` shares reconstruct the secret
//! * [feldman]: Shamir sharing with a public verification vector
//! * [additive]: `n` out of `n` sharing, obtained from Shamir shares by
//!   [converting](shamir::Scheme::convert_share_to_additive) them for a fixed quorum
//!
//! Shareholder `i` is associated with the field node `x_i = i`. Node `0` is reserved for
//! the secret, so [`ShareholderId`] zero is never valid.

use generic_ec::{Curve, NonZero, Scalar};

use crate::{Error, ShareholderId};

pub mod additive;
pub mod feldman;
pub mod shamir;

pub use shamir::lagrange_coefficients;

/// Returns field node associated with the shareholder
///
/// Returns error if `id` is zero.
pub fn shareholder_node<E: Curve>(id: ShareholderId) -> Result<NonZero<Scalar<E>>, Error> {
    NonZero::from_scalar(Scalar::from(id)).ok_or(Error::InvalidArgument("shareholder id is zero"))
}
