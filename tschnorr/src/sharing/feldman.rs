//! Feldman Verifiable Secret Sharing
//!
//! Dealer publishes commitments $V_k = g^{a_k}$ to the coefficients of the dealing
//! polynomial. Shareholder `i` checks its share against them without learning anything
//! about the secret:
//!
//! $$g^{f(x_i)} = \prod_k V_k^{x_i^k}$$

use alloc::vec::Vec;

use generic_ec::{Curve, Point, Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::{Error, ShareholderId};

use super::{
    shamir::{DealerOutput, Scheme, Secret, Share},
    shareholder_node,
};

/// Commitments to the coefficients of the dealing polynomial
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct VerificationVector<E: Curve>(Vec<Point<E>>);

impl<E: Curve> VerificationVector<E> {
    /// Constructs verification vector from commitments $V_0, \dots, V_{t-1}$
    pub fn new(commitments: Vec<Point<E>>) -> Self {
        Self(commitments)
    }

    /// Commitments $V_0, \dots, V_{t-1}$
    pub fn commitments(&self) -> &[Point<E>] {
        &self.0
    }

    /// Amount of commitments, equals to the threshold of the dealing
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether the vector has no commitments
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Commitment to the secret, $V_0 = g^{secret}$
    pub fn public_point(&self) -> Option<&Point<E>> {
        self.0.first()
    }

    /// Computes $g^{f(x_i)}$: the public counterpart of the share of shareholder `id`
    pub fn evaluate(&self, id: ShareholderId) -> Result<Point<E>, Error> {
        let x = shareholder_node::<E>(id)?;
        let x: &Scalar<E> = x.as_ref();
        Ok(self
            .0
            .iter()
            .rev()
            .fold(Point::zero(), |acc, v_k| acc * x + v_k))
    }

    /// Verifies the share against the commitments
    pub fn verify(&self, share: &Share<E>) -> Result<(), Error> {
        let expected = self.evaluate(share.id)?;
        let value: &Scalar<E> = share.value.as_ref();
        if Point::generator() * value == expected {
            Ok(())
        } else {
            Err(Error::InvalidShare(share.id))
        }
    }
}

/// Shares the secret and publishes verification vector
pub fn deal<E: Curve>(
    scheme: &Scheme,
    secret: &Secret<E>,
    rng: &mut (impl RngCore + CryptoRng),
) -> (DealerOutput<E>, VerificationVector<E>) {
    let (output, func) = scheme.deal_and_reveal_dealer_func(secret, rng);
    (output, func.verification_vector())
}

/// Verifies every share and reconstructs the secret
///
/// Returns [`Error::InvalidShare`] naming the first share (in the given order) that
/// doesn't match the verification vector.
pub fn reconstruct_and_verify<E: Curve>(
    scheme: &Scheme,
    shares: &[Share<E>],
    verification_vector: &VerificationVector<E>,
) -> Result<Secret<E>, Error> {
    let threshold = usize::from(scheme.threshold());
    if verification_vector.len() != threshold {
        return Err(Error::count(
            "verification vector commitments",
            threshold,
            verification_vector.len(),
        ));
    }
    for share in shares {
        if !scheme.shareholders().contains(&share.id) {
            return Err(Error::Membership(share.id));
        }
        verification_vector.verify(share)?;
    }

    let secret = scheme.reconstruct(shares)?;
    if Some(&secret.public_point()) != verification_vector.public_point() {
        return Err(Error::Bug(
            "reconstructed secret doesn't match verification vector",
        ));
    }
    Ok(secret)
}
