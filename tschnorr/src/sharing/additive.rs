//! Additive Secret Sharing
//!
//! `n` out of `n` sharing: the secret is the sum of all shares. Signing uses additive
//! shares implicitly, when a quorum member scales its Shamir share by its Lagrange
//! coefficient.

use alloc::{collections::BTreeSet, vec::Vec};

use generic_ec::{Curve, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::{Error, ShareholderId};

use super::shamir::Secret;

/// Additive share
#[derive(Clone)]
pub struct Share<E: Curve> {
    /// Shareholder that owns the share
    pub id: ShareholderId,
    /// Share value
    pub value: SecretScalar<E>,
}

impl<E: Curve> core::fmt::Debug for Share<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("additive::Share")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Splits the secret into additive shares, one per shareholder
pub fn deal<E: Curve>(
    secret: &Secret<E>,
    shareholders: &[ShareholderId],
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Vec<Share<E>>, Error> {
    let Some((&last, rest)) = shareholders.split_last() else {
        return Err(Error::IsZero("set of shareholders"));
    };
    ensure_distinct(shareholders)?;

    let mut remainder = *secret.as_ref();
    let mut shares = Vec::with_capacity(shareholders.len());
    for &id in rest {
        let value = SecretScalar::<E>::random(&mut *rng);
        let v: &Scalar<E> = value.as_ref();
        remainder -= v;
        shares.push(Share { id, value });
    }
    shares.push(Share {
        id: last,
        value: SecretScalar::new(&mut remainder),
    });
    Ok(shares)
}

/// Reconstructs the secret by summing up all the shares
pub fn reconstruct<E: Curve>(shares: &[Share<E>]) -> Result<Secret<E>, Error> {
    if shares.is_empty() {
        return Err(Error::IsZero("set of shares"));
    }
    ensure_distinct(&shares.iter().map(|s| s.id).collect::<Vec<_>>())?;

    let mut secret = Scalar::zero();
    for share in shares {
        let v: &Scalar<E> = share.value.as_ref();
        secret += v;
    }
    Ok(Secret::new(SecretScalar::new(&mut secret)))
}

fn ensure_distinct(ids: &[ShareholderId]) -> Result<(), Error> {
    let mut seen = BTreeSet::new();
    if ids.iter().all(|id| seen.insert(*id)) {
        Ok(())
    } else {
        Err(Error::Duplicate("shareholder id"))
    }
}
