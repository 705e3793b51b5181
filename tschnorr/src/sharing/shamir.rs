//! Shamir Secret Sharing
//!
//! Secret is the constant term of a random polynomial of degree `t - 1`, shareholder `i`
//! receives evaluation of the polynomial at its [node](super::shareholder_node). Any `t`
//! shares reconstruct the secret via Lagrange interpolation at `x = 0`, fewer than `t` shares
//! reveal nothing about it.

use alloc::{collections::{BTreeMap, BTreeSet}, vec::Vec};
use core::iter;

use generic_ec::{Curve, NonZero, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::{Error, ShareholderId};

use super::{additive, feldman::VerificationVector, shareholder_node};

/// Secret being shared
#[derive(Clone)]
pub struct Secret<E: Curve>(SecretScalar<E>);

impl<E: Curve> Secret<E> {
    /// Wraps a secret scalar
    pub fn new(secret: SecretScalar<E>) -> Self {
        Self(secret)
    }

    /// Samples a uniformly random secret
    pub fn random(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        Self(SecretScalar::random(rng))
    }

    /// Returns the secret scalar
    pub fn as_secret_scalar(&self) -> &SecretScalar<E> {
        &self.0
    }

    /// Returns `g^secret`
    pub fn public_point(&self) -> Point<E> {
        Point::generator() * self.as_ref()
    }
}

impl<E: Curve> AsRef<Scalar<E>> for Secret<E> {
    fn as_ref(&self) -> &Scalar<E> {
        self.0.as_ref()
    }
}

impl<E: Curve> core::fmt::Debug for Secret<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Secret")
    }
}

/// Shamir share: evaluation of the dealing polynomial at the node of shareholder `id`
#[derive(Clone)]
pub struct Share<E: Curve> {
    /// Shareholder that owns the share
    pub id: ShareholderId,
    /// Share value
    pub value: SecretScalar<E>,
}

impl<E: Curve> core::fmt::Debug for Share<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Share")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Shares produced by the dealer, one per shareholder
pub struct DealerOutput<E: Curve> {
    shares: BTreeMap<ShareholderId, Share<E>>,
}

impl<E: Curve> DealerOutput<E> {
    /// Returns all shares, indexed by shareholder
    pub fn shares(&self) -> &BTreeMap<ShareholderId, Share<E>> {
        &self.shares
    }

    /// Returns share of the shareholder
    pub fn share(&self, id: ShareholderId) -> Option<&Share<E>> {
        self.shares.get(&id)
    }

    /// Returns all shares, indexed by shareholder
    pub fn into_shares(self) -> BTreeMap<ShareholderId, Share<E>> {
        self.shares
    }
}

/// Dealing polynomial $f(x) = a_0 + a_1 x + \dots + a_{t-1} x^{t-1}$ where $a_0$ is the secret
pub struct DealerFunc<E: Curve> {
    coefficients: Vec<SecretScalar<E>>,
}

impl<E: Curve> DealerFunc<E> {
    fn sample(secret: &Secret<E>, degree: usize, rng: &mut (impl RngCore + CryptoRng)) -> Self {
        let coefficients = iter::once(secret.0.clone())
            .chain(iter::repeat_with(|| SecretScalar::random(&mut *rng)).take(degree))
            .collect();
        Self { coefficients }
    }

    /// Degree of the polynomial
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Evaluates the polynomial at `x`
    pub fn evaluate(&self, x: &Scalar<E>) -> Scalar<E> {
        self.coefficients
            .iter()
            .rev()
            .fold(Scalar::zero(), |acc, coef| {
                let coef: &Scalar<E> = coef.as_ref();
                acc * x + coef
            })
    }

    /// Lifts every coefficient into the group: $(g^{a_0}, \dots, g^{a_{t-1}})$
    pub fn verification_vector(&self) -> VerificationVector<E> {
        VerificationVector::new(
            self.coefficients
                .iter()
                .map(|coef| {
                    let coef: &Scalar<E> = coef.as_ref();
                    Point::generator() * coef
                })
                .collect(),
        )
    }
}

/// Threshold access structure: any `threshold` distinct shareholders are authorized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    threshold: u16,
    shareholders: BTreeSet<ShareholderId>,
}

impl Scheme {
    /// Constructs a `threshold`-out-of-`shareholders` scheme
    ///
    /// Returns error if threshold is zero or exceeds amount of shareholders, or if
    /// shareholders list contains zero or repeated ids.
    pub fn new(
        threshold: u16,
        shareholders: impl IntoIterator<Item = ShareholderId>,
    ) -> Result<Self, Error> {
        if threshold == 0 {
            return Err(Error::InvalidArgument("threshold must be positive"));
        }
        let mut set = BTreeSet::new();
        for id in shareholders {
            if id == 0 {
                return Err(Error::InvalidArgument("shareholder id is zero"));
            }
            if !set.insert(id) {
                return Err(Error::Duplicate("shareholder id"));
            }
        }
        if usize::from(threshold) > set.len() {
            return Err(Error::count(
                "shareholders",
                usize::from(threshold),
                set.len(),
            ));
        }
        Ok(Self {
            threshold,
            shareholders: set,
        })
    }

    /// Constructs a `threshold`-out-of-`n` scheme with shareholders `1..=n`
    pub fn ordinal(threshold: u16, n: u16) -> Result<Self, Error> {
        Self::new(threshold, 1..=n)
    }

    /// Reconstruction threshold
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Set of shareholders
    pub fn shareholders(&self) -> &BTreeSet<ShareholderId> {
        &self.shareholders
    }

    /// Checks whether the set of shareholders is authorized to reconstruct the secret
    pub fn is_authorized(&self, ids: impl IntoIterator<Item = ShareholderId>) -> bool {
        let mut distinct = BTreeSet::new();
        for id in ids {
            if !self.shareholders.contains(&id) {
                return false;
            }
            distinct.insert(id);
        }
        distinct.len() >= usize::from(self.threshold)
    }

    /// Shares the secret among shareholders
    pub fn deal<E: Curve>(
        &self,
        secret: &Secret<E>,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> DealerOutput<E> {
        self.deal_and_reveal_dealer_func(secret, rng).0
    }

    /// Samples a random secret and shares it among shareholders
    pub fn deal_random<E: Curve>(
        &self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> (DealerOutput<E>, Secret<E>) {
        let secret = Secret::random(rng);
        let output = self.deal(&secret, rng);
        (output, secret)
    }

    /// Shares the secret among shareholders, and returns the dealing polynomial
    ///
    /// Polynomial is needed to build [Feldman verification vector](DealerFunc::verification_vector).
    /// It must be kept secret, as its constant term is the secret.
    pub fn deal_and_reveal_dealer_func<E: Curve>(
        &self,
        secret: &Secret<E>,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> (DealerOutput<E>, DealerFunc<E>) {
        let func = DealerFunc::sample(secret, usize::from(self.threshold) - 1, rng);
        let shares = self
            .shareholders
            .iter()
            .map(|&id| {
                let mut value = func.evaluate(&Scalar::from(id));
                let share = Share {
                    id,
                    value: SecretScalar::new(&mut value),
                };
                (id, share)
            })
            .collect();
        (DealerOutput { shares }, func)
    }

    /// Reconstructs the secret from at least `threshold` shares
    pub fn reconstruct<E: Curve>(&self, shares: &[Share<E>]) -> Result<Secret<E>, Error> {
        let mut seen = BTreeSet::new();
        for share in shares {
            if !self.shareholders.contains(&share.id) {
                return Err(Error::Membership(share.id));
            }
            if !seen.insert(share.id) {
                return Err(Error::Duplicate("share"));
            }
        }
        if seen.len() < usize::from(self.threshold) {
            return Err(Error::NotAuthorized {
                threshold: self.threshold,
                got: seen.len(),
            });
        }

        let ids = shares.iter().map(|share| share.id).collect::<Vec<_>>();
        let lambdas = lagrange_coefficients::<E>(&ids)?;

        let mut secret = Scalar::zero();
        for share in shares {
            let lambda = lambdas
                .get(&share.id)
                .ok_or(Error::Bug("lagrange coefficient is missing"))?;
            let value: &Scalar<E> = share.value.as_ref();
            secret += lambda * value;
        }
        Ok(Secret(SecretScalar::new(&mut secret)))
    }

    /// Converts a Shamir share into an additive share for the given quorum
    ///
    /// Shares of all quorum members converted this way sum up to the secret. Conversion
    /// is only valid for exactly that quorum: when quorum changes, shares must be
    /// converted again.
    pub fn convert_share_to_additive<E: Curve>(
        &self,
        share: &Share<E>,
        quorum: &[ShareholderId],
    ) -> Result<additive::Share<E>, Error> {
        if !self.shareholders.contains(&share.id) {
            return Err(Error::Membership(share.id));
        }
        if let Some(&outsider) = quorum.iter().find(|j| !self.shareholders.contains(j)) {
            return Err(Error::Membership(outsider));
        }
        if !quorum.contains(&share.id) {
            return Err(Error::Membership(share.id));
        }
        if !self.is_authorized(quorum.iter().copied()) {
            return Err(Error::NotAuthorized {
                threshold: self.threshold,
                got: quorum.iter().collect::<BTreeSet<_>>().len(),
            });
        }

        let lambdas = lagrange_coefficients::<E>(quorum)?;
        let lambda = lambdas
            .get(&share.id)
            .ok_or(Error::Bug("lagrange coefficient is missing"))?;
        let value: &Scalar<E> = share.value.as_ref();
        let mut additive = lambda * value;
        Ok(additive::Share {
            id: share.id,
            value: SecretScalar::new(&mut additive),
        })
    }
}

/// Computes Lagrange coefficients at `x = 0` for the given set of shareholders
///
/// $\lambda_i = \prod_{j \ne i} \frac{x_j}{x_j - x_i}$
///
/// Coefficients are only valid for exactly this set of shareholders. Returns error
/// if the set is empty, or contains zero or repeated ids.
pub fn lagrange_coefficients<E: Curve>(
    ids: &[ShareholderId],
) -> Result<BTreeMap<ShareholderId, Scalar<E>>, Error> {
    if ids.is_empty() {
        return Err(Error::IsZero("set of shareholders"));
    }
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return Err(Error::Duplicate("shareholder id"));
    }
    let nodes = sorted
        .iter()
        .map(|&id| shareholder_node::<E>(id))
        .collect::<Result<Vec<_>, _>>()?;

    sorted
        .iter()
        .zip(&nodes)
        .map(|(&id, x_i)| {
            let lambda = derive_interpolating_value(&nodes, x_i)
                .ok_or(Error::Bug("derive interpolating value"))?;
            Ok((id, lambda))
        })
        .collect()
}

/// Computes an interpolation value for `x_i` at zero
///
/// List of nodes **must be** sorted, so repeated nodes can be detected in one pass.
fn derive_interpolating_value<E: Curve>(
    nodes: &[NonZero<Scalar<E>>],
    x_i: &NonZero<Scalar<E>>,
) -> Option<Scalar<E>> {
    let mut x_i_observed = false;

    let mut num = Scalar::one();
    let mut denom = NonZero::<Scalar<E>>::one();

    for (x_j, x_j_minus_one) in nodes
        .iter()
        .zip(iter::once(None).chain(nodes.iter().map(Some)))
    {
        if Some(x_j) == x_j_minus_one {
            return None;
        }
        let Some(substraction) = NonZero::from_scalar(x_j - x_i) else {
            // x_i equals to x_j
            x_i_observed = true;
            continue;
        };
        num *= x_j.as_ref();
        denom = denom * substraction;
    }

    if !x_i_observed {
        return None;
    }

    Some(num * denom.invert())
}
