//! Key material held by signers
//!
//! After key generation every party holds a [`Shard`]: its own secret
//! [`SigningKeyShare`] plus the [`PublicKeyShares`] of the whole group. Shards are
//! produced either by a DKG (see [`Shard::from_key_share`]) or by a
//! [trusted dealer](trusted_dealer).

use alloc::{collections::BTreeMap, vec::Vec};

use generic_ec::{Curve, NonZero, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::{
    sharing::{
        lagrange_coefficients,
        shamir::{Scheme, Secret},
    },
    Error, ShareholderId,
};

/// Secret key share of a signer
#[derive(Clone)]
pub struct SigningKeyShare<E: Curve> {
    /// Owner of the share
    pub id: ShareholderId,
    /// Shamir share of the group secret key
    pub share: SecretScalar<E>,
    /// Group public key
    pub public_key: NonZero<Point<E>>,
}

impl<E: Curve> core::fmt::Debug for SigningKeyShare<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKeyShare")
            .field("id", &self.id)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Public commitments `Y_j = g^{s_j}` to the key shares of every signer
///
/// Deserialized value goes through the same checks as [`PublicKeyShares::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "", try_from = "DirtyPublicKeyShares<E>")
)]
pub struct PublicKeyShares<E: Curve> {
    public_key: NonZero<Point<E>>,
    threshold: u16,
    shares: BTreeMap<ShareholderId, Point<E>>,
}

impl<E: Curve> PublicKeyShares<E> {
    /// Constructs and validates public key shares
    ///
    /// Checks that threshold is in range `1..=n`, that no public share is the identity,
    /// and that public shares lie on a single polynomial of degree `threshold - 1` with
    /// `public_key` as its constant term.
    pub fn new(
        public_key: NonZero<Point<E>>,
        threshold: u16,
        shares: BTreeMap<ShareholderId, Point<E>>,
    ) -> Result<Self, Error> {
        let scheme = Scheme::new(threshold, shares.keys().copied())?;
        if shares.values().any(|y| y.is_zero()) {
            return Err(Error::IsIdentity("public key share"));
        }

        // Any two neighbouring windows of `t` ids share `t - 1` nodes and the value at zero,
        // so agreement of all windows implies all shares are on the same polynomial
        let ids = scheme.shareholders().iter().copied().collect::<Vec<_>>();
        for window in ids.windows(usize::from(threshold)) {
            let lambdas = lagrange_coefficients::<E>(window)?;
            let mut interpolated = Point::zero();
            for (j, lambda) in &lambdas {
                let y_j = shares.get(j).ok_or(Error::Missing(*j))?;
                interpolated = interpolated + *y_j * lambda;
            }
            if interpolated != *public_key {
                return Err(Error::InvalidArgument(
                    "public key shares are inconsistent with public key",
                ));
            }
        }

        Ok(Self {
            public_key,
            threshold,
            shares,
        })
    }

    /// Group public key
    pub fn public_key(&self) -> &NonZero<Point<E>> {
        &self.public_key
    }

    /// Signing threshold
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Total number of signers
    pub fn n(&self) -> usize {
        self.shares.len()
    }

    /// Public key share of signer `id`
    pub fn get(&self, id: ShareholderId) -> Result<&Point<E>, Error> {
        self.shares.get(&id).ok_or(Error::Membership(id))
    }

    /// Ids of all signers
    pub fn ids(&self) -> impl Iterator<Item = ShareholderId> + '_ {
        self.shares.keys().copied()
    }

    /// Checks whether `id` is one of the signers
    pub fn contains(&self, id: ShareholderId) -> bool {
        self.shares.contains_key(&id)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(bound = "", rename = "PublicKeyShares")]
struct DirtyPublicKeyShares<E: Curve> {
    public_key: NonZero<Point<E>>,
    threshold: u16,
    shares: BTreeMap<ShareholderId, Point<E>>,
}

#[cfg(feature = "serde")]
impl<E: Curve> TryFrom<DirtyPublicKeyShares<E>> for PublicKeyShares<E> {
    type Error = Error;
    fn try_from(dirty: DirtyPublicKeyShares<E>) -> Result<Self, Error> {
        Self::new(dirty.public_key, dirty.threshold, dirty.shares)
    }
}

/// Key material of a single signer
#[derive(Clone, Debug)]
pub struct Shard<E: Curve> {
    /// Secret key share of the signer
    pub signing_key_share: SigningKeyShare<E>,
    /// Public key shares of all signers
    pub public_key_shares: PublicKeyShares<E>,
}

impl<E: Curve> Shard<E> {
    /// Constructs a shard, validating that key share matches public key shares
    pub fn new(
        signing_key_share: SigningKeyShare<E>,
        public_key_shares: PublicKeyShares<E>,
    ) -> Result<Self, Error> {
        let shard = Self {
            signing_key_share,
            public_key_shares,
        };
        shard.validate()?;
        Ok(shard)
    }

    /// Checks that `g^{share}` equals to own public key share and that both halves
    /// refer to the same group public key
    pub fn validate(&self) -> Result<(), Error> {
        let id = self.signing_key_share.id;
        let y = self.public_key_shares.get(id)?;
        let share: &Scalar<E> = self.signing_key_share.share.as_ref();
        if Point::generator() * share != *y {
            return Err(Error::InvalidShare(id));
        }
        if self.signing_key_share.public_key != self.public_key_shares.public_key {
            return Err(Error::InvalidArgument(
                "key share and public key shares refer to different public keys",
            ));
        }
        Ok(())
    }

    /// Id of the shard owner
    pub fn id(&self) -> ShareholderId {
        self.signing_key_share.id
    }

    /// Signing threshold
    pub fn threshold(&self) -> u16 {
        self.public_key_shares.threshold
    }

    /// Group public key
    pub fn public_key(&self) -> &NonZero<Point<E>> {
        &self.signing_key_share.public_key
    }

    /// Converts key share produced by DKG into a shard
    ///
    /// Key share must be a threshold one (i.e. have VSS setup), and signer with
    /// index `j` at keygen must be associated with node `j + 1`. Signer with index `j`
    /// becomes shareholder `j + 1`.
    pub fn from_key_share(key_share: &key_share::CoreKeyShare<E>) -> Result<Self, Error> {
        let vss_setup = key_share
            .vss_setup
            .as_ref()
            .ok_or(Error::InvalidArgument("key share is not a threshold one"))?;

        let mut shares = BTreeMap::new();
        for (j, y_j) in (0u16..).zip(&key_share.public_shares) {
            let id = j
                .checked_add(1)
                .ok_or(Error::InvalidArgument("too many signers"))?;
            let node = key_share
                .share_preimage(j)
                .ok_or(Error::Bug("share preimage is missing"))?;
            if *node != Scalar::from(id) {
                return Err(Error::InvalidArgument(
                    "key share uses unsupported shareholder nodes",
                ));
            }
            shares.insert(id, **y_j);
        }

        let public_key_shares =
            PublicKeyShares::new(key_share.shared_public_key, vss_setup.min_signers, shares)?;
        let id = key_share
            .i
            .checked_add(1)
            .ok_or(Error::InvalidArgument("too many signers"))?;
        let x: &SecretScalar<E> = key_share.x.as_ref();
        Self::new(
            SigningKeyShare {
                id,
                share: x.clone(),
                public_key: key_share.shared_public_key,
            },
            public_key_shares,
        )
    }
}

/// Trusted dealer
///
/// Generates shards of all signers in one place, which makes the dealer a single point
/// of trust. Mainly intended for tests and for importing an existing key.
///
/// ```rust
/// # fn main() -> Result<(), tschnorr::Error> {
/// use tschnorr::generic_ec::curves::Ed25519;
///
/// let mut rng = rand_dev::DevRng::new();
/// let shards = tschnorr::keys::trusted_dealer::<Ed25519>(3)
///     .set_threshold(2)
///     .generate_shards(&mut rng)?;
/// assert_eq!(shards.len(), 3);
/// # Ok(()) }
/// ```
pub fn trusted_dealer<E: Curve>(n: u16) -> TrustedDealerBuilder<E> {
    TrustedDealerBuilder {
        n,
        threshold: None,
        shared_secret_key: None,
    }
}

/// Configures the [trusted dealer](trusted_dealer)
pub struct TrustedDealerBuilder<E: Curve> {
    n: u16,
    threshold: Option<u16>,
    shared_secret_key: Option<NonZero<SecretScalar<E>>>,
}

impl<E: Curve> TrustedDealerBuilder<E> {
    /// Sets signing threshold, defaults to `n`
    pub fn set_threshold(self, threshold: u16) -> Self {
        Self {
            threshold: Some(threshold),
            ..self
        }
    }

    /// Sets secret key to be shared, random key is sampled by default
    pub fn set_shared_secret_key(self, secret_key: NonZero<SecretScalar<E>>) -> Self {
        Self {
            shared_secret_key: Some(secret_key),
            ..self
        }
    }

    /// Generates shards for shareholders `1..=n`
    pub fn generate_shards(
        self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Vec<Shard<E>>, Error> {
        let threshold = self.threshold.unwrap_or(self.n);
        let scheme = Scheme::ordinal(threshold, self.n)?;
        let secret_key = self
            .shared_secret_key
            .unwrap_or_else(|| NonZero::<SecretScalar<E>>::random(rng));
        let secret_key: &SecretScalar<E> = secret_key.as_ref();
        let secret = Secret::new(secret_key.clone());

        let public_key = NonZero::from_point(secret.public_point())
            .ok_or(Error::Bug("public key of non-zero secret key is zero"))?;
        let output = scheme.deal(&secret, rng);
        let public_shares = output
            .shares()
            .iter()
            .map(|(&id, share)| {
                let value: &Scalar<E> = share.value.as_ref();
                (id, Point::generator() * value)
            })
            .collect::<BTreeMap<_, _>>();
        let public_key_shares = PublicKeyShares::new(public_key, threshold, public_shares)?;

        tracing::debug!(threshold, n = self.n, "trusted dealer generated shards");

        output
            .into_shares()
            .into_values()
            .map(|share| {
                Shard::new(
                    SigningKeyShare {
                        id: share.id,
                        share: share.value,
                        public_key,
                    },
                    public_key_shares.clone(),
                )
            })
            .collect()
    }
}
