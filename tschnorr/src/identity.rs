//! Identity layer
//!
//! Each party owns a long-term [`AuthKey`] and is publicly known by its [`IdentityKey`].
//! During [nonce pre-generation](crate::pregen) parties attest their nonce commitments
//! with the auth key, so other parties can authenticate the origin of a commitment before
//! using it in signing.

use generic_ec::{NonZero, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::{schnorr, Ciphersuite, Error, ShareholderId};

/// Attestation over a message, produced by an [`AuthKey`]
pub type Attestation<C> = schnorr::Signature<C>;

/// Long-term authentication key of a party
pub struct AuthKey<C: Ciphersuite> {
    secret: NonZero<SecretScalar<C::Curve>>,
    identity: IdentityKey<C>,
}

impl<C: Ciphersuite> AuthKey<C> {
    /// Generates a random auth key
    pub fn generate(rng: &mut (impl RngCore + CryptoRng)) -> Self {
        Self::from_secret(NonZero::<SecretScalar<C::Curve>>::random(rng))
    }

    /// Constructs auth key from a secret scalar
    pub fn from_secret(secret: NonZero<SecretScalar<C::Curve>>) -> Self {
        let s: &SecretScalar<C::Curve> = secret.as_ref();
        let s: &Scalar<C::Curve> = s.as_ref();
        // `G * s` is never zero for non-zero `s` in a prime order group
        let identity = IdentityKey(Point::generator() * s);
        Self { secret, identity }
    }

    /// Returns public identity key
    pub fn identity_key(&self) -> &IdentityKey<C> {
        &self.identity
    }

    /// Attests a message
    pub fn attest(&self, rng: &mut (impl RngCore + CryptoRng), msg: &[u8]) -> Attestation<C> {
        schnorr::sign::<C>(rng, &self.secret, msg)
    }

    pub(crate) fn secret(&self) -> &SecretScalar<C::Curve> {
        self.secret.as_ref()
    }
}

impl<C: Ciphersuite> core::fmt::Debug for AuthKey<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthKey")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Public identity of a party
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct IdentityKey<C: Ciphersuite>(Point<C::Curve>);

impl<C: Ciphersuite> IdentityKey<C> {
    /// Wraps a public key
    ///
    /// Returns error if public key is the identity element
    pub fn new(public_key: Point<C::Curve>) -> Result<Self, Error> {
        if public_key.is_zero() {
            return Err(Error::IsIdentity("identity key"));
        }
        Ok(Self(public_key))
    }

    /// Returns underlying public key
    pub fn public_key(&self) -> &Point<C::Curve> {
        &self.0
    }

    /// Verifies that `attestation` over `msg` was issued by the owner of this identity
    ///
    /// `attestor` is only used to report who failed verification.
    pub fn verify(
        &self,
        attestor: ShareholderId,
        attestation: &Attestation<C>,
        msg: &[u8],
    ) -> Result<(), Error> {
        attestation
            .verify(&self.0, msg)
            .map_err(|_| Error::InvalidAttestation(attestor))
    }
}

impl<C: Ciphersuite> PartialEq for IdentityKey<C> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<C: Ciphersuite> Eq for IdentityKey<C> {}
