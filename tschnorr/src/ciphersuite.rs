//! Ciphersuite
//!
//! Ciphersuite specifies which curve and hash primitives to use during sharing, nonce
//! pre-generation and signing.
//!
//! Out of the box, we provide:
//! * [Ed25519], requires `ciphersuite-ed25519` feature \
//!   Aggregated signatures are regular Ed25519 signatures
//! * [Secp256k1], requires `ciphersuite-secp256k1` feature

use generic_ec::{
    errors::{InvalidPoint, InvalidScalar},
    Curve, Point, Scalar, SecretScalar,
};
use rand_core::{CryptoRng, RngCore};

#[cfg(feature = "ciphersuite-ed25519")]
mod ed25519;
#[cfg(feature = "ciphersuite-secp256k1")]
mod secp256k1;

#[cfg(feature = "ciphersuite-ed25519")]
pub use ed25519::Ed25519;
#[cfg(feature = "ciphersuite-secp256k1")]
pub use secp256k1::Secp256k1;

/// Ciphersuite determines an underlying curve and set of cryptographic primitives
/// used in the protocols
pub trait Ciphersuite: Sized + Clone + Copy + core::fmt::Debug {
    /// Name of the ciphersuite, used for domain separation
    const NAME: &'static str;

    /// Underlying curve on which signatures will be produced
    type Curve: Curve;

    /// Hash function used to derive binding factors
    ///
    /// Accepts a list of bytestring, that'll be concatenated before hashing.
    /// Returns `H1(data[0] || data[1] || ... || data[data.len() - 1])`.
    fn h1(msg: &[&[u8]]) -> Scalar<Self::Curve>;
    /// Computes the challenge according to Schnorr scheme
    ///
    /// `c = H(R || public_key || msg)`. The same formula is used by the single-signer
    /// verifier, so aggregated signatures verify unmodified against the group public key.
    fn compute_challenge(
        group_commitment: &Point<Self::Curve>,
        group_public_key: &Point<Self::Curve>,
        msg: &[u8],
    ) -> Scalar<Self::Curve>;
    /// Hash function used to derive nonces
    ///
    /// Accepts a list of bytestring, that'll be concatenated before hashing.
    /// Returns `H3(data[0] || data[1] || ... || data[data.len() - 1])`.
    fn h3(msg: &[&[u8]]) -> Scalar<Self::Curve>;

    /// Byte array that contains bytes representation of the point
    type PointBytes: AsRef<[u8]>;
    /// Serializes point in affine compressed form
    fn serialize_point(point: &Point<Self::Curve>) -> Self::PointBytes;
    /// Deserializes point
    ///
    /// Returns error if bytes don't encode a point on the curve
    fn deserialize_point(bytes: &[u8]) -> Result<Point<Self::Curve>, InvalidPoint>;

    /// Byte array that contains bytes representation of the scalar
    type ScalarBytes: AsRef<[u8]>;
    /// Size of serialized scalar in bytes
    const SCALAR_SIZE: usize;
    /// Serializes scalar
    fn serialize_scalar(scalar: &Scalar<Self::Curve>) -> Self::ScalarBytes;
    /// Deserializes scalar
    fn deserialize_scalar(bytes: &[u8]) -> Result<Scalar<Self::Curve>, InvalidScalar>;
    /// Deserializes secret scalar
    fn deserialize_secret_scalar(bytes: &[u8]) -> Result<SecretScalar<Self::Curve>, InvalidScalar> {
        let mut scalar = Self::deserialize_scalar(bytes)?;
        Ok(SecretScalar::new(&mut scalar))
    }
}

/// Nonce generation
///
/// Mixes 32 bytes of randomness with `additional_entropy` known only to the signer, so that
/// a weak RNG alone doesn't leak nonces. Any secret data held by the signer can be used as
/// additional entropy.
pub fn generate_nonce<C: Ciphersuite>(
    rng: &mut (impl RngCore + CryptoRng),
    additional_entropy: impl AdditionalEntropy<C>,
) -> SecretScalar<C::Curve> {
    let mut random_bytes = [0u8; 32];
    rng.fill_bytes(&mut random_bytes);

    let additional_entropy = additional_entropy.to_bytes();

    let mut hash = C::h3(&[random_bytes.as_slice(), additional_entropy.as_ref()]);

    generic_ec::SecretScalar::new(&mut hash)
}

/// Additional entropy to [nonce generation](generate_nonce)
pub trait AdditionalEntropy<C: Ciphersuite> {
    /// Bytes arrays that fits the whole bytes representation of the entropy
    type Bytes<'b>: AsRef<[u8]>
    where
        Self: 'b;

    /// Returns bytes representation of the entropy encoded in compliance with [`C`](Ciphersuite)
    fn to_bytes(&self) -> Self::Bytes<'_>;
}

impl<C: Ciphersuite<Curve = E>, E: Curve> AdditionalEntropy<C> for crate::keys::SigningKeyShare<E> {
    type Bytes<'b> = <SecretScalar<E> as AdditionalEntropy<C>>::Bytes<'b>;
    fn to_bytes(&self) -> Self::Bytes<'_> {
        AdditionalEntropy::<C>::to_bytes(&self.share)
    }
}
impl<C: Ciphersuite<Curve = E>, E: Curve> AdditionalEntropy<C> for generic_ec::Scalar<E> {
    type Bytes<'b> = C::ScalarBytes;
    fn to_bytes(&self) -> Self::Bytes<'_> {
        C::serialize_scalar(self)
    }
}
impl<C: Ciphersuite<Curve = E>, E: Curve> AdditionalEntropy<C> for generic_ec::SecretScalar<E> {
    type Bytes<'b> = <generic_ec::Scalar<E> as AdditionalEntropy<C>>::Bytes<'b>;
    fn to_bytes(&self) -> Self::Bytes<'_> {
        AdditionalEntropy::<C>::to_bytes(self.as_ref())
    }
}
impl<C: Ciphersuite> AdditionalEntropy<C> for [u8] {
    type Bytes<'b> = &'b [u8];
    fn to_bytes(&self) -> Self::Bytes<'_> {
        self
    }
}
impl<C: Ciphersuite, const N: usize> AdditionalEntropy<C> for [u8; N] {
    type Bytes<'b> = &'b [u8; N];
    fn to_bytes(&self) -> Self::Bytes<'_> {
        self
    }
}
impl<C: Ciphersuite, T: AdditionalEntropy<C> + ?Sized> AdditionalEntropy<C> for &T {
    type Bytes<'b> = <T as AdditionalEntropy<C>>::Bytes<'b> where Self: 'b;
    fn to_bytes(&self) -> Self::Bytes<'_> {
        (*self).to_bytes()
    }
}
