//! Single-signer Schnorr signatures
//!
//! Threshold signatures produced by this crate are indistinguishable from signatures
//! defined here: they verify with the group public key alone. The same scheme is used
//! by the [identity layer](crate::identity) to attest nonce commitments.

use alloc::vec::Vec;

use generic_ec::{NonZero, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};

use crate::{Ciphersuite, Error};

/// Schnorr Signature
#[derive(Debug, Clone, Copy)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct Signature<C: Ciphersuite> {
    /// $R$ component of the signature
    pub r: Point<C::Curve>,
    /// $z$ component of the signature
    pub z: Scalar<C::Curve>,
}

impl<C: Ciphersuite> Signature<C> {
    /// Verifies signature against a public key and a message
    ///
    /// Checks `z * G == R + c * public_key` where `c = H(R || public_key || msg)`
    pub fn verify(&self, public_key: &Point<C::Curve>, msg: &[u8]) -> Result<(), Error> {
        let challenge = C::compute_challenge(&self.r, public_key, msg);

        let lhs = Point::generator() * self.z;
        let rhs = self.r + *public_key * challenge;

        if lhs == rhs {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }

    /// Returns size of bytes buffer that can fit serialized signature
    pub fn serialized_len() -> usize {
        let generator = Point::<C::Curve>::generator() * Scalar::one();
        C::serialize_point(&generator).as_ref().len() + C::SCALAR_SIZE
    }

    /// Writes serialized signature `R || z` to the bytes buffer
    ///
    /// Returns [`Error::Count`] if the buffer is shorter than [`Signature::serialized_len()`].
    /// Bytes past the signature are left untouched.
    pub fn write_to_slice(&self, out: &mut [u8]) -> Result<(), Error> {
        let r = C::serialize_point(&self.r);
        let r = r.as_ref();
        let z = C::serialize_scalar(&self.z);
        let z = z.as_ref();
        let Some(out) = out.get_mut(..r.len() + z.len()) else {
            return Err(Error::count(
                "bytes in signature buffer",
                r.len() + z.len(),
                out.len(),
            ));
        };
        let (out_r, out_z) = out.split_at_mut(r.len());
        out_r.copy_from_slice(r);
        out_z.copy_from_slice(z);
        Ok(())
    }

    /// Serializes signature as `R || z`
    pub fn to_bytes(&self) -> Vec<u8> {
        let r = C::serialize_point(&self.r);
        let z = C::serialize_scalar(&self.z);
        [r.as_ref(), z.as_ref()].concat()
    }

    /// Deserializes signature from `R || z`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::serialized_len() {
            return Err(Error::count("signature bytes", Self::serialized_len(), bytes.len()));
        }
        let (r, z) = bytes.split_at(bytes.len() - C::SCALAR_SIZE);
        let r = C::deserialize_point(r).map_err(|_| Error::NotOnCurve("signature R"))?;
        let z = C::deserialize_scalar(z).map_err(|_| Error::InvalidArgument("signature z"))?;
        Ok(Self { r, z })
    }
}

impl<C: Ciphersuite> PartialEq for Signature<C> {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.z == other.z
    }
}
impl<C: Ciphersuite> Eq for Signature<C> {}

/// Signs a message with a secret key
///
/// Nonce is derived from `rng` and the secret key via [generate_nonce](crate::ciphersuite::generate_nonce).
pub fn sign<C: Ciphersuite>(
    rng: &mut (impl RngCore + CryptoRng),
    secret_key: &NonZero<SecretScalar<C::Curve>>,
    msg: &[u8],
) -> Signature<C> {
    let secret_key: &SecretScalar<C::Curve> = secret_key.as_ref();
    let sk: &Scalar<C::Curve> = secret_key.as_ref();
    let public_key = Point::generator() * sk;

    let nonce = crate::ciphersuite::generate_nonce::<C>(rng, secret_key);
    let k: &Scalar<C::Curve> = nonce.as_ref();
    let r = Point::generator() * k;

    let challenge = C::compute_challenge(&r, &public_key, msg);
    let z = *k + challenge * sk;

    Signature { r, z }
}
