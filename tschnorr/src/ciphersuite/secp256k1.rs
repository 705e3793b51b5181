use crate::Ciphersuite;

/// secp256k1 with SHA-256 ciphersuite
///
/// Scalars are derived with `hash_to_field` (`expand_message_xmd`), points are
/// serialized in SEC1 compressed form.
#[derive(Debug, Clone, Copy)]
pub struct Secp256k1;

impl Ciphersuite for Secp256k1 {
    const NAME: &'static str = "TSCHNORR-secp256k1-SHA256-v1";

    type Curve = generic_ec::curves::Secp256k1;

    fn h1(msg: &[&[u8]]) -> generic_ec::Scalar<Self::Curve> {
        hash_to_scalar(msg, &[Self::NAME.as_bytes(), b"rho"])
    }

    fn compute_challenge(
        group_commitment: &generic_ec::Point<Self::Curve>,
        group_public_key: &generic_ec::Point<Self::Curve>,
        msg: &[u8],
    ) -> generic_ec::Scalar<Self::Curve> {
        hash_to_scalar(
            &[
                Self::serialize_point(group_commitment).as_ref(),
                Self::serialize_point(group_public_key).as_ref(),
                msg,
            ],
            &[Self::NAME.as_bytes(), b"chal"],
        )
    }

    fn h3(msg: &[&[u8]]) -> generic_ec::Scalar<Self::Curve> {
        hash_to_scalar(msg, &[Self::NAME.as_bytes(), b"nonce"])
    }

    type PointBytes = generic_ec::EncodedPoint<Self::Curve>;
    fn serialize_point(point: &generic_ec::Point<Self::Curve>) -> Self::PointBytes {
        point.to_bytes(true)
    }
    fn deserialize_point(
        bytes: &[u8],
    ) -> Result<generic_ec::Point<Self::Curve>, generic_ec::errors::InvalidPoint> {
        generic_ec::Point::from_bytes(bytes)
    }

    type ScalarBytes = generic_ec::EncodedScalar<Self::Curve>;
    const SCALAR_SIZE: usize = 32;
    fn serialize_scalar(scalar: &generic_ec::Scalar<Self::Curve>) -> Self::ScalarBytes {
        scalar.to_be_bytes()
    }
    fn deserialize_scalar(
        bytes: &[u8],
    ) -> Result<generic_ec::Scalar<Self::Curve>, generic_ec::errors::InvalidScalar> {
        generic_ec::Scalar::from_be_bytes(bytes)
    }
}

fn hash_to_scalar(
    msgs: &[&[u8]],
    dsts: &[&[u8]],
) -> generic_ec::Scalar<<Secp256k1 as Ciphersuite>::Curve> {
    use generic_ec::as_raw::FromRaw;
    use k256::elliptic_curve::{
        generic_array::typenum::Unsigned,
        hash2curve::{ExpandMsgXmd, FromOkm, GroupDigest as _},
    };

    // `hash_to_scalar` fails only on empty dst or unsupported output length
    debug_assert!(
        dsts.iter().map(|part| part.len()).sum::<usize>() > 0,
        "dst must not be empty"
    );
    #[allow(dead_code)]
    {
        const OKM_LEN: usize = <<k256::Scalar as FromOkm>::Length as Unsigned>::USIZE;
        const SHA256_LEN: usize =
            <<sha2::Sha256 as digest::OutputSizeUser>::OutputSize as Unsigned>::USIZE;
        static_assertions::const_assert!(OKM_LEN > 0);
        static_assertions::const_assert!(OKM_LEN <= u16::MAX as _);
        static_assertions::const_assert!(OKM_LEN <= 255 * SHA256_LEN);
    }

    #[allow(clippy::expect_used)]
    let scalar_raw = k256::Secp256k1::hash_to_scalar::<ExpandMsgXmd<sha2::Sha256>>(msgs, dsts)
        .expect("dst is non-empty and output length is statically checked");
    generic_ec::Scalar::from_raw(generic_ec::curves::Secp256k1::scalar(scalar_raw))
}
