//! Signing core shared by interactive and non-interactive signing
//!
//! All functions here are pure: given the quorum, its nonce commitments and the message,
//! every party computes exactly the same binding factors and group commitment.

use alloc::{collections::BTreeMap, vec::Vec};

use generic_ec::{Curve, Point, Scalar};

use crate::{
    keys::{PublicKeyShares, Shard},
    pregen::NoncePair,
    schnorr::Signature,
    sharing::shamir::{Scheme, Share},
    Ciphersuite, Error, ShareholderId,
};

/// Public commitment `(D, E)` of a signer to its nonce pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct NonceCommitment<E: Curve> {
    /// Commitment to the hiding nonce
    pub d: Point<E>,
    /// Commitment to the binding nonce
    pub e: Point<E>,
}

impl<E: Curve> NonceCommitment<E> {
    /// Commits to the nonce pair
    pub fn new(nonces: &NoncePair<E>) -> Self {
        let (d, e) = nonces.commitments();
        Self { d, e }
    }

    /// Checks that none of commitments is the identity
    pub fn validate(&self) -> Result<(), Error> {
        if self.d.is_zero() {
            return Err(Error::IsIdentity("hiding nonce commitment"));
        }
        if self.e.is_zero() {
            return Err(Error::IsIdentity("binding nonce commitment"));
        }
        Ok(())
    }
}

/// Partial signature $z_i = d_i + e_i \cdot r_i + \lambda_i \cdot s_i \cdot c$
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct PartialSignature<E: Curve> {
    /// $z_i$
    pub zi: Scalar<E>,
}

/// Group commitment $R$ along with per-signer values it was derived from
#[derive(Debug, Clone)]
pub struct GroupCommitment<E: Curve> {
    r: Point<E>,
    binding_factors: BTreeMap<ShareholderId, Scalar<E>>,
    r_js: BTreeMap<ShareholderId, Point<E>>,
}

impl<E: Curve> GroupCommitment<E> {
    /// Group commitment $R = \sum_j R_j$
    pub fn r(&self) -> &Point<E> {
        &self.r
    }

    /// Binding factor $r_j$ of the signer
    pub fn binding_factor(&self, j: ShareholderId) -> Result<&Scalar<E>, Error> {
        self.binding_factors.get(&j).ok_or(Error::Membership(j))
    }

    /// Commitment $R_j = D_j + r_j \cdot E_j$ of the signer
    pub fn r_j(&self, j: ShareholderId) -> Result<&Point<E>, Error> {
        self.r_js.get(&j).ok_or(Error::Membership(j))
    }

    /// Signers of the session in ascending order
    pub fn signers(&self) -> impl Iterator<Item = ShareholderId> + '_ {
        self.r_js.keys().copied()
    }
}

/// Computes binding factors of all signers
///
/// `combined` is the concatenation of serialized `D_j || E_j` of all signers ordered by id,
/// and $r_j = H_1(j \| msg \| combined)$ where `j` is encoded as 2 bytes big-endian.
pub fn compute_binding_factors<C: Ciphersuite>(
    commitments: &BTreeMap<ShareholderId, NonceCommitment<C::Curve>>,
    msg: &[u8],
) -> BTreeMap<ShareholderId, Scalar<C::Curve>> {
    let combined = commitments
        .values()
        .flat_map(|comm| [C::serialize_point(&comm.d), C::serialize_point(&comm.e)])
        .fold(Vec::new(), |mut acc, bytes| {
            acc.extend_from_slice(bytes.as_ref());
            acc
        });

    commitments
        .keys()
        .map(|&j| (j, C::h1(&[&j.to_be_bytes(), msg, &combined])))
        .collect()
}

/// Computes group commitment $R = \sum_j (D_j + r_j \cdot E_j)$
///
/// Returns error if any commitment or the resulting $R$ is the identity.
pub fn compute_group_commitment<C: Ciphersuite>(
    commitments: &BTreeMap<ShareholderId, NonceCommitment<C::Curve>>,
    msg: &[u8],
) -> Result<GroupCommitment<C::Curve>, Error> {
    if commitments.is_empty() {
        return Err(Error::IsZero("set of signers"));
    }
    for comm in commitments.values() {
        comm.validate()?;
    }

    let binding_factors = compute_binding_factors::<C>(commitments, msg);
    let r_js = commitments
        .iter()
        .zip(binding_factors.values())
        .map(|((&j, comm), r_j)| (j, comm.d + comm.e * r_j))
        .collect::<BTreeMap<_, _>>();
    let r = r_js.values().fold(Point::zero(), |acc, r_j| acc + r_j);
    if r.is_zero() {
        return Err(Error::IsIdentity("group commitment"));
    }

    Ok(GroupCommitment {
        r,
        binding_factors,
        r_js,
    })
}

/// Checks that every signer is known and that there are at least `threshold` of them
pub fn validate_quorum<E: Curve>(
    signers: impl IntoIterator<Item = ShareholderId>,
    public_key_shares: &PublicKeyShares<E>,
) -> Result<(), Error> {
    let mut count = 0;
    for j in signers {
        if !public_key_shares.contains(j) {
            return Err(Error::Membership(j));
        }
        count += 1;
    }
    let threshold = usize::from(public_key_shares.threshold());
    if count < threshold {
        return Err(Error::count("signers", threshold, count));
    }
    Ok(())
}

/// Issues a partial signature
///
/// Signer's Shamir share is converted into an additive share over the signers of the
/// session, then $z_i = d_i + e_i \cdot r_i + \lambda_i \cdot s_i \cdot c$.
pub fn compute_partial_signature<C: Ciphersuite>(
    shard: &Shard<C::Curve>,
    nonces: &NoncePair<C::Curve>,
    group_commitment: &GroupCommitment<C::Curve>,
    msg: &[u8],
) -> Result<PartialSignature<C::Curve>, Error> {
    let i = shard.id();
    let pks = &shard.public_key_shares;
    let quorum = group_commitment.signers().collect::<Vec<_>>();
    validate_quorum(quorum.iter().copied(), pks)?;

    let scheme = Scheme::new(pks.threshold(), pks.ids())?;
    let additive = scheme.convert_share_to_additive(
        &Share {
            id: i,
            value: shard.signing_key_share.share.clone(),
        },
        &quorum,
    )?;

    let r_i = group_commitment.binding_factor(i)?;
    let challenge = C::compute_challenge(group_commitment.r(), shard.public_key(), msg);

    let d: &Scalar<C::Curve> = nonces.d.as_ref();
    let e: &Scalar<C::Curve> = nonces.e.as_ref();
    let s: &Scalar<C::Curve> = additive.value.as_ref();
    Ok(PartialSignature {
        zi: *d + *e * r_i + *s * challenge,
    })
}

/// Signing session retained by an aggregator between signing and aggregation
pub(crate) struct Session<E: Curve> {
    pub msg: Vec<u8>,
    pub commitments: BTreeMap<ShareholderId, NonceCommitment<E>>,
    pub group_commitment: GroupCommitment<E>,
}

impl<E: Curve> Session<E> {
    /// Aggregates partial signatures issued within the session
    pub fn aggregate<C: Ciphersuite<Curve = E>>(
        self,
        shard: &Shard<E>,
        msg: &[u8],
        partial_signatures: &BTreeMap<ShareholderId, PartialSignature<E>>,
    ) -> Result<Signature<C>, Error> {
        if msg != self.msg.as_slice() {
            return Err(Error::InvalidArgument(
                "message differs from the one that was signed",
            ));
        }
        super::SignatureAggregator::<C>::new(shard.public_key(), msg, &self.commitments)?
            .with_public_key_shares(&shard.public_key_shares)
            .with_group_commitment(self.group_commitment)
            .aggregate(partial_signatures)
    }
}
