//! Partial signatures aggregation
//!
//! Aggregator sums up partial signatures into a regular [Schnorr signature](Signature).
//! Resulting signature is always verified before it's returned. When public key shares of
//! signers are provided, each partial signature is checked individually and the first
//! (by id) invalid one aborts aggregation with [`Error::IdentifiableAbort`].

use alloc::{collections::BTreeMap, vec::Vec};

use generic_ec::{NonZero, Point};
use tracing::{debug, info, instrument, warn};

use crate::{
    errors::validate_message, keys::PublicKeyShares, schnorr::Signature,
    sharing::lagrange_coefficients, Ciphersuite, Error, ShareholderId,
};

use super::utils::{self, GroupCommitment, NonceCommitment, PartialSignature};

/// Aggregates partial signatures into the final signature
pub struct SignatureAggregator<'a, C: Ciphersuite> {
    public_key: &'a NonZero<Point<C::Curve>>,
    msg: &'a [u8],
    commitments: &'a BTreeMap<ShareholderId, NonceCommitment<C::Curve>>,
    public_key_shares: Option<&'a PublicKeyShares<C::Curve>>,
    group_commitment: Option<GroupCommitment<C::Curve>>,
}

impl<'a, C: Ciphersuite> SignatureAggregator<'a, C> {
    /// Constructs an aggregator
    ///
    /// * `public_key`: group public key
    /// * `msg` that was signed, must be present and non-empty
    /// * `commitments`: nonce commitments of every signer of the session
    pub fn new(
        public_key: &'a NonZero<Point<C::Curve>>,
        msg: impl Into<Option<&'a [u8]>>,
        commitments: &'a BTreeMap<ShareholderId, NonceCommitment<C::Curve>>,
    ) -> Result<Self, Error> {
        let msg = validate_message(msg.into())?;
        if commitments.is_empty() {
            return Err(Error::IsZero("set of signers"));
        }
        Ok(Self {
            public_key,
            msg,
            commitments,
            public_key_shares: None,
            group_commitment: None,
        })
    }

    /// Enables identifiable abort
    ///
    /// Every partial signature will be checked against the public key share of its signer.
    pub fn with_public_key_shares(self, public_key_shares: &'a PublicKeyShares<C::Curve>) -> Self {
        Self {
            public_key_shares: Some(public_key_shares),
            ..self
        }
    }

    /// Reuses group commitment computed at signing
    ///
    /// Group commitment must be derived from the same commitments and message, otherwise
    /// aggregation fails.
    pub fn with_group_commitment(self, group_commitment: GroupCommitment<C::Curve>) -> Self {
        Self {
            group_commitment: Some(group_commitment),
            ..self
        }
    }

    /// Aggregates partial signatures
    ///
    /// `partial_signatures` must contain exactly one partial signature per signer.
    #[instrument(skip_all, fields(signers = self.commitments.len()), err(Debug))]
    pub fn aggregate(
        self,
        partial_signatures: &BTreeMap<ShareholderId, PartialSignature<C::Curve>>,
    ) -> Result<Signature<C>, Error> {
        if partial_signatures.len() != self.commitments.len() {
            return Err(Error::count(
                "partial signatures",
                self.commitments.len(),
                partial_signatures.len(),
            ));
        }
        if let Some(&j) = self
            .commitments
            .keys()
            .find(|j| !partial_signatures.contains_key(j))
        {
            return Err(Error::Missing(j));
        }

        let group_commitment = match self.group_commitment {
            Some(gc) => gc,
            None => utils::compute_group_commitment::<C>(self.commitments, self.msg)?,
        };
        if !group_commitment.signers().eq(self.commitments.keys().copied()) {
            return Err(Error::InvalidArgument(
                "group commitment was computed for other signers",
            ));
        }
        let challenge = C::compute_challenge(group_commitment.r(), self.public_key, self.msg);

        if let Some(pks) = self.public_key_shares {
            debug!("checking partial signatures individually");
            utils::validate_quorum(self.commitments.keys().copied(), pks)?;
            let quorum = self.commitments.keys().copied().collect::<Vec<_>>();
            let lambdas = lagrange_coefficients::<C::Curve>(&quorum)?;

            for (&j, partial) in partial_signatures {
                let lambda_j = lambdas
                    .get(&j)
                    .ok_or(Error::Bug("lagrange coefficient is missing"))?;
                let y_j = pks.get(j)?;
                let r_j = group_commitment.r_j(j)?;

                let lhs = Point::generator() * partial.zi;
                let rhs = *r_j + *y_j * (*lambda_j * challenge);
                if lhs != rhs {
                    warn!(culprit = j, "partial signature is invalid");
                    return Err(Error::IdentifiableAbort(j));
                }
            }
        }

        let z = partial_signatures.values().map(|p| p.zi).sum();
        let signature = Signature {
            r: *group_commitment.r(),
            z,
        };
        signature.verify(self.public_key, self.msg)?;
        info!("signature aggregated");
        Ok(signature)
    }
}
