//! Non-Interactive Signing
//!
//! Signing with nonces from a [pre-generated batch](crate::pregen). Commitments of all
//! signers are already known from the batch, so a partial signature is issued right away.
//!
//! Each pre-signature index is single-use. [`NonInteractiveCosigner`] consumes its index
//! in [`PrivateNoncePairs`] when it issues the partial signature, after that the index
//! can't be used again.

use alloc::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, instrument};

use crate::{
    errors::validate_message,
    keys::Shard,
    pregen::{PreSignatureBatch, PrivateNoncePairs},
    schnorr::Signature,
    Ciphersuite, Error, ShareholderId,
};

use super::utils::{self, NonceCommitment, PartialSignature, Session};

enum State<C: Ciphersuite> {
    Ready,
    Signed { session: Option<Session<C::Curve>> },
    Aggregated,
    Aborted,
}

impl<C: Ciphersuite> State<C> {
    fn name(&self) -> &'static str {
        match self {
            State::Ready => "ready",
            State::Signed { .. } => "signed",
            State::Aggregated => "aggregated",
            State::Aborted => "aborted",
        }
    }
}

/// Signer of the non-interactive signing protocol
pub struct NonInteractiveCosigner<'a, C: Ciphersuite> {
    shard: &'a Shard<C::Curve>,
    index: usize,
    commitments: BTreeMap<ShareholderId, NonceCommitment<C::Curve>>,
    nonces: &'a mut PrivateNoncePairs<C::Curve>,
    aggregator: bool,
    state: State<C>,
}

impl<'a, C: Ciphersuite> NonInteractiveCosigner<'a, C> {
    /// Constructs a cosigner that signs with pre-signature at `index`
    ///
    /// * `quorum`: signers of the session, must include this signer, be a subset of
    ///   attestors of the batch, and have at least threshold size
    /// * `batch`: validated pre-signature batch
    /// * `index` of the pre-signature, must not be used yet
    /// * `nonces`: private nonce pairs of this signer for the batch
    /// * `aggregator`: whether cosigner is able to [aggregate](Self::aggregate) partial signatures
    ///
    /// Checks that own nonce pair at `index` matches commitment published in the batch.
    pub fn new(
        shard: &'a Shard<C::Curve>,
        quorum: &[ShareholderId],
        batch: &PreSignatureBatch<C>,
        index: usize,
        nonces: &'a mut PrivateNoncePairs<C::Curve>,
        aggregator: bool,
    ) -> Result<Self, Error> {
        let i = shard.id();
        let pre_signature = batch.get(index)?;
        let pair = nonces.peek(index)?;

        let own = pre_signature.get(i).ok_or(Error::Membership(i))?;
        if (own.d, own.e) != pair.commitments() {
            return Err(Error::NonceMismatch(index));
        }

        let mut seen = BTreeSet::new();
        let mut commitments = BTreeMap::new();
        for &j in quorum {
            if !seen.insert(j) {
                return Err(Error::Duplicate("signer"));
            }
            let comm = pre_signature.get(j).ok_or(Error::Membership(j))?;
            commitments.insert(j, NonceCommitment { d: comm.d, e: comm.e });
        }
        if !commitments.contains_key(&i) {
            return Err(Error::Membership(i));
        }
        utils::validate_quorum(commitments.keys().copied(), &shard.public_key_shares)?;

        Ok(Self {
            shard,
            index,
            commitments,
            nonces,
            aggregator,
            state: State::Ready,
        })
    }

    /// Checks whether cosigner is a designated aggregator
    pub fn is_signature_aggregator(&self) -> bool {
        self.aggregator
    }

    /// Index of the pre-signature used by the cosigner
    pub fn pre_signature_index(&self) -> usize {
        self.index
    }

    /// Issues partial signature on `msg`
    ///
    /// Consumes nonce pair at the pre-signature index. `msg` is validated first, so a nil
    /// or empty message doesn't consume the index.
    #[instrument(skip_all, fields(id = self.shard.id(), index = self.index), err(Debug))]
    pub fn produce_partial_signature<'m>(
        &mut self,
        msg: impl Into<Option<&'m [u8]>>,
    ) -> Result<PartialSignature<C::Curve>, Error> {
        let msg = validate_message(msg.into())?;
        if !matches!(self.state, State::Ready) {
            return Err(Error::RoundMismatch {
                expected: "ready",
                actual: self.state.name(),
            });
        }
        self.state = State::Aborted;

        let nonces = self.nonces.take(self.index)?;
        debug!(
            first_unused_index = self.nonces.first_unused_index(),
            "pre-signature consumed"
        );

        let group_commitment = utils::compute_group_commitment::<C>(&self.commitments, msg)?;
        let partial_signature =
            utils::compute_partial_signature::<C>(self.shard, &nonces, &group_commitment, msg)?;

        let session = self.aggregator.then(|| Session {
            msg: msg.to_vec(),
            commitments: self.commitments.clone(),
            group_commitment,
        });
        self.state = State::Signed { session };
        info!("partial signature issued");
        Ok(partial_signature)
    }

    /// Aggregates partial signatures into the final signature
    ///
    /// Only available to designated aggregators after issuing own partial signature.
    /// `pre_signature_index` and `msg` must be the same that were used for signing.
    pub fn aggregate<'m>(
        &mut self,
        msg: impl Into<Option<&'m [u8]>>,
        pre_signature_index: usize,
        partial_signatures: &BTreeMap<ShareholderId, PartialSignature<C::Curve>>,
    ) -> Result<Signature<C>, Error> {
        if !self.aggregator {
            return Err(Error::InvalidArgument("cosigner is not a signature aggregator"));
        }
        if pre_signature_index != self.index {
            return Err(Error::InvalidArgument(
                "pre-signature index differs from the one that was used for signing",
            ));
        }
        let msg = validate_message(msg.into())?;
        let State::Signed { .. } = self.state else {
            return Err(Error::RoundMismatch {
                expected: "signed",
                actual: self.state.name(),
            });
        };
        let State::Signed {
            session: Some(session),
        } = core::mem::replace(&mut self.state, State::Aborted)
        else {
            return Err(Error::Bug("aggregator didn't retain the session"));
        };

        let signature = session.aggregate::<C>(self.shard, msg, partial_signatures)?;
        self.state = State::Aggregated;
        Ok(signature)
    }
}
