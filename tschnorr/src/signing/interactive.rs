//! Interactive Signing
//!
//! Two-round signing with fresh nonces sampled in every session. Each session must use a
//! new [`InteractiveCosigner`]: it can't be restarted, and nonces are wiped once a
//! partial signature is issued.

use alloc::{collections::BTreeMap, vec::Vec};

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info, instrument};

use crate::{
    errors::validate_message, keys::Shard, pregen::NoncePair, schnorr::Signature, Ciphersuite,
    Error, ShareholderId,
};

use super::utils::{self, NonceCommitment, PartialSignature, Session};

enum State<C: Ciphersuite> {
    Created,
    Round1Done {
        nonces: NoncePair<C::Curve>,
        commitment: NonceCommitment<C::Curve>,
    },
    Round2Done {
        session: Option<Session<C::Curve>>,
    },
    Aggregated,
    Aborted,
}

impl<C: Ciphersuite> State<C> {
    fn name(&self) -> &'static str {
        match self {
            State::Created => "created",
            State::Round1Done { .. } => "round1 done",
            State::Round2Done { .. } => "round2 done",
            State::Aggregated => "aggregated",
            State::Aborted => "aborted",
        }
    }
}

/// Signer of the interactive signing protocol
pub struct InteractiveCosigner<'a, C: Ciphersuite> {
    shard: &'a Shard<C::Curve>,
    aggregator: bool,
    state: State<C>,
}

impl<'a, C: Ciphersuite> InteractiveCosigner<'a, C> {
    /// Constructs a cosigner
    ///
    /// If `aggregator` is `true`, cosigner retains the session after issuing the partial
    /// signature, and is able to [aggregate](Self::aggregate) partial signatures.
    pub fn new(shard: &'a Shard<C::Curve>, aggregator: bool) -> Self {
        Self {
            shard,
            aggregator,
            state: State::Created,
        }
    }

    /// Checks whether cosigner is a designated aggregator
    pub fn is_signature_aggregator(&self) -> bool {
        self.aggregator
    }

    /// Id of the cosigner
    pub fn id(&self) -> ShareholderId {
        self.shard.id()
    }

    /// Round 1: commits to a fresh nonce pair
    ///
    /// Returned commitment must be delivered to all other signers of the session.
    #[instrument(skip_all, fields(id = self.shard.id()), err(Debug))]
    pub fn round1(
        &mut self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<NonceCommitment<C::Curve>, Error> {
        if !matches!(self.state, State::Created) {
            return Err(Error::RoundMismatch {
                expected: "created",
                actual: self.state.name(),
            });
        }
        info!("committing to nonces");
        let nonces = NoncePair::generate::<C>(rng, &self.shard.signing_key_share);
        let commitment = NonceCommitment::new(&nonces);
        self.state = State::Round1Done { nonces, commitment };
        Ok(commitment)
    }

    /// Round 2: issues partial signature on `msg`
    ///
    /// `inputs` are nonce commitments of other signers of the session. Together with this
    /// signer they form the quorum, which must be of at least threshold size.
    ///
    /// Nonces are wiped whether or not signing succeeds. `msg` is validated before that,
    /// so passing a nil or empty message doesn't spoil the session.
    #[instrument(skip_all, fields(id = self.shard.id()), err(Debug))]
    pub fn round2<'m>(
        &mut self,
        inputs: &BTreeMap<ShareholderId, NonceCommitment<C::Curve>>,
        msg: impl Into<Option<&'m [u8]>>,
    ) -> Result<PartialSignature<C::Curve>, Error> {
        let msg = validate_message(msg.into())?;
        let State::Round1Done { .. } = self.state else {
            return Err(Error::RoundMismatch {
                expected: "round1 done",
                actual: self.state.name(),
            });
        };
        let State::Round1Done { nonces, commitment } =
            core::mem::replace(&mut self.state, State::Aborted)
        else {
            return Err(Error::Bug("state changed unexpectedly"));
        };

        let i = self.shard.id();
        if inputs.contains_key(&i) {
            return Err(Error::InvalidArgument(
                "round 1 inputs must not contain own commitment",
            ));
        }
        let mut commitments = inputs.clone();
        commitments.insert(i, commitment);
        utils::validate_quorum(commitments.keys().copied(), &self.shard.public_key_shares)?;
        debug!(signers = ?commitments.keys().collect::<Vec<_>>(), "quorum is formed");

        let group_commitment = utils::compute_group_commitment::<C>(&commitments, msg)?;
        let partial_signature =
            utils::compute_partial_signature::<C>(self.shard, &nonces, &group_commitment, msg)?;
        drop(nonces);

        let session = self.aggregator.then(|| Session {
            msg: msg.to_vec(),
            commitments,
            group_commitment,
        });
        self.state = State::Round2Done { session };
        info!("partial signature issued");
        Ok(partial_signature)
    }

    /// Aggregates partial signatures into the final signature
    ///
    /// Only available to designated aggregators after round 2. `msg` must be the same
    /// message that was signed in round 2, and `partial_signatures` must contain partial
    /// signatures of all signers of the session, including this one. Partial signatures
    /// are checked individually, so a misbehaving signer is identified.
    pub fn aggregate<'m>(
        &mut self,
        msg: impl Into<Option<&'m [u8]>>,
        partial_signatures: &BTreeMap<ShareholderId, PartialSignature<C::Curve>>,
    ) -> Result<Signature<C>, Error> {
        if !self.aggregator {
            return Err(Error::InvalidArgument("cosigner is not a signature aggregator"));
        }
        let msg = validate_message(msg.into())?;
        let State::Round2Done { .. } = self.state else {
            return Err(Error::RoundMismatch {
                expected: "round2 done",
                actual: self.state.name(),
            });
        };
        let State::Round2Done {
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
