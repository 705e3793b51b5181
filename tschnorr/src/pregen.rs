//! Nonce Pre-Generation
//!
//! Parties generate a batch of `tau` single-use nonce pairs ahead of time, publish
//! attested commitments to them and agree on a [`PreSignatureBatch`]. Later, each entry
//! of the batch can be used for [non-interactive signing](crate::signing::noninteractive)
//! without any extra round of communication.
//!
//! The protocol consists of two rounds, carried out by [`PreGenParticipant`]:
//! 1. [Round 1](PreGenParticipant::round1): each party samples `tau` nonce pairs
//!    `(d, e)`, and broadcasts commitments `(D, E) = (g^d, g^e)` attested with its
//!    long-term [auth key](crate::identity::AuthKey)
//! 2. [Round 2](PreGenParticipant::round2): each party validates commitments of all other
//!    parties and assembles them into a batch. All honest parties end up with identical
//!    batches.
//!
//! Each party keeps its own nonce pairs in [`PrivateNoncePairs`] which tracks their
//! consumption. **Nonce pair must never be used twice**, otherwise the key share leaks.

use alloc::{collections::{BTreeMap, BTreeSet}, vec::Vec};

use generic_ec::{Curve, Point, Scalar, SecretScalar};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, error, info, instrument};

use crate::{
    identity::{Attestation, AuthKey, IdentityKey},
    Ciphersuite, Error, ShareholderId,
};

/// Single-use nonce pair `(d, e)`
#[derive(Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct NoncePair<E: Curve> {
    /// Hiding nonce
    pub d: SecretScalar<E>,
    /// Binding nonce
    pub e: SecretScalar<E>,
}

impl<E: Curve> NoncePair<E> {
    /// Samples a fresh nonce pair
    ///
    /// `additional_entropy` is mixed into the nonces, see [generate_nonce](crate::ciphersuite::generate_nonce)
    pub fn generate<C: Ciphersuite<Curve = E>>(
        rng: &mut (impl RngCore + CryptoRng),
        additional_entropy: impl crate::ciphersuite::AdditionalEntropy<C> + Copy,
    ) -> Self {
        Self {
            d: crate::ciphersuite::generate_nonce::<C>(rng, additional_entropy),
            e: crate::ciphersuite::generate_nonce::<C>(rng, additional_entropy),
        }
    }

    /// Returns public commitments `(g^d, g^e)`
    pub fn commitments(&self) -> (Point<E>, Point<E>) {
        let d: &Scalar<E> = self.d.as_ref();
        let e: &Scalar<E> = self.e.as_ref();
        (Point::generator() * d, Point::generator() * e)
    }
}

impl<E: Curve> core::fmt::Debug for NoncePair<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("NoncePair")
    }
}

/// Public commitment to a nonce pair, attested by its owner
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct AttestedCommitmentToNoncePair<C: Ciphersuite> {
    /// Owner of the nonce pair
    pub attestor: ShareholderId,
    /// Commitment to the hiding nonce, $D = g^d$
    pub d: Point<C::Curve>,
    /// Commitment to the binding nonce, $E = g^e$
    pub e: Point<C::Curve>,
    /// Attestation over `D || E` made with the owner's auth key
    pub attestation: Attestation<C>,
}

impl<C: Ciphersuite> AttestedCommitmentToNoncePair<C> {
    /// Commits to the nonce pair and attests the commitment
    pub fn attest(
        rng: &mut (impl RngCore + CryptoRng),
        attestor: ShareholderId,
        auth_key: &AuthKey<C>,
        nonces: &NoncePair<C::Curve>,
    ) -> Self {
        let (d, e) = nonces.commitments();
        let attestation = auth_key.attest(rng, &commitment_bytes::<C>(&d, &e));
        Self {
            attestor,
            d,
            e,
            attestation,
        }
    }

    /// Bytes `D || E` covered by the attestation
    pub fn attested_bytes(&self) -> Vec<u8> {
        commitment_bytes::<C>(&self.d, &self.e)
    }

    /// Checks that commitments are not the identity and that attestation is valid
    pub fn validate(&self, identity: &IdentityKey<C>) -> Result<(), Error> {
        if self.d.is_zero() {
            return Err(Error::IsIdentity("hiding nonce commitment"));
        }
        if self.e.is_zero() {
            return Err(Error::IsIdentity("binding nonce commitment"));
        }
        identity.verify(self.attestor, &self.attestation, &self.attested_bytes())
    }

    /// Serializes commitment as `attestor || D || E || attestation`
    ///
    /// `attestor` is encoded as 2 bytes big-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::serialized_len());
        out.extend_from_slice(&self.attestor.to_be_bytes());
        out.extend_from_slice(C::serialize_point(&self.d).as_ref());
        out.extend_from_slice(C::serialize_point(&self.e).as_ref());
        out.extend_from_slice(&self.attestation.to_bytes());
        out
    }

    /// Deserializes commitment encoded via [`to_bytes`](Self::to_bytes)
    ///
    /// Returns [`Error::NotOnCurve`] if `D` or `E` don't decode to a point on the curve.
    /// Attestation is not verified, use [`validate`](Self::validate).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != Self::serialized_len() {
            return Err(Error::count(
                "attested commitment bytes",
                Self::serialized_len(),
                bytes.len(),
            ));
        }
        let point_len = point_len::<C>();
        let (attestor, rest) = bytes.split_at(2);
        let (d, rest) = rest.split_at(point_len);
        let (e, attestation) = rest.split_at(point_len);

        let attestor = ShareholderId::from_be_bytes([attestor[0], attestor[1]]);
        let d = C::deserialize_point(d).map_err(|_| Error::NotOnCurve("hiding nonce commitment"))?;
        let e =
            C::deserialize_point(e).map_err(|_| Error::NotOnCurve("binding nonce commitment"))?;
        let attestation = Attestation::<C>::from_bytes(attestation)?;
        Ok(Self {
            attestor,
            d,
            e,
            attestation,
        })
    }

    /// Size of serialized commitment
    pub fn serialized_len() -> usize {
        2 + 2 * point_len::<C>() + Attestation::<C>::serialized_len()
    }
}

impl<C: Ciphersuite> PartialEq for AttestedCommitmentToNoncePair<C> {
    fn eq(&self, other: &Self) -> bool {
        self.attestor == other.attestor
            && self.d == other.d
            && self.e == other.e
            && self.attestation == other.attestation
    }
}
impl<C: Ciphersuite> Eq for AttestedCommitmentToNoncePair<C> {}

fn point_len<C: Ciphersuite>() -> usize {
    let generator = Point::<C::Curve>::generator() * Scalar::one();
    C::serialize_point(&generator).as_ref().len()
}

fn commitment_bytes<C: Ciphersuite>(d: &Point<C::Curve>, e: &Point<C::Curve>) -> Vec<u8> {
    let d = C::serialize_point(d);
    let e = C::serialize_point(e);
    [d.as_ref(), e.as_ref()].concat()
}

/// Commitments of every quorum member to one nonce pair, sorted by attestor
///
/// Deserialization checks the same invariants as [`PreSignature::new`], except for
/// attestations which need identities of the attestors. Use
/// [`verify_attestations`](Self::verify_attestations) after loading a pre-signature
/// from untrusted storage.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "", try_from = "DirtyPreSignature<C>")
)]
pub struct PreSignature<C: Ciphersuite>(Vec<AttestedCommitmentToNoncePair<C>>);

impl<C: Ciphersuite> PreSignature<C> {
    /// Validates commitments and arranges them in canonical order
    ///
    /// Every attestor must be known in `identities`, and every attestation must verify.
    /// No two commitments may share a `D` or `E` value.
    pub fn new(
        mut commitments: Vec<AttestedCommitmentToNoncePair<C>>,
        identities: &BTreeMap<ShareholderId, IdentityKey<C>>,
    ) -> Result<Self, Error> {
        commitments.sort_by_key(|c| c.attestor);
        verify_attestations(&commitments, identities)?;
        Self::from_commitments(commitments)
    }

    /// Checks every attestation against `identities`
    pub fn verify_attestations(
        &self,
        identities: &BTreeMap<ShareholderId, IdentityKey<C>>,
    ) -> Result<(), Error> {
        verify_attestations(&self.0, identities)
    }

    fn from_commitments(
        mut commitments: Vec<AttestedCommitmentToNoncePair<C>>,
    ) -> Result<Self, Error> {
        if commitments.is_empty() {
            return Err(Error::IsZero("pre-signature"));
        }
        commitments.sort_by_key(|c| c.attestor);
        if commitments
            .windows(2)
            .any(|w| w[0].attestor == w[1].attestor)
        {
            return Err(Error::Duplicate("attestor"));
        }

        let mut seen = BTreeSet::new();
        for commitment in &commitments {
            if commitment.d.is_zero() || commitment.e.is_zero() {
                return Err(Error::IsIdentity("nonce commitment"));
            }
            for point in [&commitment.d, &commitment.e] {
                if !seen.insert(C::serialize_point(point).as_ref().to_vec()) {
                    error!(attestor = commitment.attestor, "repeated nonce commitment");
                    return Err(Error::Duplicate("nonce commitment"));
                }
            }
        }
        Ok(Self(commitments))
    }

    /// Commitments sorted by attestor
    pub fn commitments(&self) -> &[AttestedCommitmentToNoncePair<C>] {
        &self.0
    }

    /// Commitment of the attestor
    pub fn get(&self, attestor: ShareholderId) -> Option<&AttestedCommitmentToNoncePair<C>> {
        self.0
            .binary_search_by_key(&attestor, |c| c.attestor)
            .ok()
            .and_then(|i| self.0.get(i))
    }

    /// Attestors in ascending order
    pub fn attestors(&self) -> impl Iterator<Item = ShareholderId> + '_ {
        self.0.iter().map(|c| c.attestor)
    }
}

impl<C: Ciphersuite> PartialEq for PreSignature<C> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<C: Ciphersuite> Eq for PreSignature<C> {}

fn verify_attestations<C: Ciphersuite>(
    commitments: &[AttestedCommitmentToNoncePair<C>],
    identities: &BTreeMap<ShareholderId, IdentityKey<C>>,
) -> Result<(), Error> {
    for commitment in commitments {
        let identity = identities
            .get(&commitment.attestor)
            .ok_or(Error::Membership(commitment.attestor))?;
        commitment.validate(identity)?;
    }
    Ok(())
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(bound = "", rename = "PreSignature")]
struct DirtyPreSignature<C: Ciphersuite>(Vec<AttestedCommitmentToNoncePair<C>>);

#[cfg(feature = "serde")]
impl<C: Ciphersuite> TryFrom<DirtyPreSignature<C>> for PreSignature<C> {
    type Error = Error;
    fn try_from(dirty: DirtyPreSignature<C>) -> Result<Self, Error> {
        Self::from_commitments(dirty.0)
    }
}

/// Batch of `tau` pre-signatures generated in one ceremony
///
/// Deserialized batch is checked with [`PreSignatureBatch::new`]. Attestations still
/// need [`verify_attestations`](Self::verify_attestations).
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "", try_from = "DirtyPreSignatureBatch<C>")
)]
pub struct PreSignatureBatch<C: Ciphersuite> {
    pre_signatures: Vec<PreSignature<C>>,
}

impl<C: Ciphersuite> PreSignatureBatch<C> {
    /// Assembles a batch
    ///
    /// All pre-signatures must have the same attestors, and every `D` and `E` must be
    /// unique across the whole batch.
    pub fn new(pre_signatures: Vec<PreSignature<C>>) -> Result<Self, Error> {
        let Some(first) = pre_signatures.first() else {
            return Err(Error::IsZero("pre-signature batch"));
        };
        let attestors = first.attestors().collect::<Vec<_>>();
        if pre_signatures
            .iter()
            .any(|p| !p.attestors().eq(attestors.iter().copied()))
        {
            return Err(Error::InvalidArgument(
                "pre-signatures in the batch have different attestors",
            ));
        }

        let mut seen = BTreeSet::new();
        for commitment in pre_signatures.iter().flat_map(|p| p.commitments()) {
            for point in [&commitment.d, &commitment.e] {
                if !seen.insert(C::serialize_point(point).as_ref().to_vec()) {
                    error!(
                        attestor = commitment.attestor,
                        "nonce commitment repeats within the batch"
                    );
                    return Err(Error::Duplicate("nonce commitment"));
                }
            }
        }
        Ok(Self { pre_signatures })
    }

    /// Checks attestations of every pre-signature in the batch against `identities`
    pub fn verify_attestations(
        &self,
        identities: &BTreeMap<ShareholderId, IdentityKey<C>>,
    ) -> Result<(), Error> {
        self.pre_signatures
            .iter()
            .try_for_each(|p| p.verify_attestations(identities))
    }

    /// Pre-signature at `index`
    ///
    /// Returns error if index is out of range
    pub fn get(&self, index: usize) -> Result<&PreSignature<C>, Error> {
        self.pre_signatures
            .get(index)
            .ok_or(Error::InvalidArgument("pre-signature index is out of range"))
    }

    /// Amount of pre-signatures in the batch
    pub fn len(&self) -> usize {
        self.pre_signatures.len()
    }

    /// Checks whether batch is empty
    pub fn is_empty(&self) -> bool {
        self.pre_signatures.is_empty()
    }

    /// Iterates over pre-signatures
    pub fn iter(&self) -> impl Iterator<Item = &PreSignature<C>> {
        self.pre_signatures.iter()
    }

    /// Attestors taking part in the batch, in ascending order
    pub fn attestors(&self) -> impl Iterator<Item = ShareholderId> + '_ {
        self.pre_signatures
            .first()
            .into_iter()
            .flat_map(|p| p.attestors())
    }
}

impl<C: Ciphersuite> PartialEq for PreSignatureBatch<C> {
    fn eq(&self, other: &Self) -> bool {
        self.pre_signatures == other.pre_signatures
    }
}
impl<C: Ciphersuite> Eq for PreSignatureBatch<C> {}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(bound = "", rename = "PreSignatureBatch")]
struct DirtyPreSignatureBatch<C: Ciphersuite> {
    pre_signatures: Vec<PreSignature<C>>,
}

#[cfg(feature = "serde")]
impl<C: Ciphersuite> TryFrom<DirtyPreSignatureBatch<C>> for PreSignatureBatch<C> {
    type Error = Error;
    fn try_from(dirty: DirtyPreSignatureBatch<C>) -> Result<Self, Error> {
        Self::new(dirty.pre_signatures)
    }
}

/// Nonce pairs of a party for a [`PreSignatureBatch`]
///
/// Tracks index of the first unused pre-signature. Every [taken](Self::take) pair is
/// removed, and the cursor moves past it and never goes back. Application must persist
/// the cursor before releasing a partial signature made with a taken pair.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct PrivateNoncePairs<E: Curve> {
    pairs: Vec<Option<NoncePair<E>>>,
    first_unused_index: usize,
}

impl<E: Curve> PrivateNoncePairs<E> {
    /// Wraps freshly generated nonce pairs, none of them used
    pub fn new(pairs: Vec<NoncePair<E>>) -> Self {
        Self::restore(pairs, 0)
    }

    /// Restores nonce pairs after a restart
    ///
    /// Every pair below `first_unused_index` is discarded.
    pub fn restore(pairs: Vec<NoncePair<E>>, first_unused_index: usize) -> Self {
        let pairs = pairs
            .into_iter()
            .enumerate()
            .map(|(i, pair)| (i >= first_unused_index).then_some(pair))
            .collect();
        Self {
            pairs,
            first_unused_index,
        }
    }

    /// Index of the first unused pre-signature
    pub fn first_unused_index(&self) -> usize {
        self.first_unused_index
    }

    /// Total amount of pairs, including used ones
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Checks whether there are no pairs at all
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Amount of pairs that can still be used
    pub fn remaining(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_some()).count()
    }

    /// Returns the pair at `index` without consuming it
    pub fn peek(&self, index: usize) -> Result<&NoncePair<E>, Error> {
        if index >= self.pairs.len() {
            return Err(Error::InvalidArgument("pre-signature index is out of range"));
        }
        if index < self.first_unused_index {
            return Err(Error::NonceReuse(index));
        }
        self.pairs
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(Error::NonceReuse(index))
    }

    /// Consumes the pair at `index`
    ///
    /// Cursor is advanced to `index + 1`, pairs that were skipped are discarded.
    pub fn take(&mut self, index: usize) -> Result<NoncePair<E>, Error> {
        self.peek(index)?;
        let pair = self
            .pairs
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(Error::NonceReuse(index))?;
        for skipped in self.pairs.iter_mut().take(index) {
            *skipped = None;
        }
        self.first_unused_index = index + 1;
        Ok(pair)
    }
}

impl<E: Curve> core::fmt::Debug for PrivateNoncePairs<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrivateNoncePairs")
            .field("len", &self.pairs.len())
            .field("first_unused_index", &self.first_unused_index)
            .finish()
    }
}

/// Message sent by each party in round 1 of pre-generation
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub struct Round1Broadcast<C: Ciphersuite> {
    /// Amount of nonce pairs
    pub tau: usize,
    /// Attested commitments to the nonce pairs
    pub commitments: Vec<AttestedCommitmentToNoncePair<C>>,
}

enum State<C: Ciphersuite> {
    Created,
    Round1Done {
        nonces: Vec<NoncePair<C::Curve>>,
        broadcast: Round1Broadcast<C>,
    },
    Round2Done,
    Aborted,
}

impl<C: Ciphersuite> State<C> {
    fn name(&self) -> &'static str {
        match self {
            State::Created => "created",
            State::Round1Done { .. } => "round1 done",
            State::Round2Done => "round2 done",
            State::Aborted => "aborted",
        }
    }
}

/// Party of the nonce pre-generation protocol
pub struct PreGenParticipant<'a, C: Ciphersuite> {
    id: ShareholderId,
    auth_key: &'a AuthKey<C>,
    identities: &'a BTreeMap<ShareholderId, IdentityKey<C>>,
    tau: usize,
    state: State<C>,
}

impl<'a, C: Ciphersuite> PreGenParticipant<'a, C> {
    /// Constructs a participant
    ///
    /// * `id` of this party
    /// * `auth_key` of this party, used to attest commitments
    /// * `identities` of all quorum members, including this party
    /// * `tau` amount of pre-signatures to generate, must be positive
    pub fn new(
        id: ShareholderId,
        auth_key: &'a AuthKey<C>,
        identities: &'a BTreeMap<ShareholderId, IdentityKey<C>>,
        tau: usize,
    ) -> Result<Self, Error> {
        if tau == 0 {
            return Err(Error::InvalidArgument("tau must be positive"));
        }
        if identities.contains_key(&0) {
            return Err(Error::InvalidArgument("shareholder id is zero"));
        }
        let own_identity = identities.get(&id).ok_or(Error::Membership(id))?;
        if own_identity != auth_key.identity_key() {
            return Err(Error::InvalidArgument(
                "auth key doesn't match identity of the party",
            ));
        }
        Ok(Self {
            id,
            auth_key,
            identities,
            tau,
            state: State::Created,
        })
    }

    /// Round 1: samples nonce pairs and attests commitments to them
    ///
    /// Returned message must be delivered to all other quorum members.
    #[instrument(skip_all, fields(id = self.id, tau = self.tau), err(Debug))]
    pub fn round1(
        &mut self,
        rng: &mut (impl RngCore + CryptoRng),
    ) -> Result<Round1Broadcast<C>, Error> {
        if !matches!(self.state, State::Created) {
            return Err(Error::RoundMismatch {
                expected: State::<C>::Created.name(),
                actual: self.state.name(),
            });
        }
        info!("generating nonce pairs");

        let mut nonces = Vec::with_capacity(self.tau);
        let mut commitments = Vec::with_capacity(self.tau);
        for _ in 0..self.tau {
            let pair = NoncePair::generate::<C>(rng, self.auth_key.secret());
            commitments.push(AttestedCommitmentToNoncePair::attest(
                rng,
                self.id,
                self.auth_key,
                &pair,
            ));
            nonces.push(pair);
        }

        let broadcast = Round1Broadcast {
            tau: self.tau,
            commitments,
        };
        self.state = State::Round1Done {
            nonces,
            broadcast: broadcast.clone(),
        };
        Ok(broadcast)
    }

    /// Round 2: validates commitments of other parties and assembles the batch
    ///
    /// `inputs` must contain exactly one message from every other quorum member. Returns
    /// the batch (identical at every honest party) and private nonce pairs of this party.
    ///
    /// If some member never sent its message, returns [`Error::Missing`] naming the first
    /// of them.
    #[instrument(skip_all, fields(id = self.id, tau = self.tau), err(Debug))]
    pub fn round2(
        &mut self,
        inputs: &BTreeMap<ShareholderId, Round1Broadcast<C>>,
    ) -> Result<(PreSignatureBatch<C>, PrivateNoncePairs<C::Curve>), Error> {
        let State::Round1Done { .. } = self.state else {
            return Err(Error::RoundMismatch {
                expected: "round1 done",
                actual: self.state.name(),
            });
        };
        let State::Round1Done { nonces, broadcast } =
            core::mem::replace(&mut self.state, State::Aborted)
        else {
            return Err(Error::Bug("state changed unexpectedly"));
        };
        info!("validating nonce commitments");

        for (&sender, msg) in inputs {
            if sender == self.id || !self.identities.contains_key(&sender) {
                error!(sender, "round 1 message from unexpected sender");
                return Err(Error::Membership(sender));
            }
            if msg.tau != self.tau || msg.commitments.len() != self.tau {
                error!(sender, tau = msg.tau, "wrong amount of nonce commitments");
                return Err(Error::count(
                    "nonce commitments",
                    self.tau,
                    msg.commitments.len(),
                ));
            }
            if msg.commitments.iter().any(|c| c.attestor != sender) {
                error!(sender, "commitment is attested on behalf of another party");
                return Err(Error::InvalidAttestation(sender));
            }
        }
        if let Some(&missing) = self
            .identities
            .keys()
            .find(|&&j| j != self.id && !inputs.contains_key(&j))
        {
            error!(sender = missing, "round 1 message is missing");
            return Err(Error::Missing(missing));
        }

        let pre_signatures = (0..self.tau)
            .map(|j| {
                let commitments = core::iter::once(&broadcast)
                    .chain(inputs.values())
                    .filter_map(|msg| msg.commitments.get(j).cloned())
                    .collect::<Vec<_>>();
                PreSignature::new(commitments, self.identities)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let batch = PreSignatureBatch::new(pre_signatures)?;
        debug!(
            batch_size = batch.len(),
            parties = self.identities.len(),
            "pre-signature batch assembled"
        );

        self.state = State::Round2Done;
        Ok((batch, PrivateNoncePairs::new(nonces)))
    }

    /// Id of this party
    pub fn id(&self) -> ShareholderId {
        self.id
    }
}

/// Registry of nonce commitments from all accepted batches
///
/// Rejects a batch that repeats any `D` or `E` already seen in an earlier batch,
/// including batches generated in separate ceremonies.
#[derive(Debug, Clone, Default)]
pub struct CommitmentRegistry {
    seen: BTreeSet<Vec<u8>>,
}

impl CommitmentRegistry {
    /// Constructs an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers all commitments of the batch
    ///
    /// Registry is left unchanged if the batch is rejected
    pub fn register<C: Ciphersuite>(&mut self, batch: &PreSignatureBatch<C>) -> Result<(), Error> {
        let encoded = batch
            .iter()
            .flat_map(|p| p.commitments())
            .flat_map(|c| [&c.d, &c.e])
            .map(|point| C::serialize_point(point).as_ref().to_vec())
            .collect::<Vec<_>>();
        if encoded.iter().any(|bytes| self.seen.contains(bytes)) {
            error!("nonce commitment was already used in another batch");
            return Err(Error::Duplicate("nonce commitment"));
        }
        self.seen.extend(encoded);
        Ok(())
    }

    /// Amount of registered commitments
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Checks whether registry is empty
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
