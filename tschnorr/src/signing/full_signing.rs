//! Interactive Signing over [`round_based`] transport
//!
//! Drives [`InteractiveCosigner`] through both rounds and aggregation. Every signer acts as
//! an aggregator, so all honest signers output the same signature.

use alloc::collections::BTreeMap;

use rand_core::{CryptoRng, RngCore};
use round_based::{
    rounds_router::{simple_store::RoundInput, RoundsRouter},
    Delivery, SinkExt,
};
use thiserror::Error;

use crate::{keys::Shard, schnorr::Signature, Ciphersuite, ShareholderId};

use super::{
    interactive::InteractiveCosigner,
    utils::{NonceCommitment, PartialSignature},
};

/// Message of the interactive signing protocol
#[derive(Debug, Clone, Copy, round_based::ProtocolMessage)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound = "")
)]
pub enum Msg<E: generic_ec::Curve> {
    /// Round 1 message
    Round1(NonceCommitment<E>),
    /// Round 2 message
    Round2(PartialSignature<E>),
}

/// Builder of the interactive signing protocol
pub struct SigningBuilder<'a, C: Ciphersuite> {
    i: u16,
    shard: &'a Shard<C::Curve>,
    signers: &'a [ShareholderId],
    msg: &'a [u8],
}

impl<'a, C: Ciphersuite> SigningBuilder<'a, C> {
    /// Constructs a signing builder
    ///
    /// * `i`: index of this signer in `signers`, it's also its index at the transport layer
    /// * `shard` of this signer
    /// * `signers`: ids of all signers of the session, `signers[i]` must be id of this signer
    /// * `msg` to be signed
    pub fn new(
        i: u16,
        shard: &'a Shard<C::Curve>,
        signers: &'a [ShareholderId],
        msg: &'a [u8],
    ) -> Self {
        Self {
            i,
            shard,
            signers,
            msg,
        }
    }

    /// Issues partial signature
    ///
    /// Only round 1 is carried out over the network. Partial signature needs to be
    /// delivered to an aggregator separately.
    pub async fn issue_partial_signature<M, R>(
        self,
        rng: &mut R,
        party: M,
    ) -> Result<PartialSignature<C::Curve>, FullSigningError>
    where
        M: round_based::Mpc<ProtocolMessage = Msg<C::Curve>>,
        R: RngCore + CryptoRng,
    {
        let output =
            signing::<C, _>(party, rng, self.i, self.shard, self.signers, self.msg, true).await?;
        match output {
            SigningOutput::PartialSignature(out) => Ok(out),
            SigningOutput::Signature(_) => Err(Reason::UnexpectedOutput.into()),
        }
    }

    /// Executes the signing protocol
    pub async fn sign<M, R>(self, rng: &mut R, party: M) -> Result<Signature<C>, FullSigningError>
    where
        M: round_based::Mpc<ProtocolMessage = Msg<C::Curve>>,
        R: RngCore + CryptoRng,
    {
        let output =
            signing::<C, _>(party, rng, self.i, self.shard, self.signers, self.msg, false).await?;
        match output {
            SigningOutput::Signature(out) => Ok(out),
            SigningOutput::PartialSignature(_) => Err(Reason::UnexpectedOutput.into()),
        }
    }
}

async fn signing<C, M>(
    party: M,
    rng: &mut (impl RngCore + CryptoRng),
    i: u16,
    shard: &Shard<C::Curve>,
    signers: &[ShareholderId],
    msg: &[u8],
    output_partial_signature: bool,
) -> Result<SigningOutput<C>, FullSigningError>
where
    C: Ciphersuite,
    M: round_based::Mpc<ProtocolMessage = Msg<C::Curve>>,
{
    let n: u16 = signers
        .len()
        .try_into()
        .map_err(|_| Reason::NOverflowsU16)?;
    let my_id = *signers.get(usize::from(i)).ok_or(Reason::INotInRange)?;
    if my_id != shard.id() {
        return Err(Reason::SignerIdMismatch.into());
    }
    tracing::debug!(i, n, "starting interactive signing");

    let round_based::MpcParty { delivery, .. } = party.into_party();
    let (incoming, mut outgoing) = delivery.split();

    let mut rounds = RoundsRouter::<Msg<C::Curve>>::builder();
    let round1 = rounds.add_round(RoundInput::<NonceCommitment<C::Curve>>::broadcast(i, n));
    let round2 = rounds.add_round(RoundInput::<PartialSignature<C::Curve>>::broadcast(i, n));
    let mut rounds = rounds.listen(incoming);

    let mut cosigner = InteractiveCosigner::<C>::new(shard, !output_partial_signature);

    // Round 1
    let commitment = cosigner.round1(rng)?;
    outgoing
        .send(round_based::Outgoing::broadcast(Msg::Round1(commitment)))
        .await
        .map_err(IoError::send)?;

    // Round 2
    let commitments = rounds.complete(round1).await.map_err(IoError::recv)?;
    let commitments = signers
        .iter()
        .zip(commitments.iter_including_me(&commitment))
        .filter(|(j, _)| **j != my_id)
        .map(|(&j, &comm)| (j, comm))
        .collect::<BTreeMap<_, _>>();
    if commitments.len() + 1 != signers.len() {
        return Err(crate::Error::Duplicate("signer").into());
    }

    let partial_signature = cosigner.round2(&commitments, msg)?;
    if output_partial_signature {
        return Ok(SigningOutput::PartialSignature(partial_signature));
    }

    outgoing
        .send(round_based::Outgoing::broadcast(Msg::Round2(partial_signature)))
        .await
        .map_err(IoError::send)?;

    // Aggregation
    let partial_signatures = rounds.complete(round2).await.map_err(IoError::recv)?;
    let partial_signatures = signers
        .iter()
        .zip(partial_signatures.iter_including_me(&partial_signature))
        .map(|(&j, &partial)| (j, partial))
        .collect::<BTreeMap<_, _>>();

    let signature = cosigner.aggregate(msg, &partial_signatures)?;
    Ok(SigningOutput::Signature(signature))
}

enum SigningOutput<C: Ciphersuite> {
    Signature(Signature<C>),
    PartialSignature(PartialSignature<C::Curve>),
}

/// Interactive signing error
#[derive(Debug, Error)]
#[error("interactive signing failed")]
pub struct FullSigningError(#[source] Reason);

impl FullSigningError {
    /// Returns protocol error if signing failed due to invalid inputs or misbehaving signer
    ///
    /// Use [`Error::culprit`](crate::Error::culprit) to find out who misbehaved.
    pub fn protocol_error(&self) -> Option<&crate::Error> {
        match &self.0 {
            Reason::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
enum Reason {
    #[error("number of signers overflows u16")]
    NOverflowsU16,
    #[error("signer index not in range (it must be 0 <= i < n)")]
    INotInRange,
    #[error("signers[i] is not the id of this signer")]
    SignerIdMismatch,
    #[error("protocol error")]
    Protocol(#[source] crate::Error),
    #[error("i/o error")]
    IoError(#[source] IoError),
    #[error("bug occurred: unexpected output")]
    UnexpectedOutput,
}

#[derive(Debug, Error)]
enum IoError {
    #[error("send message")]
    Send(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("receive message")]
    Recv(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IoError {
    fn send(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Send(Box::new(err))
    }
    fn recv(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Recv(Box::new(err))
    }
}

impl From<Reason> for FullSigningError {
    fn from(err: Reason) -> Self {
        Self(err)
    }
}
impl From<crate::Error> for FullSigningError {
    fn from(err: crate::Error) -> Self {
        Self(Reason::Protocol(err))
    }
}
impl From<IoError> for FullSigningError {
    fn from(err: IoError) -> Self {
        Self(Reason::IoError(err))
    }
}
