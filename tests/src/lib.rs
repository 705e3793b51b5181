use std::collections::BTreeMap;

use rand::{CryptoRng, RngCore};
use tschnorr::{
    generic_ec::{NonZero, Point},
    identity::{AuthKey, IdentityKey},
    pregen::{PreGenParticipant, PreSignatureBatch, PrivateNoncePairs},
    schnorr::Signature,
    Ciphersuite, ShareholderId,
};

pub trait ExternalVerifier: Ciphersuite {
    type InvalidSig: core::fmt::Debug;

    fn verify_sig(
        pk: &NonZero<Point<Self::Curve>>,
        sig: &Signature<Self>,
        msg: &[u8],
    ) -> Result<(), Self::InvalidSig>;
}

impl ExternalVerifier for tschnorr::ciphersuite::Ed25519 {
    type InvalidSig = ed25519::SignatureError;

    fn verify_sig(
        pk: &NonZero<Point<Self::Curve>>,
        sig: &Signature<Self>,
        msg: &[u8],
    ) -> Result<(), ed25519::SignatureError> {
        let pk = ed25519::VerifyingKey::from_bytes(
            &Self::serialize_point(pk)
                .as_bytes()
                .try_into()
                .expect("wrong size of pk"),
        )
        .expect("invalid pk");
        let mut sig_bytes = [0u8; 64];
        assert_eq!(sig_bytes.len(), Signature::<Self>::serialized_len());
        sig.write_to_slice(&mut sig_bytes).expect("buffer fits signature");
        let sig = ed25519::Signature::from_bytes(&sig_bytes);

        pk.verify_strict(msg, &sig)
    }
}

impl ExternalVerifier for tschnorr::ciphersuite::Secp256k1 {
    type InvalidSig = core::convert::Infallible;

    fn verify_sig(
        _pk: &NonZero<Point<Self::Curve>>,
        _sig: &Signature<Self>,
        _msg: &[u8],
    ) -> Result<(), Self::InvalidSig> {
        // No external verifier for secp256k1 ciphersuite
        Ok(())
    }
}

/// Auth keys of parties along with the directory of their identities
pub struct Identities<C: Ciphersuite> {
    pub auth_keys: BTreeMap<ShareholderId, AuthKey<C>>,
    pub directory: BTreeMap<ShareholderId, IdentityKey<C>>,
}

impl<C: Ciphersuite> Identities<C> {
    pub fn generate(rng: &mut (impl RngCore + CryptoRng), ids: &[ShareholderId]) -> Self {
        let auth_keys = ids
            .iter()
            .map(|&id| (id, AuthKey::generate(&mut *rng)))
            .collect::<BTreeMap<_, _>>();
        let directory = auth_keys
            .iter()
            .map(|(&id, key)| (id, *key.identity_key()))
            .collect();
        Self {
            auth_keys,
            directory,
        }
    }
}

/// Carries out nonce pre-generation between all parties of `identities`
///
/// Returns the batch output by each party, and private nonce pairs of each party.
pub fn pregen<C: Ciphersuite>(
    rng: &mut (impl RngCore + CryptoRng),
    identities: &Identities<C>,
    tau: usize,
) -> (
    BTreeMap<ShareholderId, PreSignatureBatch<C>>,
    BTreeMap<ShareholderId, PrivateNoncePairs<C::Curve>>,
) {
    let mut parties = identities
        .auth_keys
        .iter()
        .map(|(&id, auth_key)| {
            let party = PreGenParticipant::new(id, auth_key, &identities.directory, tau)
                .expect("construct pregen participant");
            (id, party)
        })
        .collect::<BTreeMap<_, _>>();

    let round1 = parties
        .iter_mut()
        .map(|(&id, party)| (id, party.round1(&mut *rng).expect("pregen round 1")))
        .collect::<BTreeMap<_, _>>();

    let mut batches = BTreeMap::new();
    let mut vaults = BTreeMap::new();
    for (&id, party) in &mut parties {
        let inputs = round1
            .iter()
            .filter(|(j, _)| **j != id)
            .map(|(&j, msg)| (j, msg.clone()))
            .collect();
        let (batch, vault) = party.round2(&inputs).expect("pregen round 2");
        batches.insert(id, batch);
        vaults.insert(id, vault);
    }
    (batches, vaults)
}
