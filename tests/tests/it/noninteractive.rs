use std::collections::BTreeMap;

use tschnorr::{
    ciphersuite::{Ed25519, Secp256k1},
    keys::trusted_dealer,
    pregen::{AttestedCommitmentToNoncePair, CommitmentRegistry, PreGenParticipant},
    signing::{NonInteractiveCosigner, PartialSignature},
    Ciphersuite, Error, ErrorKind, Shard, ShareholderId,
};
use tschnorr_tests::ExternalVerifier;

type C = Ed25519;
type E = <C as Ciphersuite>::Curve;

const MSG: &[u8] = b"something";

fn sign_at<'a>(
    shards: &'a [Shard<E>],
    quorum: &[ShareholderId],
    batch: &tschnorr::pregen::PreSignatureBatch<C>,
    vaults: &'a mut BTreeMap<ShareholderId, tschnorr::pregen::PrivateNoncePairs<E>>,
    index: usize,
) -> tschnorr::schnorr::Signature<C> {
    let mut partials = BTreeMap::<ShareholderId, PartialSignature<E>>::new();
    let mut aggregator = None;
    for (&id, vault) in vaults.iter_mut().filter(|(id, _)| quorum.contains(id)) {
        let shard = &shards[usize::from(id - 1)];
        let mut cosigner =
            NonInteractiveCosigner::<C>::new(shard, quorum, batch, index, vault, true).unwrap();
        partials.insert(id, cosigner.produce_partial_signature(MSG).unwrap());
        if aggregator.is_none() {
            aggregator = Some(cosigner);
        }
    }
    let mut aggregator = aggregator.unwrap();
    assert!(aggregator.is_signature_aggregator());
    aggregator.aggregate(MSG, index, &partials).unwrap()
}

#[test]
fn two_out_of_three_with_five_pre_signatures() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(3)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();
    let pk = *shards[0].public_key();

    let identities = tschnorr_tests::Identities::<C>::generate(&mut rng, &[1, 2, 3]);
    let (batches, mut vaults) = tschnorr_tests::pregen(&mut rng, &identities, 5);
    assert_eq!(batches[&1], batches[&2]);
    assert_eq!(batches[&1], batches[&3]);
    let batch = &batches[&1];
    assert_eq!(batch.attestors().collect::<Vec<_>>(), [1, 2, 3]);

    // every pair of shareholders signs with its own pre-signature
    let quorums: [&[ShareholderId]; 5] = [&[1, 2], &[2, 3], &[1, 3], &[3, 1], &[1, 2, 3]];
    for (index, quorum) in quorums.into_iter().enumerate() {
        let sig = sign_at(&shards, quorum, batch, &mut vaults, index);
        sig.verify(&pk, MSG).unwrap();
        C::verify_sig(&pk, &sig, MSG).unwrap();
    }

    // cursor jumps over pre-signatures the shareholder didn't sign
    assert_eq!(vaults[&1].first_unused_index(), 5);
    assert_eq!(vaults[&1].remaining(), 0);
}

#[test]
fn skipped_pre_signatures_are_discarded() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(2)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();
    let identities = tschnorr_tests::Identities::<C>::generate(&mut rng, &[1, 2]);
    let (batches, mut vaults) = tschnorr_tests::pregen(&mut rng, &identities, 3);
    let batch = &batches[&1];

    sign_at(&shards, &[1, 2], batch, &mut vaults, 2);

    for index in [0, 1, 2] {
        let vault = vaults.get_mut(&1).unwrap();
        let err = NonInteractiveCosigner::<C>::new(&shards[0], &[1, 2], batch, index, vault, false)
            .err()
            .unwrap();
        assert!(matches!(err, Error::NonceReuse(i) if i == index));
    }
}

#[test]
fn signing_sessions_run_in_parallel() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(3)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();
    let pk = *shards[0].public_key();
    let msgs = [&b"first"[..], b"second", b"third"];

    let sigs = std::thread::scope(|s| {
        let handles = msgs
            .iter()
            .map(|&msg| {
                let mut rng = rng.fork();
                let shards = &shards;
                s.spawn(move || {
                    let mut cosigners = shards[..2]
                        .iter()
                        .map(|shard| tschnorr::signing::InteractiveCosigner::<C>::new(shard, true))
                        .collect::<Vec<_>>();
                    let commitments = cosigners
                        .iter_mut()
                        .map(|c| (c.id(), c.round1(&mut rng).unwrap()))
                        .collect::<BTreeMap<_, _>>();
                    let partials = cosigners
                        .iter_mut()
                        .map(|c| {
                            let mut inputs = commitments.clone();
                            inputs.remove(&c.id());
                            (c.id(), c.round2(&inputs, msg).unwrap())
                        })
                        .collect::<BTreeMap<_, _>>();
                    cosigners[1].aggregate(msg, &partials).unwrap()
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    for (sig, msg) in sigs.iter().zip(msgs) {
        sig.verify(&pk, msg).unwrap();
    }
}

#[test]
fn pre_generation_output_is_registered_once() {
    let mut rng = rand_dev::DevRng::new();
    let identities = tschnorr_tests::Identities::<C>::generate(&mut rng, &[1, 2, 3]);
    let (batches, _) = tschnorr_tests::pregen(&mut rng, &identities, 2);
    let (other_batches, _) = tschnorr_tests::pregen(&mut rng, &identities, 2);

    let mut registry = CommitmentRegistry::new();
    registry.register(&batches[&1]).unwrap();
    registry.register(&other_batches[&1]).unwrap();
    assert_eq!(
        registry.register(&batches[&2]).unwrap_err().kind(),
        ErrorKind::Duplicate
    );
}

#[test]
fn pre_generation_rejects_misbehaving_party() {
    let mut rng = rand_dev::DevRng::new();
    let identities = tschnorr_tests::Identities::<C>::generate(&mut rng, &[1, 2, 3]);
    let mut parties = identities
        .auth_keys
        .iter()
        .map(|(&id, key)| {
            let party = PreGenParticipant::new(id, key, &identities.directory, 2).unwrap();
            (id, party)
        })
        .collect::<BTreeMap<_, _>>();
    let mut round1 = parties
        .iter_mut()
        .map(|(&id, party)| (id, party.round1(&mut rng).unwrap()))
        .collect::<BTreeMap<_, _>>();

    // party 3 reattributes a commitment of party 2 to itself
    let stolen = round1[&2].commitments[0].clone();
    let forged = &mut round1.get_mut(&3).unwrap().commitments[0];
    forged.d = stolen.d;
    forged.e = stolen.e;

    let inputs = round1
        .iter()
        .filter(|(j, _)| **j != 1)
        .map(|(&j, msg)| (j, msg.clone()))
        .collect::<BTreeMap<_, _>>();
    let err = parties.get_mut(&1).unwrap().round2(&inputs).unwrap_err();
    assert!(matches!(err, Error::InvalidAttestation(3)));

    // an unknown party can't join
    let stranger = tschnorr::identity::AuthKey::<C>::generate(&mut rng);
    assert!(matches!(
        PreGenParticipant::new(4, &stranger, &identities.directory, 2),
        Err(Error::Membership(4))
    ));
}

#[test]
fn secp256k1_commitment_which_is_not_a_point_is_rejected() {
    let mut rng = rand_dev::DevRng::new();
    let auth_key = tschnorr::identity::AuthKey::<Secp256k1>::generate(&mut rng);
    let pair = tschnorr::pregen::NoncePair::generate::<Secp256k1>(&mut rng, b"entropy");
    let commitment = AttestedCommitmentToNoncePair::attest(&mut rng, 1, &auth_key, &pair);
    let bytes = commitment.to_bytes();

    // D starts right after the attestor, with the tag of compressed point encoding
    let mut unknown_tag = bytes.clone();
    unknown_tag[2] = 0x07;
    // x-coordinate exceeds the field modulus
    let mut x_out_of_range = bytes.clone();
    x_out_of_range[2] = 0x02;
    x_out_of_range[3..35].fill(0xFF);
    // same for E
    let mut bad_e = bytes;
    bad_e[35] = 0x03;
    bad_e[36..68].fill(0xFF);

    for bytes in [unknown_tag, x_out_of_range, bad_e] {
        assert_eq!(
            AttestedCommitmentToNoncePair::<Secp256k1>::from_bytes(&bytes)
                .unwrap_err()
                .kind(),
            ErrorKind::NotOnCurve
        );
    }
}

#[test]
fn ed25519_commitment_which_is_not_a_point_is_rejected() {
    use rand::RngCore;

    let mut rng = rand_dev::DevRng::new();
    let auth_key = tschnorr::identity::AuthKey::<Ed25519>::generate(&mut rng);
    let pair = tschnorr::pregen::NoncePair::generate::<Ed25519>(&mut rng, b"entropy");
    let commitment = AttestedCommitmentToNoncePair::attest(&mut rng, 1, &auth_key, &pair);
    let mut bytes = commitment.to_bytes();

    // Most of 32-byte strings either have no x-coordinate, or the point has a small-order
    // component. Both must be rejected.
    let not_a_point = std::iter::repeat_with(|| {
        let mut candidate = [0u8; 32];
        rng.fill_bytes(&mut candidate);
        candidate
    })
    .take(1000)
    .find(|candidate| Ed25519::deserialize_point(candidate).is_err())
    .unwrap();

    bytes[2..34].copy_from_slice(&not_a_point);
    assert_eq!(
        AttestedCommitmentToNoncePair::<Ed25519>::from_bytes(&bytes)
            .unwrap_err()
            .kind(),
        ErrorKind::NotOnCurve
    );
}
