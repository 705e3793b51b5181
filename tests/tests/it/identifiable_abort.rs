use std::collections::BTreeMap;

use tschnorr::{
    ciphersuite::Ed25519,
    generic_ec::Scalar,
    keys::trusted_dealer,
    signing::{InteractiveCosigner, NonInteractiveCosigner, PartialSignature},
    Error, ErrorKind,
};

type C = Ed25519;
type E = <C as tschnorr::Ciphersuite>::Curve;

fn run_interactive<'s>(
    rng: &mut rand_dev::DevRng,
    shards: &'s [tschnorr::Shard<E>],
    msg: &[u8],
) -> (
    Vec<InteractiveCosigner<'s, C>>,
    BTreeMap<u16, PartialSignature<E>>,
) {
    let mut cosigners = shards
        .iter()
        .map(|shard| InteractiveCosigner::<C>::new(shard, true))
        .collect::<Vec<_>>();
    let commitments = cosigners
        .iter_mut()
        .map(|c| (c.id(), c.round1(&mut *rng).unwrap()))
        .collect::<BTreeMap<_, _>>();
    let partials = cosigners
        .iter_mut()
        .map(|c| {
            let mut inputs = commitments.clone();
            inputs.remove(&c.id());
            (c.id(), c.round2(&inputs, msg).unwrap())
        })
        .collect();
    (cosigners, partials)
}

#[test]
fn forged_partial_signature_is_attributed() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(3)
        .set_threshold(3)
        .generate_shards(&mut rng)
        .unwrap();

    let (mut cosigners, mut partials) = run_interactive(&mut rng, &shards, b"msg");
    partials.get_mut(&2).unwrap().zi += Scalar::one();

    let err = cosigners[0].aggregate(&b"msg"[..], &partials).unwrap_err();
    assert!(matches!(err, Error::IdentifiableAbort(2)));
    assert_eq!(err.kind(), ErrorKind::IdentifiableAbort);
    assert_eq!(err.culprit(), Some(2));

    // failed aggregation aborts the session
    assert_eq!(
        cosigners[0]
            .aggregate(&b"msg"[..], &partials)
            .unwrap_err()
            .kind(),
        ErrorKind::Round
    );
}

#[test]
fn partial_signature_of_another_message_is_attributed() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(3)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();

    let mut cosigners = shards[..2]
        .iter()
        .map(|shard| InteractiveCosigner::<C>::new(shard, true))
        .collect::<Vec<_>>();
    let c1 = cosigners[0].round1(&mut rng).unwrap();
    let c2 = cosigners[1].round1(&mut rng).unwrap();

    let p1 = cosigners[0]
        .round2(&BTreeMap::from([(2, c2)]), &b"msg"[..])
        .unwrap();
    let p2 = cosigners[1]
        .round2(&BTreeMap::from([(1, c1)]), &b"other msg"[..])
        .unwrap();

    let err = cosigners[0]
        .aggregate(&b"msg"[..], &BTreeMap::from([(1, p1), (2, p2)]))
        .unwrap_err();
    assert_eq!(err.culprit(), Some(2));
}

#[test]
fn missing_partial_signature() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(3)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();

    let (mut cosigners, mut partials) = run_interactive(&mut rng, &shards, b"msg");
    partials.remove(&3);
    assert_eq!(
        cosigners[0]
            .aggregate(&b"msg"[..], &partials)
            .unwrap_err()
            .kind(),
        ErrorKind::Count
    );
}

#[test]
fn interactive_rounds_must_be_in_order() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(2)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();

    let mut cosigner = InteractiveCosigner::<C>::new(&shards[0], false);
    assert_eq!(
        cosigner
            .round2(&BTreeMap::new(), &b"msg"[..])
            .unwrap_err()
            .kind(),
        ErrorKind::Round
    );
    cosigner.round1(&mut rng).unwrap();
    assert_eq!(
        cosigner.round1(&mut rng).unwrap_err().kind(),
        ErrorKind::Round
    );

    // quorum below threshold
    assert_eq!(
        cosigner
            .round2(&BTreeMap::new(), &b"msg"[..])
            .unwrap_err()
            .kind(),
        ErrorKind::Count
    );

    // non-aggregator can't aggregate
    assert_eq!(
        cosigner
            .aggregate(&b"msg"[..], &BTreeMap::new())
            .unwrap_err()
            .kind(),
        ErrorKind::Validation
    );
}

#[test]
fn nil_or_empty_message_is_rejected_before_nonces_are_consumed() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(2)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();
    let identities = tschnorr_tests::Identities::<C>::generate(&mut rng, &[1, 2]);
    let (batches, mut vaults) = tschnorr_tests::pregen(&mut rng, &identities, 2);
    let batch = &batches[&1];

    let vault = vaults.get_mut(&1).unwrap();
    let mut cosigner =
        NonInteractiveCosigner::<C>::new(&shards[0], &[1, 2], batch, 0, vault, false).unwrap();
    assert_eq!(
        cosigner
            .produce_partial_signature(None::<&[u8]>)
            .unwrap_err()
            .kind(),
        ErrorKind::IsNil
    );
    assert_eq!(
        cosigner
            .produce_partial_signature(&b""[..])
            .unwrap_err()
            .kind(),
        ErrorKind::IsZero
    );
    cosigner.produce_partial_signature(&b"msg"[..]).unwrap();
    drop(cosigner);

    // index 0 is consumed now
    let vault = vaults.get_mut(&1).unwrap();
    let err = NonInteractiveCosigner::<C>::new(&shards[0], &[1, 2], batch, 0, vault, false)
        .err()
        .unwrap();
    assert!(matches!(err, Error::NonceReuse(0)));
}

#[test]
fn nonce_pairs_of_another_party_are_rejected() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(2)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();
    let identities = tschnorr_tests::Identities::<C>::generate(&mut rng, &[1, 2]);
    let (batches, mut vaults) = tschnorr_tests::pregen(&mut rng, &identities, 1);

    let vault = vaults.get_mut(&2).unwrap();
    let err = NonInteractiveCosigner::<C>::new(&shards[0], &[1, 2], &batches[&1], 0, vault, false)
        .err()
        .unwrap();
    assert!(matches!(err, Error::NonceMismatch(0)));
}

#[test]
fn quorum_is_validated() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(3)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();
    let identities = tschnorr_tests::Identities::<C>::generate(&mut rng, &[1, 2]);
    let (batches, mut vaults) = tschnorr_tests::pregen(&mut rng, &identities, 1);
    let batch = &batches[&1];
    let vault = vaults.get_mut(&1).unwrap();

    // shareholder 3 took no part in pre-generation
    let err = NonInteractiveCosigner::<C>::new(&shards[0], &[1, 3], batch, 0, &mut *vault, false)
        .err()
        .unwrap();
    assert!(matches!(err, Error::Membership(3)));

    let err = NonInteractiveCosigner::<C>::new(&shards[0], &[1], batch, 0, &mut *vault, false)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Count);

    let err = NonInteractiveCosigner::<C>::new(&shards[0], &[1, 2, 1], batch, 0, &mut *vault, false)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Duplicate);

    let err = NonInteractiveCosigner::<C>::new(&shards[0], &[1, 2], batch, 1, &mut *vault, false)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn partial_signature_from_another_session_is_attributed() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(3)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();

    let (_, first) = run_interactive(&mut rng, &shards, b"msg");
    let (mut cosigners, mut second) = run_interactive(&mut rng, &shards, b"msg");
    second.insert(3, first[&3]);

    let err = cosigners[0].aggregate(&b"msg"[..], &second).unwrap_err();
    assert!(matches!(err, Error::IdentifiableAbort(3)));
}

#[test]
fn partial_signature_of_unexpected_signer() {
    let mut rng = rand_dev::DevRng::new();
    let shards = trusted_dealer::<E>(4)
        .set_threshold(2)
        .generate_shards(&mut rng)
        .unwrap();

    let (mut cosigners, mut partials) = run_interactive(&mut rng, &shards[..3], b"msg");
    let partial = partials.remove(&3).unwrap();
    partials.insert(4, partial);
    assert!(matches!(
        cosigners[0].aggregate(&b"msg"[..], &partials),
        Err(Error::Missing(3))
    ));
}
