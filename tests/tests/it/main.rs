mod identifiable_abort;
mod noninteractive;

#[generic_tests::define(attrs(test_case::case))]
mod generic {
    use std::collections::BTreeMap;

    use rand::{seq::SliceRandom, Rng, RngCore};
    use tschnorr::{
        signing::{InteractiveCosigner, SignatureAggregator},
        Ciphersuite,
    };
    use tschnorr_tests::ExternalVerifier;

    #[test_case::case(2, 3; "t2n3")]
    #[test_case::case(3, 3; "t3n3")]
    #[test_case::case(3, 5; "t3n5")]
    #[test_case::case(5, 5; "t5n5")]
    fn sign<C: Ciphersuite + ExternalVerifier>(t: u16, n: u16) {
        let mut rng = rand_dev::DevRng::new();

        // Emulate keygen via trusted dealer
        let shards = tschnorr::keys::trusted_dealer::<C::Curve>(n)
            .set_threshold(t)
            .generate_shards(&mut rng)
            .unwrap();
        let pk = *shards[0].public_key();

        // Choose `t` signers to perform signing
        let signers = shards
            .choose_multiple(&mut rng, t.into())
            .collect::<Vec<_>>();

        // Everyone is an aggregator
        let mut cosigners = signers
            .iter()
            .map(|shard| InteractiveCosigner::<C>::new(shard, true))
            .collect::<Vec<_>>();

        // Round 1. Each signer commits
        let commitments = cosigners
            .iter_mut()
            .map(|cosigner| (cosigner.id(), cosigner.round1(&mut rng).unwrap()))
            .collect::<BTreeMap<_, _>>();

        // Round 2. Each signer signs a message
        let mut message = vec![0u8; rng.gen_range(20..=100)];
        rng.fill_bytes(&mut message);

        let partial_sigs = cosigners
            .iter_mut()
            .map(|cosigner| {
                let id = cosigner.id();
                let mut inputs = commitments.clone();
                inputs.remove(&id);
                (id, cosigner.round2(&inputs, message.as_slice()).unwrap())
            })
            .collect::<BTreeMap<_, _>>();

        // Round 3. Aggregate partial signatures
        let sigs = cosigners
            .iter_mut()
            .map(|cosigner| {
                cosigner
                    .aggregate(message.as_slice(), &partial_sigs)
                    .expect("aggregation failed")
            })
            .collect::<Vec<_>>();
        for sig in &sigs[1..] {
            assert_eq!(sigs[0], *sig);
        }

        // Aggregation by a party which didn't take part in signing
        let sig = SignatureAggregator::<C>::new(&pk, message.as_slice(), &commitments)
            .unwrap()
            .with_public_key_shares(&shards[0].public_key_shares)
            .aggregate(&partial_sigs)
            .unwrap();
        assert_eq!(sig, sigs[0]);

        sig.verify(&pk, &message).expect("invalid signature");
        C::verify_sig(&pk, &sig, &message).expect("external verifier: invalid signature")
    }

    #[test_case::case(2, 3; "t2n3")]
    #[test_case::case(3, 5; "t3n5")]
    fn sign_non_interactively<C: Ciphersuite + ExternalVerifier>(t: u16, n: u16) {
        let mut rng = rand_dev::DevRng::new();
        let tau = 3;

        let shards = tschnorr::keys::trusted_dealer::<C::Curve>(n)
            .set_threshold(t)
            .generate_shards(&mut rng)
            .unwrap();
        let pk = *shards[0].public_key();
        let ids = shards.iter().map(|s| s.id()).collect::<Vec<_>>();

        let identities = tschnorr_tests::Identities::<C>::generate(&mut rng, &ids);
        let (batches, mut vaults) = tschnorr_tests::pregen(&mut rng, &identities, tau);
        let batch = &batches[&ids[0]];
        for other in batches.values() {
            assert_eq!(batch, other);
        }
        assert_eq!(batch.len(), tau);

        let mut last_signed = BTreeMap::new();
        for index in 0..tau {
            let mut message = vec![0u8; rng.gen_range(20..=100)];
            rng.fill_bytes(&mut message);

            let quorum = ids
                .choose_multiple(&mut rng, t.into())
                .copied()
                .collect::<Vec<_>>();

            let mut partial_sigs = BTreeMap::new();
            for shard in shards.iter().filter(|s| quorum.contains(&s.id())) {
                let vault = vaults.get_mut(&shard.id()).unwrap();
                let mut cosigner = tschnorr::signing::NonInteractiveCosigner::<C>::new(
                    shard, &quorum, batch, index, vault, false,
                )
                .unwrap();
                let partial = cosigner
                    .produce_partial_signature(message.as_slice())
                    .unwrap();
                partial_sigs.insert(shard.id(), partial);
                last_signed.insert(shard.id(), index);
            }

            let pre_signature = batch.get(index).unwrap();
            let commitments = quorum
                .iter()
                .map(|&j| {
                    let comm = pre_signature.get(j).unwrap();
                    (j, tschnorr::signing::NonceCommitment { d: comm.d, e: comm.e })
                })
                .collect::<BTreeMap<_, _>>();
            let sig = SignatureAggregator::<C>::new(&pk, message.as_slice(), &commitments)
                .unwrap()
                .with_public_key_shares(&shards[0].public_key_shares)
                .aggregate(&partial_sigs)
                .unwrap();

            sig.verify(&pk, &message).expect("invalid signature");
            C::verify_sig(&pk, &sig, &message).expect("external verifier: invalid signature")
        }

        // cursor stops right after the last pre-signature the party signed with
        for &j in &ids {
            let expected = last_signed.get(&j).map_or(0, |&index| index + 1);
            assert_eq!(vaults[&j].first_unused_index(), expected);
        }
    }

    #[test_case::case(2, 3; "t2n3")]
    #[test_case::case(3, 5; "t3n5")]
    fn reconstruct_from_any_authorized_subset<C: Ciphersuite>(t: u16, n: u16) {
        let mut rng = rand_dev::DevRng::new();

        let scheme = tschnorr::sharing::shamir::Scheme::ordinal(t, n).unwrap();
        let secret = tschnorr::sharing::shamir::Secret::<C::Curve>::random(&mut rng);
        let (output, vv) = tschnorr::sharing::feldman::deal(&scheme, &secret, &mut rng);

        let shares = output.shares().values().cloned().collect::<Vec<_>>();
        let subset = shares
            .choose_multiple(&mut rng, t.into())
            .cloned()
            .collect::<Vec<_>>();

        let reconstructed =
            tschnorr::sharing::feldman::reconstruct_and_verify(&scheme, &subset, &vv).unwrap();
        assert_eq!(reconstructed.public_point(), secret.public_point());

        let unauthorized = &subset[..usize::from(t) - 1];
        assert_eq!(
            scheme.reconstruct(unauthorized).unwrap_err().kind(),
            tschnorr::ErrorKind::Failed
        );
    }

    #[instantiate_tests(<tschnorr::ciphersuite::Secp256k1>)]
    mod secp256k1 {}
    #[instantiate_tests(<tschnorr::ciphersuite::Ed25519>)]
    mod ed25519 {}
}
