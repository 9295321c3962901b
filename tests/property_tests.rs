use proptest::prelude::*;
use sigma_zkp::protocol::{SigmaProver, SigmaRelation, SigmaVerifier};
use sigma_zkp::variants::dlog_equality::{DlogEqualityRelation, DlogEqualityWitness};
use sigma_zkp::variants::pedersen::{PedersenCommitter, PedersenReceiver};
use sigma_zkp::variants::schnorr::{SchnorrRelation, SchnorrWitness};
use sigma_zkp::variants::shamir;
use sigma_zkp::{GroupAlgebra, ProofMode, Ristretto255, SchnorrGroup, SecureRng};

fn run_schnorr_interactive<A: GroupAlgebra>(algebra: A) -> bool {
    let mut rng = SecureRng::new();
    let relation = SchnorrRelation::new(algebra);
    let witness = SchnorrWitness::random(relation.algebra(), &mut rng);
    let statement = relation.statement_for(&witness);

    let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
    let mut verifier = SigmaVerifier::new(relation, statement);

    let commitment = prover.commit(&mut rng).unwrap();
    let challenge = verifier.receive_commitment(commitment, &mut rng).unwrap();
    let response = prover.respond(&challenge).unwrap();
    verifier.verify(&response).unwrap()
}

fn sharing_strategy() -> impl Strategy<Value = (u32, u32, Vec<usize>)> {
    (2u32..=4, 0u32..=2).prop_flat_map(|(threshold, extra)| {
        let total = threshold + extra;
        proptest::sample::subsequence(
            (0..total as usize).collect::<Vec<_>>(),
            threshold as usize,
        )
        .prop_map(move |subset| (threshold, total, subset))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn schnorr_completeness_ristretto(_seed in any::<u64>()) {
        prop_assert!(run_schnorr_interactive(Ristretto255::new()));
    }

    #[test]
    fn schnorr_completeness_modp(_seed in any::<u64>()) {
        prop_assert!(run_schnorr_interactive(SchnorrGroup::rfc5114()));
    }

    #[test]
    fn schnorr_fiat_shamir_completeness(_seed in any::<u64>()) {
        let mut rng = SecureRng::new();
        let relation = SchnorrRelation::new(Ristretto255::new());
        let witness = SchnorrWitness::random(relation.algebra(), &mut rng);
        let statement = relation.statement_for(&witness);

        let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
        let proof = prover.prove(ProofMode::Zkpok, &mut rng).unwrap();

        prop_assert!(
            SigmaVerifier::verify_proof(&relation, &statement, &proof, ProofMode::Zkpok).unwrap()
        );
    }

    #[test]
    fn dlog_equality_completeness(_seed in any::<u64>()) {
        let mut rng = SecureRng::new();
        let group = Ristretto255::new();
        let relation = DlogEqualityRelation::new(group.clone());
        let witness = DlogEqualityWitness::new(group.sample(&mut rng));
        let g1 = group.power(&group.generator(), &group.sample(&mut rng));
        let g2 = group.power(&group.generator(), &group.sample(&mut rng));
        let statement = relation.statement_for(g1, g2, &witness);

        let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
        let mut verifier = SigmaVerifier::new(relation, statement);

        let commitment = prover.commit(&mut rng).unwrap();
        let challenge = verifier.receive_commitment(commitment, &mut rng).unwrap();
        let response = prover.respond(&challenge).unwrap();
        prop_assert!(verifier.verify(&response).unwrap());
    }

    #[test]
    fn pedersen_open_accepts_and_binds(_seed in any::<u64>()) {
        let algebra = Ristretto255::new();
        let mut rng = SecureRng::new();
        let mut receiver = PedersenReceiver::new(algebra.clone(), &mut rng);

        let message = algebra.sample(&mut rng);
        let (committer, commitment) = PedersenCommitter::commit(
            algebra.clone(),
            receiver.commitment_base(),
            message.clone(),
            &mut rng,
        );

        receiver.receive_commitment(commitment.clone()).unwrap();
        let (m, r) = committer.open();
        prop_assert!(receiver.check_opening(m, r).unwrap());

        // a different message with the same randomness never opens the
        // same commitment
        let mut second = PedersenReceiver::new(algebra.clone(), &mut rng);
        let (second_committer, second_commitment) = PedersenCommitter::commit(
            algebra.clone(),
            second.commitment_base(),
            message,
            &mut rng,
        );
        second.receive_commitment(second_commitment).unwrap();
        let (m2, r2) = second_committer.open();
        let other = algebra.scalar_add(m2, &algebra.scalar_from_u64(1));
        prop_assert!(!second.check_opening(&other, r2).unwrap());
    }

    #[test]
    fn shamir_reconstruction_is_subset_invariant(
        (threshold, total, subset) in sharing_strategy()
    ) {
        let algebra = Ristretto255::new();
        let mut rng = SecureRng::new();
        let secret = algebra.sample(&mut rng);

        let shares = shamir::split(&algebra, &secret, total, threshold, &mut rng).unwrap();
        let chosen: Vec<_> = subset.iter().map(|&i| shares[i].clone()).collect();

        let recovered = shamir::reconstruct(&algebra, &chosen, threshold).unwrap();
        prop_assert_eq!(recovered, secret);
    }

    #[test]
    fn shamir_below_threshold_always_fails(
        (threshold, total, subset) in sharing_strategy()
    ) {
        let algebra = Ristretto255::new();
        let mut rng = SecureRng::new();
        let secret = algebra.sample(&mut rng);

        let shares = shamir::split(&algebra, &secret, total, threshold, &mut rng).unwrap();
        let starved: Vec<_> = subset
            .iter()
            .take(threshold as usize - 1)
            .map(|&i| shares[i].clone())
            .collect();

        prop_assert!(shamir::reconstruct(&algebra, &starved, threshold).is_err());
    }
}
