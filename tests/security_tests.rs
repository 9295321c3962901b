use crypto_bigint::{U256, U2048};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sigma_zkp::protocol::{ProverStage, SigmaProver, SigmaRelation, SigmaVerifier, VerifierStage};
use sigma_zkp::variants::dlog_equality::{DlogEqualityRelation, DlogEqualityWitness};
use sigma_zkp::variants::schnorr::{SchnorrRelation, SchnorrWitness};
use sigma_zkp::{Error, GroupAlgebra, Ristretto255, SchnorrGroup, SecureRng};

/// A deliberately tiny group (p = 23, q = 11, g = 4) so the whole challenge
/// space can be enumerated.
fn tiny_group() -> SchnorrGroup {
    SchnorrGroup::from_parameters(
        U2048::from_u64(23),
        U256::from_u64(11),
        U2048::from_u64(4),
    )
    .unwrap()
}

#[test]
fn forgery_succeeds_for_at_most_one_challenge() {
    let group = tiny_group();
    let relation = DlogEqualityRelation::new(group.clone());

    // a false statement: the two discrete logs differ
    let g1 = group.generator();
    let g2 = group.power(&group.generator(), &group.scalar_from_u64(2));
    let t1 = group.power(&g1, &group.scalar_from_u64(3));
    let t2 = group.power(&g2, &group.scalar_from_u64(5));
    let statement = relation
        .decode_statement(&[
            group.element_to_bytes(&g1),
            group.element_to_bytes(&t1),
            group.element_to_bytes(&g2),
            group.element_to_bytes(&t2),
        ])
        .unwrap();

    // the adversary prepares its commitment for one target challenge c0
    let target_challenge = group.scalar_from_u64(7);
    let planned_z = group.scalar_from_u64(4);
    let x1 = group.combine(
        &group.power(&g1, &planned_z),
        &group
            .invert(&group.power(&t1, &target_challenge))
            .unwrap(),
    );
    let x2 = group.combine(
        &group.power(&g2, &planned_z),
        &group
            .invert(&group.power(&t2, &target_challenge))
            .unwrap(),
    );
    let commitment = relation
        .decode_commitment(&[group.element_to_bytes(&x1), group.element_to_bytes(&x2)])
        .unwrap();

    // enumerate every challenge; for each, search every possible response
    let mut winning_challenges = 0;
    for c in 0..11u64 {
        let challenge = group.scalar_from_u64(c);
        let mut answerable = false;
        for z in 0..11u64 {
            let response = relation
                .decode_response(&[group.scalar_to_bytes(&group.scalar_from_u64(z))])
                .unwrap();
            if relation.check(&statement, &commitment, &challenge, &response) {
                answerable = true;
                break;
            }
        }
        if answerable {
            winning_challenges += 1;
        }
    }

    // soundness: 1 out of |challenge space|
    assert!(winning_challenges <= 1);
}

#[test]
fn two_sessions_never_share_a_commitment() {
    let mut rng = SecureRng::new();
    let relation = SchnorrRelation::new(Ristretto255::new());
    let x = relation.algebra().sample(&mut rng);
    let statement = relation.statement_for(&SchnorrWitness::new(x.clone()));

    let mut first = SigmaProver::new(
        relation.clone(),
        statement.clone(),
        SchnorrWitness::new(x.clone()),
    );
    let mut second = SigmaProver::new(relation.clone(), statement, SchnorrWitness::new(x));

    let c1 = first.commit(&mut rng).unwrap();
    let c2 = second.commit(&mut rng).unwrap();
    assert!(!relation.algebra().equal(c1.u(), c2.u()));
}

#[test]
fn deterministic_rng_injection_is_reproducible() {
    let relation = SchnorrRelation::new(Ristretto255::new());
    let x = relation.algebra().scalar_from_u64(99);
    let statement = relation.statement_for(&SchnorrWitness::new(x.clone()));

    let mut first_rng = ChaCha8Rng::seed_from_u64(42);
    let mut second_rng = ChaCha8Rng::seed_from_u64(42);

    let mut first = SigmaProver::new(
        relation.clone(),
        statement.clone(),
        SchnorrWitness::new(x.clone()),
    );
    let mut second = SigmaProver::new(relation.clone(), statement, SchnorrWitness::new(x));

    let c1 = first.commit(&mut first_rng).unwrap();
    let c2 = second.commit(&mut second_rng).unwrap();
    // same seeded source, same commitment: randomness is fully injectable
    assert!(relation.algebra().equal(c1.u(), c2.u()));
}

#[test]
fn prover_rejects_out_of_order_moves() {
    let mut rng = SecureRng::new();
    let relation = SchnorrRelation::new(Ristretto255::new());
    let witness = SchnorrWitness::random(relation.algebra(), &mut rng);
    let statement = relation.statement_for(&witness);
    let mut prover = SigmaProver::new(relation.clone(), statement, witness);

    // respond before commit
    let challenge = relation.algebra().scalar_from_u64(5);
    assert!(matches!(
        prover.respond(&challenge),
        Err(Error::ProtocolViolation(_))
    ));
    assert_eq!(prover.stage(), ProverStage::Aborted);

    // terminal stages accept nothing
    assert!(prover.commit(&mut rng).is_err());
    assert_eq!(prover.stage(), ProverStage::Aborted);
}

#[test]
fn completed_prover_accepts_no_further_moves() {
    let mut rng = SecureRng::new();
    let relation = SchnorrRelation::new(Ristretto255::new());
    let witness = SchnorrWitness::random(relation.algebra(), &mut rng);
    let statement = relation.statement_for(&witness);
    let mut prover = SigmaProver::new(relation.clone(), statement, witness);

    let _commitment = prover.commit(&mut rng).unwrap();
    let challenge = relation.algebra().scalar_from_u64(5);
    let _response = prover.respond(&challenge).unwrap();
    assert_eq!(prover.stage(), ProverStage::Completed);

    assert!(prover.respond(&challenge).is_err());
    assert!(prover.commit(&mut rng).is_err());
    assert_eq!(prover.stage(), ProverStage::Completed);
}

#[test]
fn verifier_rejects_out_of_order_moves() {
    let mut rng = SecureRng::new();
    let relation = SchnorrRelation::new(Ristretto255::new());
    let witness = SchnorrWitness::random(relation.algebra(), &mut rng);
    let statement = relation.statement_for(&witness);

    let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
    let commitment = prover.commit(&mut rng).unwrap();
    let challenge = relation.algebra().scalar_from_u64(5);
    let response = prover.respond(&challenge).unwrap();

    let mut verifier = SigmaVerifier::new(relation.clone(), statement.clone());
    assert!(matches!(
        verifier.verify(&response),
        Err(Error::ProtocolViolation(_))
    ));
    assert_eq!(verifier.stage(), VerifierStage::Aborted);

    // duplicate commitment on a fresh verifier
    let mut second = SigmaVerifier::new(relation, statement);
    second
        .receive_commitment(commitment.clone(), &mut rng)
        .unwrap();
    assert!(second.receive_commitment(commitment, &mut rng).is_err());
    assert_eq!(second.stage(), VerifierStage::Aborted);
}

#[test]
fn malformed_wire_scalars_are_rejected() {
    let group = SchnorrGroup::rfc5114();

    // too short
    assert!(group.scalar_from_bytes(&[1, 2, 3]).is_err());
    // exactly the group order is out of range
    let order_bytes = {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(
            "8CF83642A709A097B447997640129DA299B1A47D1EB3750BA308B0FE64F5FBD3",
            &mut bytes,
        )
        .unwrap();
        bytes
    };
    assert!(group.scalar_from_bytes(&order_bytes).is_err());
}

#[test]
fn malformed_wire_elements_are_rejected() {
    let group = SchnorrGroup::rfc5114();

    // zero is not a group element
    assert!(group.element_from_bytes(&[0u8; 256]).is_err());
    // out of range
    assert!(group.element_from_bytes(&[0xFF; 256]).is_err());
    // wrong length
    assert!(group.element_from_bytes(&[1u8; 255]).is_err());
}
