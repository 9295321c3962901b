use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::expect_parts;
use crate::crypto::GroupAlgebra;
use crate::protocol::{ProofTranscript, SigmaRelation, VerifierStage};
use crate::{Error, Result};

/// Chaum-Pedersen discrete-log equality: the prover knows `s` such that
/// `t1 = g1^s` and `t2 = g2^s` — two linked Schnorr instances sharing one
/// witness and one nonce.
///
/// The bases travel inside the statement, so arbitrary generator pairs work
/// without reconfiguring the relation.
#[derive(Clone, Debug)]
pub struct DlogEqualityRelation<A: GroupAlgebra> {
    algebra: A,
}

impl<A: GroupAlgebra> DlogEqualityRelation<A> {
    pub fn new(algebra: A) -> Self {
        Self { algebra }
    }

    /// Builds a statement from two bases and the shared exponent.
    pub fn statement_for(
        &self,
        g1: A::Element,
        g2: A::Element,
        witness: &DlogEqualityWitness<A>,
    ) -> DlogEqualityStatement<A> {
        let t1 = self.algebra.power(&g1, &witness.s);
        let t2 = self.algebra.power(&g2, &witness.s);
        DlogEqualityStatement { g1, t1, g2, t2 }
    }
}

/// The shared secret exponent. Zeroized on drop.
pub struct DlogEqualityWitness<A: GroupAlgebra> {
    s: A::Scalar,
}

impl<A: GroupAlgebra> DlogEqualityWitness<A> {
    pub fn new(s: A::Scalar) -> Self {
        Self { s }
    }
}

impl<A: GroupAlgebra> Zeroize for DlogEqualityWitness<A> {
    fn zeroize(&mut self) {
        self.s.zeroize();
    }
}

impl<A: GroupAlgebra> Drop for DlogEqualityWitness<A> {
    fn drop(&mut self) {
        self.s.zeroize();
    }
}

impl<A: GroupAlgebra> ZeroizeOnDrop for DlogEqualityWitness<A> {}

/// The public claim `(g1, t1, g2, t2)` with `log_g1(t1) = log_g2(t2)`.
#[derive(Clone, Debug)]
pub struct DlogEqualityStatement<A: GroupAlgebra> {
    g1: A::Element,
    t1: A::Element,
    g2: A::Element,
    t2: A::Element,
}

impl<A: GroupAlgebra> DlogEqualityStatement<A> {
    pub fn new(g1: A::Element, t1: A::Element, g2: A::Element, t2: A::Element) -> Self {
        Self { g1, t1, g2, t2 }
    }

    pub fn g1(&self) -> &A::Element {
        &self.g1
    }

    pub fn t1(&self) -> &A::Element {
        &self.t1
    }

    pub fn g2(&self) -> &A::Element {
        &self.g2
    }

    pub fn t2(&self) -> &A::Element {
        &self.t2
    }
}

/// First move: `(x1, x2) = (g1^r, g2^r)`.
#[derive(Clone, Debug)]
pub struct DlogEqualityCommitment<A: GroupAlgebra> {
    x1: A::Element,
    x2: A::Element,
}

impl<A: GroupAlgebra> DlogEqualityCommitment<A> {
    pub fn x1(&self) -> &A::Element {
        &self.x1
    }

    pub fn x2(&self) -> &A::Element {
        &self.x2
    }
}

/// Ephemeral commitment randomness. Zeroized on drop.
pub struct DlogEqualityNonce<A: GroupAlgebra> {
    r: A::Scalar,
}

impl<A: GroupAlgebra> Zeroize for DlogEqualityNonce<A> {
    fn zeroize(&mut self) {
        self.r.zeroize();
    }
}

impl<A: GroupAlgebra> Drop for DlogEqualityNonce<A> {
    fn drop(&mut self) {
        self.r.zeroize();
    }
}

impl<A: GroupAlgebra> ZeroizeOnDrop for DlogEqualityNonce<A> {}

/// Third move: `z = r + c·s`.
#[derive(Clone, Debug)]
pub struct DlogEqualityResponse<A: GroupAlgebra> {
    z: A::Scalar,
}

impl<A: GroupAlgebra> DlogEqualityResponse<A> {
    pub fn z(&self) -> &A::Scalar {
        &self.z
    }
}

impl<A: GroupAlgebra> SigmaRelation for DlogEqualityRelation<A> {
    type Algebra = A;
    type Statement = DlogEqualityStatement<A>;
    type Witness = DlogEqualityWitness<A>;
    type Commitment = DlogEqualityCommitment<A>;
    type Nonce = DlogEqualityNonce<A>;
    type Response = DlogEqualityResponse<A>;

    fn algebra(&self) -> &A {
        &self.algebra
    }

    fn commit<R: CryptoRngCore>(
        &self,
        statement: &Self::Statement,
        rng: &mut R,
    ) -> (Self::Commitment, Self::Nonce) {
        let r = self.algebra.sample(rng);
        let x1 = self.algebra.power(&statement.g1, &r);
        let x2 = self.algebra.power(&statement.g2, &r);
        (DlogEqualityCommitment { x1, x2 }, DlogEqualityNonce { r })
    }

    fn respond(
        &self,
        witness: &Self::Witness,
        nonce: Self::Nonce,
        challenge: &A::Scalar,
    ) -> Self::Response {
        let cs = self.algebra.scalar_mul(challenge, &witness.s);
        DlogEqualityResponse {
            z: self.algebra.scalar_add(&nonce.r, &cs),
        }
    }

    fn check(
        &self,
        statement: &Self::Statement,
        commitment: &Self::Commitment,
        challenge: &A::Scalar,
        response: &Self::Response,
    ) -> bool {
        // g1^z == x1 * t1^c  and  g2^z == x2 * t2^c
        let lhs1 = self.algebra.power(&statement.g1, &response.z);
        let rhs1 = self
            .algebra
            .combine(&commitment.x1, &self.algebra.power(&statement.t1, challenge));

        let lhs2 = self.algebra.power(&statement.g2, &response.z);
        let rhs2 = self
            .algebra
            .combine(&commitment.x2, &self.algebra.power(&statement.t2, challenge));

        self.algebra.equal(&lhs1, &rhs1) & self.algebra.equal(&lhs2, &rhs2)
    }

    fn encode_statement(&self, statement: &Self::Statement) -> Vec<Vec<u8>> {
        vec![
            self.algebra.element_to_bytes(&statement.g1),
            self.algebra.element_to_bytes(&statement.t1),
            self.algebra.element_to_bytes(&statement.g2),
            self.algebra.element_to_bytes(&statement.t2),
        ]
    }

    fn decode_statement(&self, data: &[Vec<u8>]) -> Result<Self::Statement> {
        expect_parts(data, 4, "dlog-equality statement")?;
        let g1 = self.algebra.element_from_bytes(&data[0])?;
        let t1 = self.algebra.element_from_bytes(&data[1])?;
        let g2 = self.algebra.element_from_bytes(&data[2])?;
        let t2 = self.algebra.element_from_bytes(&data[3])?;
        for element in [&g1, &t1, &g2, &t2] {
            if self.algebra.is_identity(element) {
                return Err(Error::InvalidGroupElement(
                    "statement contains the identity element".to_string(),
                ));
            }
        }
        Ok(DlogEqualityStatement { g1, t1, g2, t2 })
    }

    fn encode_commitment(&self, commitment: &Self::Commitment) -> Vec<Vec<u8>> {
        vec![
            self.algebra.element_to_bytes(&commitment.x1),
            self.algebra.element_to_bytes(&commitment.x2),
        ]
    }

    fn decode_commitment(&self, data: &[Vec<u8>]) -> Result<Self::Commitment> {
        expect_parts(data, 2, "dlog-equality commitment")?;
        Ok(DlogEqualityCommitment {
            x1: self.algebra.element_from_bytes(&data[0])?,
            x2: self.algebra.element_from_bytes(&data[1])?,
        })
    }

    fn encode_response(&self, response: &Self::Response) -> Vec<Vec<u8>> {
        vec![self.algebra.scalar_to_bytes(&response.z)]
    }

    fn decode_response(&self, data: &[Vec<u8>]) -> Result<Self::Response> {
        expect_parts(data, 1, "dlog-equality response")?;
        Ok(DlogEqualityResponse {
            z: self.algebra.scalar_from_bytes(&data[0])?,
        })
    }
}

/// A blinded transcript `(A, B, ĉ, ẑ)` of a dlog-equality run.
///
/// The challenge is hash-derived, so the transcript stands on its own: a
/// third party re-verifies it against `(g1, t1)` and the blinded pair without
/// the witness and without talking to either original party — and cannot tell
/// which `(g2, t2)` it attests to.
#[derive(Clone, Debug)]
pub struct BlindedTranscript<A: GroupAlgebra> {
    a: A::Element,
    b: A::Element,
    challenge: A::Scalar,
    z: A::Scalar,
}

impl<A: GroupAlgebra> BlindedTranscript<A> {
    pub fn a(&self) -> &A::Element {
        &self.a
    }

    pub fn b(&self) -> &A::Element {
        &self.b
    }

    pub fn challenge(&self) -> &A::Scalar {
        &self.challenge
    }

    pub fn z(&self) -> &A::Scalar {
        &self.z
    }
}

/// The blinded second statement pair `(G2, T2) = (g2^γ, t2^γ)`.
#[derive(Clone, Debug)]
pub struct BlindedPair<A: GroupAlgebra> {
    g2: A::Element,
    t2: A::Element,
}

impl<A: GroupAlgebra> BlindedPair<A> {
    pub fn g2(&self) -> &A::Element {
        &self.g2
    }

    pub fn t2(&self) -> &A::Element {
        &self.t2
    }
}

/// Verdict of a blinded run plus the artifacts handed to third parties.
pub struct BlindedOutcome<A: GroupAlgebra> {
    pub accepted: bool,
    pub transcript: BlindedTranscript<A>,
    pub pair: BlindedPair<A>,
}

struct BlindingState<A: GroupAlgebra> {
    commitment: DlogEqualityCommitment<A>,
    challenge: A::Scalar,
    hash_challenge: A::Scalar,
    alpha: A::Scalar,
    a: A::Element,
    b: A::Element,
    pair: BlindedPair<A>,
}

/// Designated verifier for dlog-equality that emits a blinded transcript.
///
/// The challenge is `c = ĉ + β` where `ĉ` hashes the blinded commitments, so
/// the transcript the verifier walks away with satisfies the hash-derived
/// challenge equation that third parties check.
pub struct BlindedTranscriptVerifier<A: GroupAlgebra> {
    relation: DlogEqualityRelation<A>,
    statement: DlogEqualityStatement<A>,
    stage: VerifierStage,
    state: Option<BlindingState<A>>,
}

impl<A: GroupAlgebra> BlindedTranscriptVerifier<A> {
    pub fn new(relation: DlogEqualityRelation<A>, statement: DlogEqualityStatement<A>) -> Self {
        Self {
            relation,
            statement,
            stage: VerifierStage::AwaitingCommitment,
            state: None,
        }
    }

    pub fn stage(&self) -> VerifierStage {
        self.stage
    }

    /// Accepts the commitment, picks the blinding exponents, and answers
    /// with the blinded challenge.
    pub fn receive_commitment<R: CryptoRngCore>(
        &mut self,
        commitment: DlogEqualityCommitment<A>,
        rng: &mut R,
    ) -> Result<A::Scalar> {
        match self.stage {
            VerifierStage::AwaitingCommitment => {}
            VerifierStage::AwaitingResponse => {
                self.stage = VerifierStage::Aborted;
                return Err(Error::ProtocolViolation(
                    "duplicate commitment in one session".to_string(),
                ));
            }
            stage => {
                return Err(Error::ProtocolViolation(format!(
                    "commitment is not a valid move in stage {stage:?}"
                )));
            }
        }

        let algebra = self.relation.algebra();
        let alpha = algebra.sample(rng);
        let beta = algebra.sample(rng);
        let gamma = algebra.sample(rng);

        let pair = BlindedPair {
            g2: algebra.power(&self.statement.g2, &gamma),
            t2: algebra.power(&self.statement.t2, &gamma),
        };

        // A = x1 * g1^α * t1^β
        let a = algebra.combine(
            &algebra.combine(&commitment.x1, &algebra.power(&self.statement.g1, &alpha)),
            &algebra.power(&self.statement.t1, &beta),
        );
        // B = (x2 * g2^α * t2^β)^γ
        let inner = algebra.combine(
            &algebra.combine(&commitment.x2, &algebra.power(&self.statement.g2, &alpha)),
            &algebra.power(&self.statement.t2, &beta),
        );
        let b = algebra.power(&inner, &gamma);

        let hash_challenge =
            transcript_challenge(algebra, &self.statement.g1, &self.statement.t1, &pair, &a, &b);
        let challenge = algebra.scalar_add(&hash_challenge, &beta);

        self.state = Some(BlindingState {
            commitment,
            challenge: challenge.clone(),
            hash_challenge,
            alpha,
            a,
            b,
            pair,
        });
        self.stage = VerifierStage::AwaitingResponse;
        Ok(challenge)
    }

    /// Final move: verdict plus the blinded transcript.
    pub fn verify(&mut self, response: &DlogEqualityResponse<A>) -> Result<BlindedOutcome<A>> {
        match self.stage {
            VerifierStage::AwaitingResponse => {}
            VerifierStage::AwaitingCommitment => {
                self.stage = VerifierStage::Aborted;
                return Err(Error::ProtocolViolation(
                    "response received before any commitment".to_string(),
                ));
            }
            stage => {
                return Err(Error::ProtocolViolation(format!(
                    "response is not a valid move in stage {stage:?}"
                )));
            }
        }

        let state = self
            .state
            .take()
            .unwrap_or_else(|| unreachable!("a challenged verifier holds its blinding state"));

        let algebra = self.relation.algebra();
        let accepted = self.relation.check(
            &self.statement,
            &state.commitment,
            &state.challenge,
            response,
        );

        let transcript = BlindedTranscript {
            a: state.a,
            b: state.b,
            challenge: state.hash_challenge,
            z: algebra.scalar_add(response.z(), &state.alpha),
        };

        self.stage = VerifierStage::Completed;
        Ok(BlindedOutcome {
            accepted,
            transcript,
            pair: state.pair,
        })
    }
}

/// Third-party verification of a blinded transcript against `(g1, t1)` and a
/// blinded pair. Needs no witness and no interaction.
pub fn verify_blinded_transcript<A: GroupAlgebra>(
    algebra: &A,
    transcript: &BlindedTranscript<A>,
    g1: &A::Element,
    t1: &A::Element,
    pair: &BlindedPair<A>,
) -> bool {
    let expected = transcript_challenge(algebra, g1, t1, pair, &transcript.a, &transcript.b);
    if expected != transcript.challenge {
        return false;
    }

    // g1^ẑ == A * t1^ĉ  and  G2^ẑ == B * T2^ĉ
    let lhs1 = algebra.power(g1, &transcript.z);
    let rhs1 = algebra.combine(&transcript.a, &algebra.power(t1, &transcript.challenge));
    let lhs2 = algebra.power(&pair.g2, &transcript.z);
    let rhs2 = algebra.combine(&transcript.b, &algebra.power(&pair.t2, &transcript.challenge));

    algebra.equal(&lhs1, &rhs1) & algebra.equal(&lhs2, &rhs2)
}

fn transcript_challenge<A: GroupAlgebra>(
    algebra: &A,
    g1: &A::Element,
    t1: &A::Element,
    pair: &BlindedPair<A>,
    a: &A::Element,
    b: &A::Element,
) -> A::Scalar {
    let mut transcript = ProofTranscript::new(b"dlog-equality-blinded");
    transcript.append_algebra(algebra.name());
    for element in [g1, t1, &pair.g2, &pair.t2] {
        transcript.append_statement(&algebra.element_to_bytes(element));
    }
    transcript.append_commitment(&algebra.element_to_bytes(a));
    transcript.append_commitment(&algebra.element_to_bytes(b));
    algebra.challenge_scalar(&transcript.challenge_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SecureRng;
    use crate::groups::SchnorrGroup;
    use crate::protocol::{SigmaProver, SigmaVerifier};

    fn random_base(group: &SchnorrGroup, rng: &mut SecureRng) -> <SchnorrGroup as GroupAlgebra>::Element {
        group.power(&group.generator(), &group.sample(rng))
    }

    fn setup() -> (
        DlogEqualityRelation<SchnorrGroup>,
        DlogEqualityStatement<SchnorrGroup>,
        DlogEqualityWitness<SchnorrGroup>,
    ) {
        let mut rng = SecureRng::new();
        let group = SchnorrGroup::rfc5114();
        let relation = DlogEqualityRelation::new(group.clone());
        let witness = DlogEqualityWitness::new(group.sample(&mut rng));
        let g1 = random_base(&group, &mut rng);
        let g2 = random_base(&group, &mut rng);
        let statement = relation.statement_for(g1, g2, &witness);
        (relation, statement, witness)
    }

    #[test]
    fn interactive_completeness() {
        let mut rng = SecureRng::new();
        let (relation, statement, witness) = setup();

        let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
        let mut verifier = SigmaVerifier::new(relation, statement);

        let commitment = prover.commit(&mut rng).unwrap();
        let challenge = verifier.receive_commitment(commitment, &mut rng).unwrap();
        let response = prover.respond(&challenge).unwrap();
        assert!(verifier.verify(&response).unwrap());
    }

    #[test]
    fn unequal_logs_fail() {
        let mut rng = SecureRng::new();
        let group = SchnorrGroup::rfc5114();
        let relation = DlogEqualityRelation::new(group.clone());

        let witness = DlogEqualityWitness::new(group.sample(&mut rng));
        let g1 = random_base(&group, &mut rng);
        let g2 = random_base(&group, &mut rng);
        let honest = relation.statement_for(g1, g2, &witness);
        // swap in a t2 with a different exponent
        let other = group.power(honest.g2(), &group.sample(&mut rng));
        let statement = DlogEqualityStatement::new(
            honest.g1().clone(),
            honest.t1().clone(),
            honest.g2().clone(),
            other,
        );

        let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
        let mut verifier = SigmaVerifier::new(relation, statement);

        let commitment = prover.commit(&mut rng).unwrap();
        let challenge = verifier.receive_commitment(commitment, &mut rng).unwrap();
        let response = prover.respond(&challenge).unwrap();
        assert!(!verifier.verify(&response).unwrap());
    }

    #[test]
    fn blinded_transcript_verifies_for_third_party() {
        let mut rng = SecureRng::new();
        let (relation, statement, witness) = setup();
        let algebra = relation.algebra().clone();

        let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
        let mut verifier = BlindedTranscriptVerifier::new(relation, statement.clone());

        let commitment = prover.commit(&mut rng).unwrap();
        let challenge = verifier.receive_commitment(commitment, &mut rng).unwrap();
        let response = prover.respond(&challenge).unwrap();
        let outcome = verifier.verify(&response).unwrap();

        assert!(outcome.accepted);
        assert!(verify_blinded_transcript(
            &algebra,
            &outcome.transcript,
            statement.g1(),
            statement.t1(),
            &outcome.pair,
        ));
    }

    #[test]
    fn tampered_blinded_transcript_fails() {
        let mut rng = SecureRng::new();
        let (relation, statement, witness) = setup();
        let algebra = relation.algebra().clone();

        let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
        let mut verifier = BlindedTranscriptVerifier::new(relation, statement.clone());

        let commitment = prover.commit(&mut rng).unwrap();
        let challenge = verifier.receive_commitment(commitment, &mut rng).unwrap();
        let response = prover.respond(&challenge).unwrap();
        let outcome = verifier.verify(&response).unwrap();

        let mut tampered = outcome.transcript.clone();
        tampered.z = algebra.scalar_add(&tampered.z, &algebra.scalar_from_u64(1));
        assert!(!verify_blinded_transcript(
            &algebra,
            &tampered,
            statement.g1(),
            statement.t1(),
            &outcome.pair,
        ));
    }

    #[test]
    fn statement_codec_round_trip() {
        let (relation, statement, _witness) = setup();
        let encoded = relation.encode_statement(&statement);
        let decoded = relation.decode_statement(&encoded).unwrap();
        assert!(relation.algebra().equal(decoded.g1(), statement.g1()));
        assert!(relation.algebra().equal(decoded.t2(), statement.t2()));
    }
}
