use rand_core::CryptoRngCore;

use super::ProofTranscript;
use crate::crypto::GroupAlgebra;
use crate::Result;

/// Scalar type of a relation's algebra.
pub type ScalarOf<R> = <<R as SigmaRelation>::Algebra as GroupAlgebra>::Scalar;

/// How the challenge of a proof is produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProofMode {
    /// Live three-move exchange; the verifier samples the challenge.
    Interactive,
    /// Fiat-Shamir transform, plain zero-knowledge-proof framing.
    Zkp,
    /// Fiat-Shamir transform, proof-of-knowledge framing.
    Zkpok,
}

impl ProofMode {
    /// Whether this mode needs a live verifier for the challenge.
    pub fn is_interactive(self) -> bool {
        matches!(self, ProofMode::Interactive)
    }

    pub(crate) fn transcript_label(self) -> &'static [u8] {
        match self {
            ProofMode::Interactive => b"sigma",
            ProofMode::Zkp => b"zkp",
            ProofMode::Zkpok => b"zkpok",
        }
    }
}

/// One protocol variant's algebra, plugged into the generic three-move state
/// machine: the statement/witness relation, the move formulas, the
/// verification equation, and the wire codec for the public pieces.
///
/// The witness deliberately has no codec; it never crosses the wire.
pub trait SigmaRelation: Clone + Send + Sync + 'static {
    type Algebra: GroupAlgebra;
    type Statement: Clone + core::fmt::Debug + Send + Sync;
    type Witness: Send + Sync;
    type Commitment: Clone + core::fmt::Debug + Send + Sync;
    /// Ephemeral commitment randomness, consumed by [`SigmaRelation::respond`].
    type Nonce: Send + Sync;
    type Response: Clone + core::fmt::Debug + Send + Sync;

    fn algebra(&self) -> &Self::Algebra;

    /// Computes the first move and its ephemeral randomness.
    fn commit<R: CryptoRngCore>(
        &self,
        statement: &Self::Statement,
        rng: &mut R,
    ) -> (Self::Commitment, Self::Nonce);

    /// Computes the third move. Takes the nonce by value: one nonce, one
    /// response.
    fn respond(
        &self,
        witness: &Self::Witness,
        nonce: Self::Nonce,
        challenge: &ScalarOf<Self>,
    ) -> Self::Response;

    /// The verification equation. Runs on public data only.
    fn check(
        &self,
        statement: &Self::Statement,
        commitment: &Self::Commitment,
        challenge: &ScalarOf<Self>,
        response: &Self::Response,
    ) -> bool;

    fn encode_statement(&self, statement: &Self::Statement) -> Vec<Vec<u8>>;
    fn decode_statement(&self, data: &[Vec<u8>]) -> Result<Self::Statement>;
    fn encode_commitment(&self, commitment: &Self::Commitment) -> Vec<Vec<u8>>;
    fn decode_commitment(&self, data: &[Vec<u8>]) -> Result<Self::Commitment>;
    fn encode_response(&self, response: &Self::Response) -> Vec<Vec<u8>>;
    fn decode_response(&self, data: &[Vec<u8>]) -> Result<Self::Response>;
}

/// Fiat-Shamir challenge: a hash of the mode label, the algebra, the
/// statement, and the commitment, in their wire encodings.
pub fn derive_challenge<R: SigmaRelation>(
    relation: &R,
    mode: ProofMode,
    statement: &R::Statement,
    commitment: &R::Commitment,
) -> ScalarOf<R> {
    let mut transcript = ProofTranscript::new(mode.transcript_label());
    transcript.append_algebra(relation.algebra().name());
    for part in relation.encode_statement(statement) {
        transcript.append_statement(&part);
    }
    for part in relation.encode_commitment(commitment) {
        transcript.append_commitment(&part);
    }
    relation.algebra().challenge_scalar(&transcript.challenge_bytes())
}

/// Self-contained non-interactive transcript: the ordered triple
/// (commitment, challenge, response). The statement travels beside it.
#[derive(Clone, Debug)]
pub struct SigmaProof<R: SigmaRelation> {
    commitment: R::Commitment,
    challenge: ScalarOf<R>,
    response: R::Response,
}

impl<R: SigmaRelation> SigmaProof<R> {
    pub fn new(commitment: R::Commitment, challenge: ScalarOf<R>, response: R::Response) -> Self {
        Self {
            commitment,
            challenge,
            response,
        }
    }

    pub fn commitment(&self) -> &R::Commitment {
        &self.commitment
    }

    pub fn challenge(&self) -> &ScalarOf<R> {
        &self.challenge
    }

    pub fn response(&self) -> &R::Response {
        &self.response
    }
}
