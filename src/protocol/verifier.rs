use rand_core::CryptoRngCore;

use super::relation::{derive_challenge, ProofMode, ScalarOf, SigmaProof, SigmaRelation};
use crate::crypto::GroupAlgebra;
use crate::{Error, Result};

/// Verifier-side stages of the three-move exchange.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VerifierStage {
    /// Created; waiting for the prover's commitment.
    AwaitingCommitment,
    /// Challenge issued; waiting for the response.
    AwaitingResponse,
    /// Verdict reached.
    Completed,
    /// A move was rejected or the transport failed.
    Aborted,
}

impl VerifierStage {
    /// Whether this stage accepts no further moves.
    pub fn is_terminal(self) -> bool {
        matches!(self, VerifierStage::Completed | VerifierStage::Aborted)
    }
}

/// Generic verifier for any [`SigmaRelation`].
///
/// Accepts exactly one commitment, issues exactly one freshly sampled
/// challenge, and accepts exactly one response. Anything out of order is a
/// [`Error::ProtocolViolation`] and collapses the machine to `Aborted`.
pub struct SigmaVerifier<R: SigmaRelation> {
    relation: R,
    statement: R::Statement,
    stage: VerifierStage,
    commitment: Option<R::Commitment>,
    challenge: Option<ScalarOf<R>>,
}

impl<R: SigmaRelation> SigmaVerifier<R> {
    pub fn new(relation: R, statement: R::Statement) -> Self {
        Self {
            relation,
            statement,
            stage: VerifierStage::AwaitingCommitment,
            commitment: None,
            challenge: None,
        }
    }

    pub fn relation(&self) -> &R {
        &self.relation
    }

    pub fn statement(&self) -> &R::Statement {
        &self.statement
    }

    pub fn stage(&self) -> VerifierStage {
        self.stage
    }

    /// Accepts the commitment and answers with a fresh challenge.
    pub fn receive_commitment<Rng: CryptoRngCore>(
        &mut self,
        commitment: R::Commitment,
        rng: &mut Rng,
    ) -> Result<ScalarOf<R>> {
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

        let mut bytes = [0u8; 64];
        rng.fill_bytes(&mut bytes);
        let challenge = self.relation.algebra().challenge_scalar(&bytes);

        self.commitment = Some(commitment);
        self.challenge = Some(challenge.clone());
        self.stage = VerifierStage::AwaitingResponse;
        Ok(challenge)
    }

    /// Final move: checks the response against the stored commitment and
    /// challenge. `Ok(false)` is a verification failure — a legitimate
    /// protocol outcome, not an error.
    pub fn verify(&mut self, response: &R::Response) -> Result<bool> {
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

        let commitment = self
            .commitment
            .take()
            .unwrap_or_else(|| unreachable!("a challenged verifier holds the commitment"));
        let challenge = self
            .challenge
            .take()
            .unwrap_or_else(|| unreachable!("a challenged verifier holds the challenge"));

        let accepted = self
            .relation
            .check(&self.statement, &commitment, &challenge, response);
        self.stage = VerifierStage::Completed;
        Ok(accepted)
    }

    /// Marks the session aborted, e.g. after a transport failure.
    pub fn abort(&mut self) {
        self.stage = VerifierStage::Aborted;
        self.commitment = None;
        self.challenge = None;
    }

    /// Checks a self-contained Fiat-Shamir proof. Stateless: no session is
    /// involved, and the challenge is recomputed from the transcript.
    pub fn verify_proof(
        relation: &R,
        statement: &R::Statement,
        proof: &SigmaProof<R>,
        mode: ProofMode,
    ) -> Result<bool> {
        if mode.is_interactive() {
            return Err(Error::ProtocolViolation(
                "interactive proofs cannot be verified from a transcript".to_string(),
            ));
        }

        let expected = derive_challenge(relation, mode, statement, proof.commitment());
        if expected != *proof.challenge() {
            return Ok(false);
        }

        Ok(relation.check(statement, proof.commitment(), proof.challenge(), proof.response()))
    }
}
