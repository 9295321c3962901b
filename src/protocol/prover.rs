use rand_core::CryptoRngCore;

use super::relation::{derive_challenge, ProofMode, ScalarOf, SigmaProof, SigmaRelation};
use crate::{Error, Result};

/// Prover-side stages of the three-move exchange.
///
/// `Completed` and `Aborted` are terminal: no move transitions out of them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProverStage {
    /// Created; no move made yet.
    Ready,
    /// Commitment produced; awaiting the challenge.
    Committed,
    /// Response produced.
    Completed,
    /// A move was rejected or the transport failed.
    Aborted,
}

impl ProverStage {
    /// Whether this stage accepts no further moves.
    pub fn is_terminal(self) -> bool {
        matches!(self, ProverStage::Completed | ProverStage::Aborted)
    }
}

/// Generic prover for any [`SigmaRelation`].
///
/// Drives the three moves in order — commit, receive challenge, respond —
/// and rejects everything else. Fresh commitment randomness is drawn inside
/// [`SigmaProver::commit`] and consumed by [`SigmaProver::respond`], so a
/// session can never reuse a nonce: reuse across two challenges would let a
/// verifier extract the witness.
pub struct SigmaProver<R: SigmaRelation> {
    relation: R,
    statement: R::Statement,
    witness: R::Witness,
    stage: ProverStage,
    nonce: Option<R::Nonce>,
}

impl<R: SigmaRelation> SigmaProver<R> {
    pub fn new(relation: R, statement: R::Statement, witness: R::Witness) -> Self {
        Self {
            relation,
            statement,
            witness,
            stage: ProverStage::Ready,
            nonce: None,
        }
    }

    pub fn relation(&self) -> &R {
        &self.relation
    }

    pub fn statement(&self) -> &R::Statement {
        &self.statement
    }

    pub fn stage(&self) -> ProverStage {
        self.stage
    }

    /// First move: produces the commitment.
    pub fn commit<Rng: CryptoRngCore>(&mut self, rng: &mut Rng) -> Result<R::Commitment> {
        match self.stage {
            ProverStage::Ready => {}
            ProverStage::Committed => {
                self.stage = ProverStage::Aborted;
                return Err(Error::ProtocolViolation(
                    "duplicate commitment in one session".to_string(),
                ));
            }
            stage => {
                return Err(Error::ProtocolViolation(format!(
                    "commit is not a valid move in stage {stage:?}"
                )));
            }
        }

        let (commitment, nonce) = self.relation.commit(&self.statement, rng);
        self.nonce = Some(nonce);
        self.stage = ProverStage::Committed;
        Ok(commitment)
    }

    /// Third move: consumes the nonce and produces the response.
    pub fn respond(&mut self, challenge: &ScalarOf<R>) -> Result<R::Response> {
        match self.stage {
            ProverStage::Committed => {}
            ProverStage::Ready => {
                self.stage = ProverStage::Aborted;
                return Err(Error::ProtocolViolation(
                    "response requested before any commitment".to_string(),
                ));
            }
            stage => {
                return Err(Error::ProtocolViolation(format!(
                    "respond is not a valid move in stage {stage:?}"
                )));
            }
        }

        let nonce = self
            .nonce
            .take()
            .unwrap_or_else(|| unreachable!("a committed prover holds its nonce"));
        let response = self.relation.respond(&self.witness, nonce, challenge);
        self.stage = ProverStage::Completed;
        Ok(response)
    }

    /// Marks the session aborted, e.g. after a transport failure.
    pub fn abort(&mut self) {
        self.stage = ProverStage::Aborted;
        self.nonce = None;
    }

    /// Runs the whole exchange locally with a Fiat-Shamir challenge,
    /// producing a self-contained proof. Valid only from `Ready`.
    pub fn prove<Rng: CryptoRngCore>(
        &mut self,
        mode: ProofMode,
        rng: &mut Rng,
    ) -> Result<SigmaProof<R>> {
        if mode.is_interactive() {
            return Err(Error::ProtocolViolation(
                "interactive mode requires a live verifier".to_string(),
            ));
        }

        let commitment = self.commit(rng)?;
        let challenge = derive_challenge(&self.relation, mode, &self.statement, &commitment);
        let response = self.respond(&challenge)?;
        Ok(SigmaProof::new(commitment, challenge, response))
    }
}
