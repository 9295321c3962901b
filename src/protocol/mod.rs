/// Generic prover state machine.
pub mod prover;
/// The per-variant relation trait and Fiat-Shamir proof container.
pub mod relation;
/// Merlin transcript wrapper for challenge derivation.
pub mod transcript;
/// Generic verifier state machine.
pub mod verifier;

pub use prover::{ProverStage, SigmaProver};
pub use relation::{derive_challenge, ProofMode, ScalarOf, SigmaProof, SigmaRelation};
pub use transcript::ProofTranscript;
pub use verifier::{SigmaVerifier, VerifierStage};
