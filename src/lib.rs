//! Sigma-protocol zero-knowledge proof engine.
//!
//! A prover convinces a verifier that it holds a secret — a discrete
//! logarithm, a commitment opening, an equality of discrete logarithms, the
//! plaintext of a Paillier ciphertext — through a three-move
//! commit/challenge/response exchange carried over gRPC, or through a
//! self-contained Fiat-Shamir transcript for the `_zkp`/`_zkpok` variants.
//!
//! The engine is layered:
//!
//! - [`crypto::GroupAlgebra`] abstracts the algebra a protocol runs over;
//!   [`groups`] provides the multiplicative-group, Ristretto255, and Paillier
//!   implementations.
//! - [`protocol`] holds the generic three-move state machines, parameterized
//!   over a per-variant [`protocol::SigmaRelation`].
//! - [`variants`] supplies the concrete relations plus the non-sigma
//!   primitives (Pedersen commitments, Shamir secret sharing).
//! - [`session`] carries the moves between the roles and owns per-session
//!   verifier state.
//! - [`runner`] selects a variant by name, drives a role to completion, and
//!   reports the verdict.

/// Engine configuration.
pub mod config;
/// Algebra trait, modular arithmetic, and randomness.
pub mod crypto;
/// Error types.
pub mod error;
/// Concrete group implementations.
pub mod groups;
/// Generic three-move state machines and Fiat-Shamir transcripts.
pub mod protocol;
/// Variant selection and role drivers.
pub mod runner;
/// Session transport: gRPC service, session store, prover client.
pub mod session;
/// Concrete protocol variants.
pub mod variants;

/// Generated gRPC types.
pub mod proto {
    tonic::include_proto!("sigma");
}

pub use config::EngineConfig;
pub use crypto::{GroupAlgebra, SecureRng};
pub use error::{Error, Result};
pub use groups::{PaillierGroup, PaillierKeypair, Ristretto255, SchnorrGroup};
pub use protocol::{
    ProofMode, ProverStage, SigmaProof, SigmaProver, SigmaRelation, SigmaVerifier, VerifierStage,
};
pub use session::{SessionClient, SessionStore, SigmaServiceImpl};
pub use variants::Variant;
