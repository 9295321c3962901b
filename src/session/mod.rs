/// Prover-side transport client.
pub mod client;
/// gRPC verifier service implementation.
pub mod service;
/// Session registry and per-session verifier state.
pub mod state;

pub use client::{OpenedSession, SessionClient};
pub use service::SigmaServiceImpl;
pub use state::{SessionCounters, SessionData, SessionStore, VerifierSession};
