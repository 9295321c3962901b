use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crypto_bigint::U1024;
use rand_core::CryptoRngCore;
use tokio::sync::RwLock;

use crate::groups::{PaillierGroup, Ristretto255, SchnorrGroup};
use crate::protocol::{SigmaRelation, SigmaVerifier};
use crate::variants::cspaillier::CiphertextRelation;
use crate::variants::dlog_equality::DlogEqualityRelation;
use crate::variants::pedersen::PedersenReceiver;
use crate::variants::schnorr::SchnorrRelation;
use crate::variants::Variant;
use crate::{Error, GroupAlgebra, Result};

/// Idle session lifetime before the sweeper reclaims it.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(300);

/// The verifier-side state machine of one in-flight session.
///
/// One arm per interactive variant family; the generic machines inside carry
/// the actual move sequencing.
pub enum VerifierSession {
    Schnorr(SigmaVerifier<SchnorrRelation<SchnorrGroup>>),
    SchnorrEc(SigmaVerifier<SchnorrRelation<Ristretto255>>),
    DlogEquality(SigmaVerifier<DlogEqualityRelation<SchnorrGroup>>),
    Pedersen(PedersenReceiver<SchnorrGroup>),
    PedersenEc(PedersenReceiver<Ristretto255>),
    CsPaillier(SigmaVerifier<CiphertextRelation>),
}

impl VerifierSession {
    /// Builds the machine for a freshly opened session, returning it together
    /// with any receiver-generated parameters for the prover.
    pub fn build<R: CryptoRngCore>(
        variant: Variant,
        statement: &[Vec<u8>],
        rng: &mut R,
    ) -> Result<(Self, Vec<Vec<u8>>)> {
        match variant {
            Variant::Schnorr => {
                let relation = SchnorrRelation::new(SchnorrGroup::rfc5114());
                let statement = relation.decode_statement(statement)?;
                Ok((
                    VerifierSession::Schnorr(SigmaVerifier::new(relation, statement)),
                    Vec::new(),
                ))
            }
            Variant::SchnorrEc => {
                let relation = SchnorrRelation::new(Ristretto255::new());
                let statement = relation.decode_statement(statement)?;
                Ok((
                    VerifierSession::SchnorrEc(SigmaVerifier::new(relation, statement)),
                    Vec::new(),
                ))
            }
            Variant::DlogEquality | Variant::Pseudonymsys => {
                let relation = DlogEqualityRelation::new(SchnorrGroup::rfc5114());
                let statement = relation.decode_statement(statement)?;
                Ok((
                    VerifierSession::DlogEquality(SigmaVerifier::new(relation, statement)),
                    Vec::new(),
                ))
            }
            Variant::Pedersen => {
                if !statement.is_empty() {
                    return Err(Error::ProtocolViolation(
                        "pedersen sessions open without a statement".to_string(),
                    ));
                }
                let algebra = SchnorrGroup::rfc5114();
                let receiver = PedersenReceiver::new(algebra.clone(), rng);
                let parameters = vec![algebra.element_to_bytes(receiver.commitment_base())];
                Ok((VerifierSession::Pedersen(receiver), parameters))
            }
            Variant::PedersenEc => {
                if !statement.is_empty() {
                    return Err(Error::ProtocolViolation(
                        "pedersen sessions open without a statement".to_string(),
                    ));
                }
                let algebra = Ristretto255::new();
                let receiver = PedersenReceiver::new(algebra.clone(), rng);
                let parameters = vec![algebra.element_to_bytes(receiver.commitment_base())];
                Ok((VerifierSession::PedersenEc(receiver), parameters))
            }
            Variant::CsPaillier => {
                // the first statement part carries the prover's public modulus
                if statement.is_empty() {
                    return Err(Error::ProtocolViolation(
                        "ciphertext statement is empty".to_string(),
                    ));
                }
                if statement[0].len() != 128 {
                    return Err(Error::InvalidParams(
                        "Paillier modulus must be 128 bytes".to_string(),
                    ));
                }
                let modulus = U1024::from_be_slice(&statement[0]);
                let relation = CiphertextRelation::new(PaillierGroup::from_modulus(modulus)?);
                let statement = relation.decode_statement(statement)?;
                Ok((
                    VerifierSession::CsPaillier(SigmaVerifier::new(relation, statement)),
                    Vec::new(),
                ))
            }
            Variant::SchnorrZkp
            | Variant::SchnorrZkpok
            | Variant::SchnorrEcZkp
            | Variant::SchnorrEcZkpok => Err(Error::InvalidParams(format!(
                "variant '{variant}' is non-interactive; submit a transcript instead"
            ))),
            Variant::DlogEqualityBlindedTranscript | Variant::SplitSecret => {
                Err(Error::InvalidParams(format!(
                    "variant '{variant}' runs locally and has no network sessions"
                )))
            }
        }
    }

    /// Handles the commitment move, answering with the encoded challenge
    /// (empty for Pedersen, which has no challenge).
    pub fn commit_move<R: CryptoRngCore>(
        &mut self,
        data: &[Vec<u8>],
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        match self {
            VerifierSession::Schnorr(verifier) => sigma_commit(verifier, data, rng),
            VerifierSession::SchnorrEc(verifier) => sigma_commit(verifier, data, rng),
            VerifierSession::DlogEquality(verifier) => sigma_commit(verifier, data, rng),
            VerifierSession::CsPaillier(verifier) => sigma_commit(verifier, data, rng),
            VerifierSession::Pedersen(receiver) => pedersen_commit(receiver, data),
            VerifierSession::PedersenEc(receiver) => pedersen_commit(receiver, data),
        }
    }

    /// Handles the response move, returning the verdict.
    pub fn respond_move(&mut self, data: &[Vec<u8>]) -> Result<bool> {
        match self {
            VerifierSession::Schnorr(verifier) => sigma_respond(verifier, data),
            VerifierSession::SchnorrEc(verifier) => sigma_respond(verifier, data),
            VerifierSession::DlogEquality(verifier) => sigma_respond(verifier, data),
            VerifierSession::CsPaillier(verifier) => sigma_respond(verifier, data),
            VerifierSession::Pedersen(_) | VerifierSession::PedersenEc(_) => {
                Err(Error::ProtocolViolation(
                    "pedersen sessions expect a reveal, not a response".to_string(),
                ))
            }
        }
    }

    /// Handles a Pedersen reveal, returning the verdict.
    pub fn reveal_move(&mut self, data: &[Vec<u8>]) -> Result<bool> {
        match self {
            VerifierSession::Pedersen(receiver) => pedersen_reveal(receiver, data),
            VerifierSession::PedersenEc(receiver) => pedersen_reveal(receiver, data),
            _ => Err(Error::ProtocolViolation(
                "only pedersen sessions accept a reveal".to_string(),
            )),
        }
    }
}

fn sigma_commit<R: SigmaRelation, Rng: CryptoRngCore>(
    verifier: &mut SigmaVerifier<R>,
    data: &[Vec<u8>],
    rng: &mut Rng,
) -> Result<Vec<u8>> {
    let commitment = verifier.relation().decode_commitment(data)?;
    let challenge = verifier.receive_commitment(commitment, rng)?;
    Ok(verifier.relation().algebra().scalar_to_bytes(&challenge))
}

fn sigma_respond<R: SigmaRelation>(
    verifier: &mut SigmaVerifier<R>,
    data: &[Vec<u8>],
) -> Result<bool> {
    let response = verifier.relation().decode_response(data)?;
    verifier.verify(&response)
}

fn pedersen_commit<A: GroupAlgebra>(
    receiver: &mut PedersenReceiver<A>,
    data: &[Vec<u8>],
) -> Result<Vec<u8>> {
    if data.len() != 1 {
        return Err(Error::ProtocolViolation(format!(
            "pedersen commitment carries {} parts, expected 1",
            data.len()
        )));
    }
    let commitment = receiver.algebra().element_from_bytes(&data[0])?;
    receiver.receive_commitment(commitment)?;
    Ok(Vec::new())
}

fn pedersen_reveal<A: GroupAlgebra>(
    receiver: &mut PedersenReceiver<A>,
    data: &[Vec<u8>],
) -> Result<bool> {
    if data.len() != 2 {
        return Err(Error::ProtocolViolation(format!(
            "pedersen opening carries {} parts, expected 2",
            data.len()
        )));
    }
    let message = receiver.algebra().scalar_from_bytes(&data[0])?;
    let randomness = receiver.algebra().scalar_from_bytes(&data[1])?;
    receiver.check_opening(&message, &randomness)
}

/// One stored session: its variant tag, machine, and creation time.
pub struct SessionData {
    variant: Variant,
    machine: VerifierSession,
    created_at: u64,
}

impl SessionData {
    pub fn new(variant: Variant, machine: VerifierSession) -> Self {
        Self {
            variant,
            machine,
            created_at: unix_now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        unix_now().saturating_sub(self.created_at) >= ttl.as_secs()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| unreachable!("system time is after UNIX_EPOCH"))
        .as_secs()
}

/// Outcome counters across a store's lifetime.
#[derive(Debug, Default)]
pub struct SessionCounters {
    accepted: AtomicU64,
    rejected: AtomicU64,
    aborted: AtomicU64,
}

impl SessionCounters {
    /// Proofs that verified.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Proofs whose verification equation failed.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Sessions torn down by protocol violations, expiry, or transport loss.
    pub fn aborted(&self) -> u64 {
        self.aborted.load(Ordering::Relaxed)
    }
}

/// Verifier-side session registry.
///
/// Sessions are independent: each entry owns its machine, moves within one
/// session are sequenced by that machine, and no state is shared across
/// entries. Any rejected move removes the session; other sessions are
/// unaffected.
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
    counters: Arc<SessionCounters>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::new(SessionCounters::default()),
            ttl,
        }
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    /// Registers a freshly opened session under its id.
    pub async fn create(&self, session_id: String, data: SessionData) -> Result<()> {
        let mut sessions = self.sessions.write().await;

        if sessions.contains_key(&session_id) {
            return Err(Error::ProtocolViolation(format!(
                "session '{session_id}' already exists"
            )));
        }

        sessions.insert(session_id, data);
        Ok(())
    }

    /// Drives the commitment move of a stored session.
    pub async fn commit_move<R: CryptoRngCore>(
        &self,
        session_id: &str,
        variant: Variant,
        data: &[Vec<u8>],
        rng: &mut R,
    ) -> Result<Vec<u8>> {
        let mut sessions = self.sessions.write().await;
        let entry = self.checked_entry(&mut sessions, session_id, variant)?;

        match entry.machine.commit_move(data, rng) {
            Ok(challenge) => Ok(challenge),
            Err(error) => {
                sessions.remove(session_id);
                self.counters.aborted.fetch_add(1, Ordering::Relaxed);
                Err(error)
            }
        }
    }

    /// Drives the response move; the session is consumed either way.
    pub async fn respond_move(
        &self,
        session_id: &str,
        variant: Variant,
        data: &[Vec<u8>],
    ) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        let entry = self.checked_entry(&mut sessions, session_id, variant)?;

        let outcome = entry.machine.respond_move(data);
        sessions.remove(session_id);
        match outcome {
            Ok(accepted) => {
                self.record_verdict(accepted);
                Ok(accepted)
            }
            Err(error) => {
                self.counters.aborted.fetch_add(1, Ordering::Relaxed);
                Err(error)
            }
        }
    }

    /// Drives a Pedersen reveal; the session is consumed either way.
    pub async fn reveal_move(
        &self,
        session_id: &str,
        variant: Variant,
        data: &[Vec<u8>],
    ) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        let entry = self.checked_entry(&mut sessions, session_id, variant)?;

        let outcome = entry.machine.reveal_move(data);
        sessions.remove(session_id);
        match outcome {
            Ok(accepted) => {
                self.record_verdict(accepted);
                Ok(accepted)
            }
            Err(error) => {
                self.counters.aborted.fetch_add(1, Ordering::Relaxed);
                Err(error)
            }
        }
    }

    /// Records a verdict that did not go through a stored session
    /// (non-interactive transcripts).
    pub fn record_verdict(&self, accepted: bool) {
        if accepted {
            self.counters.accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.counters.rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of in-flight sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Removes all expired sessions.
    pub async fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write().await;
        let ttl = self.ttl;

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, data)| data.is_expired(ttl))
            .map(|(id, _)| id.clone())
            .collect();

        for session_id in expired {
            sessions.remove(&session_id);
            self.counters.aborted.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn checked_entry<'a>(
        &self,
        sessions: &'a mut HashMap<String, SessionData>,
        session_id: &str,
        variant: Variant,
    ) -> Result<&'a mut SessionData> {
        let (entry_variant, expired) = match sessions.get(session_id) {
            Some(entry) => (entry.variant, entry.is_expired(self.ttl)),
            None => {
                return Err(Error::ProtocolViolation(format!(
                    "unknown session '{session_id}'"
                )))
            }
        };

        if entry_variant != variant {
            sessions.remove(session_id);
            self.counters.aborted.fetch_add(1, Ordering::Relaxed);
            return Err(Error::ProtocolViolation(format!(
                "session belongs to variant '{entry_variant}', move tagged '{variant}'"
            )));
        }

        if expired {
            sessions.remove(session_id);
            self.counters.aborted.fetch_add(1, Ordering::Relaxed);
            return Err(Error::ProtocolViolation("session expired".to_string()));
        }

        sessions
            .get_mut(session_id)
            .ok_or_else(|| Error::ProtocolViolation(format!("unknown session '{session_id}'")))
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            counters: Arc::clone(&self.counters),
            ttl: self.ttl,
        }
    }
}
