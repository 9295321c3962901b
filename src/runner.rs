//! Variant selection and role drivers.
//!
//! Maps each variant to its prover, verifier, or in-process flow and owns the
//! published output contract: verdict lines go to standard error (the
//! verifier stays silent on success), and the Pedersen prover additionally
//! prints `ok` on standard output. External scripts assert on these literal
//! tokens, so they must stay stable:
//!
//! - Schnorr family and `cspaillier`: `knowledge proved` / `knowledge NOT proved`
//! - Pedersen family: a `decommitting` line, plus `ok` on stdout
//! - `dlog_equality` / `pseudonymsys`: `proved: true` / `proved: false`
//! - `dlog_equality_blinded_transcript`: `proved: true`, then
//!   `is the transcript valid?`, then `transcript valid: true`
//! - `split_secret`: `reconstructed secret: <secret>`

use std::time::Duration;

use tokio::signal;
use tonic::transport::Server;
use tracing::info;

use crate::config::EngineConfig;
use crate::crypto::{GroupAlgebra, SecureRng};
use crate::groups::{PaillierKeypair, Ristretto255, SchnorrGroup};
use crate::proto::sigma_service_server::SigmaServiceServer;
use crate::protocol::{SigmaProver, SigmaRelation, SigmaVerifier};
use crate::session::{SessionClient, SessionStore, SigmaServiceImpl};
use crate::variants::cspaillier::CiphertextRelation;
use crate::variants::dlog_equality::{
    verify_blinded_transcript, BlindedTranscriptVerifier, DlogEqualityRelation,
    DlogEqualityWitness,
};
use crate::variants::pedersen::PedersenCommitter;
use crate::variants::pseudonym::MasterKey;
use crate::variants::schnorr::{SchnorrRelation, SchnorrWitness};
use crate::variants::{shamir, Variant};
use crate::{Error, Result};

/// Interval between session-expiry sweeps on the verifier.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// The demonstration passphrase shared by the split_secret flow.
const DEMO_SECRET: &str = "password";

/// Runs the verifier role: serves the configured variant until shutdown.
///
/// Prints nothing on success; startup failures surface as errors for the
/// binary to report.
pub async fn run_verifier(variant: Variant, config: &EngineConfig) -> Result<()> {
    if variant.is_local() {
        return Err(Error::InvalidParams(format!(
            "variant '{variant}' runs locally and has no verifier role"
        )));
    }

    let addr = config.listen_addr()?;
    let store = SessionStore::with_ttl(config.session_ttl());
    let service = SigmaServiceImpl::new(variant, store.clone());

    let sweeper_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper_store.cleanup_expired().await;
        }
    });

    info!(%variant, %addr, "verifier listening");

    Server::builder()
        .add_service(SigmaServiceServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal())
        .await
        .map_err(|error| Error::Transport(error.to_string()))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, aborting in-flight sessions");
        },
        _ = terminate => {
            info!("received terminate signal, aborting in-flight sessions");
        },
    }
}

/// Runs the prover role for a network variant and reports the verdict.
pub async fn run_prover(variant: Variant, config: &EngineConfig) -> Result<bool> {
    if variant.is_local() {
        return Err(Error::InvalidParams(format!(
            "variant '{variant}' runs locally and has no prover role"
        )));
    }

    let mut rng = SecureRng::new();
    let mut client = SessionClient::connect(config.endpoint(), config.move_timeout()).await?;

    let accepted = match variant {
        Variant::Schnorr => {
            prove_schnorr(&mut client, variant, SchnorrGroup::rfc5114(), &mut rng).await?
        }
        Variant::SchnorrEc => {
            prove_schnorr(&mut client, variant, Ristretto255::new(), &mut rng).await?
        }
        Variant::SchnorrZkp | Variant::SchnorrZkpok => {
            prove_schnorr_transcript(&mut client, variant, SchnorrGroup::rfc5114(), &mut rng)
                .await?
        }
        Variant::SchnorrEcZkp | Variant::SchnorrEcZkpok => {
            prove_schnorr_transcript(&mut client, variant, Ristretto255::new(), &mut rng).await?
        }
        Variant::Pedersen => {
            prove_pedersen(&mut client, variant, SchnorrGroup::rfc5114(), &mut rng).await?
        }
        Variant::PedersenEc => {
            prove_pedersen(&mut client, variant, Ristretto255::new(), &mut rng).await?
        }
        Variant::CsPaillier => prove_cspaillier(&mut client, &mut rng).await?,
        local => {
            return Err(Error::InvalidParams(format!(
                "variant '{local}' has no network prover"
            )))
        }
    };

    match variant {
        Variant::Pedersen | Variant::PedersenEc => {
            if accepted {
                eprintln!("decommitting succeeded");
                println!("ok");
            } else {
                eprintln!("decommitting failed");
            }
        }
        _ => {
            if accepted {
                eprintln!("knowledge proved");
            } else {
                eprintln!("knowledge NOT proved");
            }
        }
    }

    Ok(accepted)
}

/// Runs a variant whose both roles live in one process.
pub fn run_local(variant: Variant) -> Result<bool> {
    let mut rng = SecureRng::new();

    match variant {
        Variant::DlogEquality => run_dlog_equality(&mut rng),
        Variant::DlogEqualityBlindedTranscript => run_dlog_equality_blinded(&mut rng),
        Variant::Pseudonymsys => run_pseudonymsys(&mut rng),
        Variant::SplitSecret => run_split_secret(&mut rng),
        other => Err(Error::InvalidParams(format!(
            "variant '{other}' needs separate prover and verifier processes"
        ))),
    }
}

/// Drives one interactive proof over an open transport session.
async fn prove_interactive<R: SigmaRelation>(
    client: &mut SessionClient,
    variant: Variant,
    relation: R,
    statement: R::Statement,
    witness: R::Witness,
    rng: &mut SecureRng,
) -> Result<bool> {
    let encoded_statement = relation.encode_statement(&statement);
    let mut prover = SigmaProver::new(relation, statement, witness);

    let session = client.open(variant, encoded_statement).await?;

    let commitment = prover.commit(rng)?;
    let encoded_commitment = prover.relation().encode_commitment(&commitment);
    let challenge_bytes = match client
        .commit(&session.session_id, variant, encoded_commitment)
        .await
    {
        Ok(bytes) => bytes,
        Err(error) => {
            prover.abort();
            return Err(error);
        }
    };

    let challenge = prover
        .relation()
        .algebra()
        .scalar_from_bytes(&challenge_bytes)?;
    let response = prover.respond(&challenge)?;
    let encoded_response = prover.relation().encode_response(&response);

    match client
        .respond(&session.session_id, variant, encoded_response)
        .await
    {
        Ok((accepted, _message)) => Ok(accepted),
        Err(error) => {
            prover.abort();
            Err(error)
        }
    }
}

async fn prove_schnorr<A: GroupAlgebra>(
    client: &mut SessionClient,
    variant: Variant,
    algebra: A,
    rng: &mut SecureRng,
) -> Result<bool> {
    let relation = SchnorrRelation::new(algebra);
    let witness = SchnorrWitness::random(relation.algebra(), rng);
    let statement = relation.statement_for(&witness);
    prove_interactive(client, variant, relation, statement, witness, rng).await
}

async fn prove_schnorr_transcript<A: GroupAlgebra>(
    client: &mut SessionClient,
    variant: Variant,
    algebra: A,
    rng: &mut SecureRng,
) -> Result<bool> {
    let relation = SchnorrRelation::new(algebra);
    let witness = SchnorrWitness::random(relation.algebra(), rng);
    let statement = relation.statement_for(&witness);

    let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
    let proof = prover.prove(variant.mode(), rng)?;

    let (accepted, _message) = client
        .prove(
            variant,
            relation.encode_statement(&statement),
            relation.encode_commitment(proof.commitment()),
            relation.algebra().scalar_to_bytes(proof.challenge()),
            relation.encode_response(proof.response()),
        )
        .await?;

    Ok(accepted)
}

async fn prove_pedersen<A: GroupAlgebra>(
    client: &mut SessionClient,
    variant: Variant,
    algebra: A,
    rng: &mut SecureRng,
) -> Result<bool> {
    let session = client.open(variant, Vec::new()).await?;
    if session.parameters.len() != 1 {
        return Err(Error::ProtocolViolation(
            "receiver sent no commitment base".to_string(),
        ));
    }
    let base = algebra.element_from_bytes(&session.parameters[0])?;

    let message = algebra.sample(rng);
    let (committer, commitment) = PedersenCommitter::commit(algebra.clone(), &base, message, rng);

    client
        .commit(
            &session.session_id,
            variant,
            vec![algebra.element_to_bytes(&commitment)],
        )
        .await?;

    let (message, randomness) = committer.open();
    let opening = vec![
        algebra.scalar_to_bytes(message),
        algebra.scalar_to_bytes(randomness),
    ];
    let (accepted, _message) = client.reveal(&session.session_id, variant, opening).await?;
    Ok(accepted)
}

async fn prove_cspaillier(client: &mut SessionClient, rng: &mut SecureRng) -> Result<bool> {
    let keypair = PaillierKeypair::generate(rng);
    let relation = CiphertextRelation::new(keypair.public().clone());
    let message = relation.algebra().sample(rng);
    let (statement, witness) = relation.encrypt_statement(message, rng);
    prove_interactive(client, Variant::CsPaillier, relation, statement, witness, rng).await
}

fn run_dlog_equality(rng: &mut SecureRng) -> Result<bool> {
    let group = SchnorrGroup::rfc5114();
    let relation = DlogEqualityRelation::new(group.clone());
    let witness = DlogEqualityWitness::new(group.sample(rng));
    let g1 = group.power(&group.generator(), &group.sample(rng));
    let g2 = group.power(&group.generator(), &group.sample(rng));
    let statement = relation.statement_for(g1, g2, &witness);

    let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
    let mut verifier = SigmaVerifier::new(relation, statement);

    let commitment = prover.commit(rng)?;
    let challenge = verifier.receive_commitment(commitment, rng)?;
    let response = prover.respond(&challenge)?;
    let proved = verifier.verify(&response)?;

    eprintln!("proved: {proved}");
    Ok(proved)
}

fn run_dlog_equality_blinded(rng: &mut SecureRng) -> Result<bool> {
    let group = SchnorrGroup::rfc5114();
    let relation = DlogEqualityRelation::new(group.clone());
    let witness = DlogEqualityWitness::new(group.sample(rng));
    let g1 = group.power(&group.generator(), &group.sample(rng));
    let g2 = group.power(&group.generator(), &group.sample(rng));
    let statement = relation.statement_for(g1, g2, &witness);

    let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
    let mut verifier = BlindedTranscriptVerifier::new(relation, statement.clone());

    let commitment = prover.commit(rng)?;
    let challenge = verifier.receive_commitment(commitment, rng)?;
    let response = prover.respond(&challenge)?;
    let outcome = verifier.verify(&response)?;

    eprintln!("proved: {}", outcome.accepted);
    eprintln!("is the transcript valid?");
    let valid = verify_blinded_transcript(
        &group,
        &outcome.transcript,
        statement.g1(),
        statement.t1(),
        &outcome.pair,
    );
    eprintln!("transcript valid: {valid}");

    Ok(outcome.accepted && valid)
}

fn run_pseudonymsys(rng: &mut SecureRng) -> Result<bool> {
    let group = SchnorrGroup::rfc5114();
    let key = MasterKey::generate(&group, rng);
    let pseudonym = key.new_pseudonym(&group, rng);

    let relation = DlogEqualityRelation::new(group);
    let statement = key.registration_statement(relation.algebra(), &pseudonym);
    let witness = key.registration_witness();

    let mut prover = SigmaProver::new(relation.clone(), statement.clone(), witness);
    let mut verifier = SigmaVerifier::new(relation, statement);

    let commitment = prover.commit(rng)?;
    let challenge = verifier.receive_commitment(commitment, rng)?;
    let response = prover.respond(&challenge)?;
    let proved = verifier.verify(&response)?;

    eprintln!("proved: {proved}");
    Ok(proved)
}

fn run_split_secret(rng: &mut SecureRng) -> Result<bool> {
    let algebra = SchnorrGroup::rfc5114();
    let secret = secret_to_scalar(&algebra, DEMO_SECRET)?;

    let shares = shamir::split(&algebra, &secret, 5, 3, rng)?;
    let recovered = shamir::reconstruct(&algebra, &shares[..3], 3)?;
    let text = scalar_to_secret(&algebra, &recovered)?;

    eprintln!("reconstructed secret: {text}");
    Ok(text == DEMO_SECRET)
}

fn secret_to_scalar(algebra: &SchnorrGroup, secret: &str) -> Result<crate::groups::schnorr_group::Scalar> {
    let bytes = secret.as_bytes();
    if bytes.is_empty() || bytes.len() > 31 {
        return Err(Error::InvalidParams(
            "secret must be 1..=31 bytes to embed in the scalar field".to_string(),
        ));
    }

    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(bytes);
    algebra.scalar_from_bytes(&padded)
}

fn scalar_to_secret(
    algebra: &SchnorrGroup,
    scalar: &crate::groups::schnorr_group::Scalar,
) -> Result<String> {
    let bytes = algebra.scalar_to_bytes(scalar);
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    String::from_utf8(bytes[start..].to_vec())
        .map_err(|_| Error::InvalidParams("reconstructed secret is not valid UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_flows_accept() {
        assert!(run_local(Variant::DlogEquality).unwrap());
        assert!(run_local(Variant::DlogEqualityBlindedTranscript).unwrap());
        assert!(run_local(Variant::Pseudonymsys).unwrap());
        assert!(run_local(Variant::SplitSecret).unwrap());
    }

    #[test]
    fn network_variants_have_no_local_flow() {
        assert!(run_local(Variant::Schnorr).is_err());
    }

    #[test]
    fn secret_embedding_round_trips() {
        let algebra = SchnorrGroup::rfc5114();
        let scalar = secret_to_scalar(&algebra, "password").unwrap();
        assert_eq!(scalar_to_secret(&algebra, &scalar).unwrap(), "password");
    }

    #[test]
    fn oversized_secret_is_rejected() {
        let algebra = SchnorrGroup::rfc5114();
        let too_long = "x".repeat(32);
        assert!(secret_to_scalar(&algebra, &too_long).is_err());
    }
}
