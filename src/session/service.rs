use rand_core::RngCore;
use tonic::{Request, Response, Status};
use tracing::debug;

use crate::crypto::{GroupAlgebra, SecureRng};
use crate::groups::{Ristretto255, SchnorrGroup};
use crate::proto::sigma_service_server::SigmaService;
use crate::proto::{
    ChallengeReply, MoveRequest, OpenReply, OpenRequest, ProveRequest, VerdictReply,
};
use crate::protocol::{ProofMode, SigmaProof, SigmaRelation, SigmaVerifier};
use crate::session::state::{SessionData, SessionStore, VerifierSession};
use crate::variants::schnorr::SchnorrRelation;
use crate::variants::Variant;
use crate::Error;

/// Hard cap on the number of byte strings in one move.
const MAX_PARTS: usize = 8;

/// Hard cap on one byte string.
const MAX_PART_BYTES: usize = 4096;

/// gRPC verifier service: one configured variant, one session store.
///
/// Every request's variant tag must match the configured variant; anything
/// else is rejected before it reaches a session.
pub struct SigmaServiceImpl {
    variant: Variant,
    store: SessionStore,
}

impl SigmaServiceImpl {
    pub fn new(variant: Variant, store: SessionStore) -> Self {
        Self { variant, store }
    }

    #[allow(clippy::result_large_err)]
    fn check_variant(&self, tag: &str) -> Result<(), Status> {
        let requested: Variant = tag
            .parse()
            .map_err(|error: Error| Status::invalid_argument(error.to_string()))?;

        if requested != self.variant {
            return Err(Status::failed_precondition(format!(
                "verifier is configured for '{}', received '{requested}'",
                self.variant
            )));
        }

        Ok(())
    }

    #[allow(clippy::result_large_err)]
    fn check_payload(data: &[Vec<u8>]) -> Result<(), Status> {
        if data.len() > MAX_PARTS {
            return Err(Status::invalid_argument(format!(
                "move carries {} parts, limit is {MAX_PARTS}",
                data.len()
            )));
        }

        for part in data {
            if part.is_empty() || part.len() > MAX_PART_BYTES {
                return Err(Status::invalid_argument(format!(
                    "move part of {} bytes outside (0, {MAX_PART_BYTES}]",
                    part.len()
                )));
            }
        }

        Ok(())
    }
}

fn into_status(error: Error) -> Status {
    match &error {
        Error::ProtocolViolation(_) => Status::failed_precondition(error.to_string()),
        Error::UnknownVariant(_)
        | Error::InvalidParams(_)
        | Error::InvalidScalar(_)
        | Error::InvalidGroupElement(_) => Status::invalid_argument(error.to_string()),
        _ => Status::internal(error.to_string()),
    }
}

fn verdict(accepted: bool) -> VerdictReply {
    VerdictReply {
        accepted,
        message: if accepted {
            "proof accepted".to_string()
        } else {
            "proof rejected".to_string()
        },
    }
}

#[tonic::async_trait]
impl SigmaService for SigmaServiceImpl {
    async fn open(&self, request: Request<OpenRequest>) -> Result<Response<OpenReply>, Status> {
        let req = request.into_inner();

        self.check_variant(&req.variant)?;
        Self::check_payload(&req.statement)?;

        let mut rng = SecureRng::new();
        let (machine, parameters) = VerifierSession::build(self.variant, &req.statement, &mut rng)
            .map_err(into_status)?;

        let mut id_bytes = [0u8; 16];
        rng.fill_bytes(&mut id_bytes);
        let session_id = hex::encode(id_bytes);

        self.store
            .create(session_id.clone(), SessionData::new(self.variant, machine))
            .await
            .map_err(into_status)?;

        debug!(variant = %self.variant, session = %session_id, "session opened");

        Ok(Response::new(OpenReply {
            session_id,
            parameters,
        }))
    }

    async fn commit(
        &self,
        request: Request<MoveRequest>,
    ) -> Result<Response<ChallengeReply>, Status> {
        let req = request.into_inner();

        self.check_variant(&req.variant)?;
        Self::check_payload(&req.data)?;

        let mut rng = SecureRng::new();
        let challenge = self
            .store
            .commit_move(&req.session_id, self.variant, &req.data, &mut rng)
            .await
            .map_err(into_status)?;

        Ok(Response::new(ChallengeReply { challenge }))
    }

    async fn respond(
        &self,
        request: Request<MoveRequest>,
    ) -> Result<Response<VerdictReply>, Status> {
        let req = request.into_inner();

        self.check_variant(&req.variant)?;
        Self::check_payload(&req.data)?;

        let accepted = self
            .store
            .respond_move(&req.session_id, self.variant, &req.data)
            .await
            .map_err(into_status)?;

        debug!(variant = %self.variant, session = %req.session_id, accepted, "session closed");

        Ok(Response::new(verdict(accepted)))
    }

    async fn reveal(
        &self,
        request: Request<MoveRequest>,
    ) -> Result<Response<VerdictReply>, Status> {
        let req = request.into_inner();

        self.check_variant(&req.variant)?;
        Self::check_payload(&req.data)?;

        let accepted = self
            .store
            .reveal_move(&req.session_id, self.variant, &req.data)
            .await
            .map_err(into_status)?;

        debug!(variant = %self.variant, session = %req.session_id, accepted, "commitment opened");

        Ok(Response::new(verdict(accepted)))
    }

    async fn prove(
        &self,
        request: Request<ProveRequest>,
    ) -> Result<Response<VerdictReply>, Status> {
        let req = request.into_inner();

        self.check_variant(&req.variant)?;
        Self::check_payload(&req.statement)?;
        Self::check_payload(&req.commitment)?;
        Self::check_payload(&req.response)?;
        if req.challenge.is_empty() || req.challenge.len() > MAX_PART_BYTES {
            return Err(Status::invalid_argument("challenge size out of bounds"));
        }

        let accepted = check_transcript(self.variant, &req).map_err(into_status)?;
        self.store.record_verdict(accepted);

        debug!(variant = %self.variant, accepted, "transcript checked");

        Ok(Response::new(verdict(accepted)))
    }
}

fn check_transcript(variant: Variant, request: &ProveRequest) -> crate::Result<bool> {
    match variant {
        Variant::SchnorrZkp | Variant::SchnorrZkpok => {
            let relation = SchnorrRelation::new(SchnorrGroup::rfc5114());
            transcript_verdict(&relation, variant.mode(), request)
        }
        Variant::SchnorrEcZkp | Variant::SchnorrEcZkpok => {
            let relation = SchnorrRelation::new(Ristretto255::new());
            transcript_verdict(&relation, variant.mode(), request)
        }
        _ => Err(Error::ProtocolViolation(format!(
            "variant '{variant}' is interactive; open a session instead"
        ))),
    }
}

fn transcript_verdict<R: SigmaRelation>(
    relation: &R,
    mode: ProofMode,
    request: &ProveRequest,
) -> crate::Result<bool> {
    let statement = relation.decode_statement(&request.statement)?;
    let commitment = relation.decode_commitment(&request.commitment)?;
    let challenge = relation.algebra().scalar_from_bytes(&request.challenge)?;
    let response = relation.decode_response(&request.response)?;
    let proof = SigmaProof::new(commitment, challenge, response);
    SigmaVerifier::verify_proof(relation, &statement, &proof, mode)
}
