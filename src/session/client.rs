use std::time::Duration;

use tonic::transport::Channel;
use tonic::{Code, Request, Status};

use crate::proto::sigma_service_client::SigmaServiceClient;
use crate::proto::{MoveRequest, OpenRequest, ProveRequest};
use crate::variants::Variant;
use crate::{Error, Result};

/// Prover-side transport for one session.
///
/// Every exchange is bounded by the move timeout; exceeding it aborts the
/// session as a timeout failure, distinct from a protocol violation. The
/// client never retries a move on its own — re-sending a sigma move under
/// fresh randomness is the caller's decision, re-sending under the same
/// randomness would break soundness.
pub struct SessionClient {
    inner: SigmaServiceClient<Channel>,
    timeout: Duration,
}

/// An opened session: its id plus any receiver-generated parameters.
pub struct OpenedSession {
    pub session_id: String,
    pub parameters: Vec<Vec<u8>>,
}

impl SessionClient {
    /// Connects to a verifier endpoint such as `http://127.0.0.1:50051`.
    pub async fn connect(endpoint: String, timeout: Duration) -> Result<Self> {
        let inner = tokio::time::timeout(timeout, SigmaServiceClient::connect(endpoint))
            .await
            .map_err(|_| Error::Timeout(timeout))?
            .map_err(|error| Error::Transport(error.to_string()))?;

        Ok(Self { inner, timeout })
    }

    /// Opens a session for an interactive variant.
    pub async fn open(
        &mut self,
        variant: Variant,
        statement: Vec<Vec<u8>>,
    ) -> Result<OpenedSession> {
        let request = Request::new(OpenRequest {
            variant: variant.name().to_string(),
            statement,
        });

        let reply = tokio::time::timeout(self.timeout, self.inner.open(request))
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(status_to_error)?
            .into_inner();

        Ok(OpenedSession {
            session_id: reply.session_id,
            parameters: reply.parameters,
        })
    }

    /// Sends the commitment move; returns the encoded challenge.
    pub async fn commit(
        &mut self,
        session_id: &str,
        variant: Variant,
        commitment: Vec<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let request = Request::new(MoveRequest {
            session_id: session_id.to_string(),
            variant: variant.name().to_string(),
            data: commitment,
        });

        let reply = tokio::time::timeout(self.timeout, self.inner.commit(request))
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(status_to_error)?
            .into_inner();

        Ok(reply.challenge)
    }

    /// Sends the response move; returns the verdict.
    pub async fn respond(
        &mut self,
        session_id: &str,
        variant: Variant,
        response: Vec<Vec<u8>>,
    ) -> Result<(bool, String)> {
        let request = Request::new(MoveRequest {
            session_id: session_id.to_string(),
            variant: variant.name().to_string(),
            data: response,
        });

        let reply = tokio::time::timeout(self.timeout, self.inner.respond(request))
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(status_to_error)?
            .into_inner();

        Ok((reply.accepted, reply.message))
    }

    /// Reveals a Pedersen opening; returns the verdict.
    pub async fn reveal(
        &mut self,
        session_id: &str,
        variant: Variant,
        opening: Vec<Vec<u8>>,
    ) -> Result<(bool, String)> {
        let request = Request::new(MoveRequest {
            session_id: session_id.to_string(),
            variant: variant.name().to_string(),
            data: opening,
        });

        let reply = tokio::time::timeout(self.timeout, self.inner.reveal(request))
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(status_to_error)?
            .into_inner();

        Ok((reply.accepted, reply.message))
    }

    /// Submits a self-contained transcript; returns the verdict.
    pub async fn prove(
        &mut self,
        variant: Variant,
        statement: Vec<Vec<u8>>,
        commitment: Vec<Vec<u8>>,
        challenge: Vec<u8>,
        response: Vec<Vec<u8>>,
    ) -> Result<(bool, String)> {
        let request = Request::new(ProveRequest {
            variant: variant.name().to_string(),
            statement,
            commitment,
            challenge,
            response,
        });

        let reply = tokio::time::timeout(self.timeout, self.inner.prove(request))
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(status_to_error)?
            .into_inner();

        Ok((reply.accepted, reply.message))
    }
}

fn status_to_error(status: Status) -> Error {
    match status.code() {
        Code::FailedPrecondition => Error::ProtocolViolation(status.message().to_string()),
        Code::InvalidArgument => Error::InvalidParams(status.message().to_string()),
        _ => Error::Transport(status.to_string()),
    }
}
