//! API handlers for the proof generation service

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hashlock_common::{codec, InputError};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    models::{
        CircuitStatus, GenerateProofRequest, GenerateProofResponse, ReadinessResponse,
        StatusResponse,
    },
    prover::{ProofError, Prover},
    readiness::{NotReadyError, ReadinessGate},
};

pub const SERVICE_NAME: &str = "proof-generation-service";

/// Body returned for internal faults; details stay in the logs.
const INTERNAL_ERROR_MESSAGE: &str = "Proof generation failed";

/// Shared application state
pub struct AppState {
    pub readiness: Arc<ReadinessGate<Prover>>,
}

impl AppState {
    pub fn new(readiness: Arc<ReadinessGate<Prover>>) -> Self {
        Self { readiness }
    }
}

/// API Error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub field: Option<&'static str>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            field: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.field {
            Some(field) => serde_json::json!({
                "error": self.message,
                "field": field,
            }),
            None => serde_json::json!({
                "error": self.message
            }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<NotReadyError> for ApiError {
    fn from(err: NotReadyError) -> Self {
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: err.to_string(),
            field: err.field().map(|f| f.wire_name()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<ProofError> for ApiError {
    fn from(err: ProofError) -> Self {
        match err {
            ProofError::AssertionFailed => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ProofError::Internal(detail) => {
                error!("Proof generation failed: {}", detail);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME
    }))
}

/// Readiness probe: 200 once the prover is initialized, 503 before.
pub async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ready = state.readiness.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadinessResponse { ready }))
}

/// Get service status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let circuit = state.readiness.get().ok().map(|prover| CircuitStatus {
        digest: prover.program().digest_hex(),
        key_strategy: prover.strategy(),
        constraints: prover.program().num_constraints(),
        public_inputs: prover.program().num_public_inputs(),
    });

    Json(StatusResponse {
        service: SERVICE_NAME,
        state: state.readiness.state(),
        circuit,
    })
}

/// Generate an unlock proof.
///
/// Readiness is checked before the body is looked at, and the body is fully
/// validated before any cryptographic work starts.
pub async fn generate_proof_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateProofRequest>, JsonRejection>,
) -> Result<Json<GenerateProofResponse>, ApiError> {
    let prover = state.readiness.get()?;

    let Json(request) = payload?;
    let inputs = request.into_inputs().inspect_err(|e| {
        info!("Rejected proof request: {}", e);
    })?;

    info!(
        "Generating proof for unlocker {} (locker {})",
        codec::encode_prefixed(inputs.unlocker),
        codec::encode_prefixed(inputs.locker)
    );

    let result = tokio::task::spawn_blocking(move || prover.generate_proof(&inputs))
        .await
        .map_err(|e| {
            error!("Proving task did not complete: {}", e);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        })?;

    match result {
        Ok(proof) => Ok(Json(GenerateProofResponse { proof })),
        Err(ProofError::AssertionFailed) => {
            warn!("Unlock predicate not satisfied");
            Err(ProofError::AssertionFailed.into())
        }
        Err(e) => Err(e.into()),
    }
}
