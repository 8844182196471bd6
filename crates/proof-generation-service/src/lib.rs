//! Proof Generation Service
//!
//! Proves knowledge of a hash-lock password with Groth16 over BN254, and that
//! the prover is not the address that set the lock. Proofs are returned in
//! the tuple layout consumed by the on-chain verifier.

pub mod config;
pub mod encoding;
pub mod handlers;
pub mod keys;
pub mod models;
pub mod prover;
pub mod readiness;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use encoding::{SolidityProof, VerificationKeyDocument};
pub use handlers::AppState;
pub use keys::{KeyPair, KeyStrategy, SetupError};
pub use models::{GenerateProofRequest, GenerateProofResponse};
pub use prover::{ProofError, Prover, StartupError};
pub use readiness::{ReadinessGate, ReadinessState};

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/ready", get(handlers::ready_handler))
        .route("/api/status", get(handlers::status_handler))
        .route("/generate-proof", post(handlers::generate_proof_handler))
        .with_state(shared_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
