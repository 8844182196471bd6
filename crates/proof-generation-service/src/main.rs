//! Proof Generation Service
//!
//! REST API for generating hash-lock unlock proofs

use anyhow::{Context, Result};
use proof_generation_service::{create_router, AppState, Config, Prover, ReadinessGate};
use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "proof_generation_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let strategy = config.key_strategy()?;

    info!("Starting Proof Generation Service");
    info!("Key strategy: {}", strategy.name());

    let readiness = Arc::new(ReadinessGate::<Prover>::new());
    let app = create_router(AppState::new(readiness.clone()));

    // Bind and serve
    let addr = config.api_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;

    info!("Proof Generation Service listening on http://{}", addr);

    // Requests are answered with 503 until compilation and key setup finish.
    let initialization = async move {
        let prover = tokio::task::spawn_blocking(move || Prover::initialize(&strategy))
            .await
            .context("Initialization task panicked")?
            .context("Prover initialization failed")?;

        readiness
            .mark_ready(Arc::new(prover))
            .context("Prover initialized twice")?;
        info!("Prover ready");

        Ok::<_, anyhow::Error>(())
    };

    let server = axum::serve(listener, app).into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.context("Server error")?;
            return Ok(());
        }
        result = initialization => {
            if let Err(e) = result {
                error!("{:#}", e);
                return Err(e);
            }
        }
    }

    server.await.context("Server error")?;

    Ok(())
}
