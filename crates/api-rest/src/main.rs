//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development when you only want the REST server (with OpenAPI/Swagger UI). The
//! workspace's main `telecare-run` binary also probes the FHIR server before serving.

use std::sync::Arc;
use telecare_core::constants::DEFAULT_REST_ADDR;
use telecare_core::{CoreConfig, Practice};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the telecare REST API server
///
/// # Environment Variables
/// - `MEDPLUM_BASE_URL`: FHIR base URL (required)
/// - `MEDPLUM_ACCESS_TOKEN`: bearer token (optional)
/// - `TELECARE_REST_ADDR`: server address (default: "0.0.0.0:3000")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("telecare_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("TELECARE_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = CoreConfig::from_env()?;
    let practice = Arc::new(Practice::new(&cfg)?);

    tracing::info!("-- Starting telecare REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api_rest::router(practice)).await?;

    Ok(())
}
