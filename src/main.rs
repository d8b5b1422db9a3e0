use std::sync::Arc;
use telecare_core::constants::DEFAULT_REST_ADDR;
use telecare_core::{CoreConfig, Practice};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the telecare application
///
/// Resolves configuration once, probes the FHIR server, then serves the REST API.
/// An unreachable server is logged but does not stop startup: reads fall back to
/// fixtures under the default policy.
///
/// # Environment Variables
/// - `MEDPLUM_BASE_URL`: FHIR base URL (required)
/// - `MEDPLUM_ACCESS_TOKEN`: bearer token (optional)
/// - `TELECARE_FALLBACK_POLICY`: `fixtures` (default) or `strict`
/// - `TELECARE_CACHE_TTL_SECS`, `TELECARE_RETRIES`, `TELECARE_REQUEST_TIMEOUT_SECS`
/// - `TELECARE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("telecare_run=info".parse()?)
                .add_directive("telecare_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("TELECARE_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    let cfg = CoreConfig::from_env()?;
    let practice = Arc::new(Practice::new(&cfg)?);

    let health = practice.health().await;
    if health.reachable {
        tracing::info!(
            "++ FHIR server {} {} (FHIR {})",
            health.software.as_deref().unwrap_or("unknown"),
            health.version.as_deref().unwrap_or("?"),
            health.fhir_version.as_deref().unwrap_or("?"),
        );
    } else {
        tracing::warn!(
            "FHIR server at {} is unreachable ({}); policy is {}",
            cfg.base_url(),
            health.message.as_deref().unwrap_or("no detail"),
            cfg.fallback_policy(),
        );
    }

    tracing::info!("++ Starting telecare REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::router(practice)).await?;

    Ok(())
}
