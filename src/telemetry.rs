use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize tracing with an env-filtered fmt layer on stderr. Stdout is
/// left to the interactive form itself. RUST_LOG overrides `default_level`.
pub fn init_telemetry(default_level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    tracing::debug!("formflow telemetry initialized");
    Ok(())
}

/// Correlation id attached to every event a session emits.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
