/// Quorum resolver service
///
/// Serves DID resolution over HTTP, checking every queried endpoint agrees.

use quorum_resolver::{config::AppConfig, server, AppContext};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quorum_resolver=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!(level = %config.logging.level, "Configuration loaded");

    let ctx = AppContext::new(config)?;

    server::serve(ctx).await?;

    Ok(())
}
