//! Create the schema on the configured store and exit.

use tracing::info;

use keepsake_db::{StoreConfig, open_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keepsake=info".into()),
        )
        .init();

    let config = StoreConfig::from_env()?;
    info!(?config, "Initializing store");

    // open_store runs the idempotent schema setup.
    let store = open_store(&config).await?;
    info!(backend = %store.backend(), "Schema ready");

    Ok(())
}
