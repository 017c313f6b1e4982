use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use keepsake_api::Facade;
use keepsake_db::{StoreConfig, open_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keepsake=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("KEEPSAKE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("KEEPSAKE_PORT")
        .unwrap_or_else(|_| "5001".into())
        .parse()?;
    let store_config = StoreConfig::from_env()?;

    let store = open_store(&store_config).await?;
    let app = keepsake_server::router(Arc::new(Facade::new(store)));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Keepsake server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(keepsake_server::shutdown_signal())
        .await?;

    Ok(())
}
