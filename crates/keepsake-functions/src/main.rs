use std::net::SocketAddr;

use tracing::info;

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

    let host = std::env::var("KEEPSAKE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("KEEPSAKE_FUNCTIONS_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // One pool for the lifetime of the host; invocations share it.
    let store = open_store(&StoreConfig::from_env()?).await?;
    let app = keepsake_functions::host::app(store);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Keepsake functions host listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(keepsake_server::shutdown_signal())
        .await?;

    Ok(())
}
