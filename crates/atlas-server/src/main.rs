use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use atlas_client::{ClientConfig, RemoteClient, RemoteCountryDirectory};
use atlas_core::InMemoryStore;
use atlas_db::{Database, DatabaseConfig};
use atlas_server::auth::JwtVerifier;
use atlas_server::config::ServerConfig;
use atlas_server::state::{AppState, CountryLookup, Storage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("atlas=info".parse()?))
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;
    let addr = format!("0.0.0.0:{}", config.port);

    let storage = match DatabaseConfig::from_env_optional()? {
        Some(db_config) => {
            let db = Database::connect(&db_config).await?;
            db.migrate().await?;
            Storage::Postgres(db)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, keeping data in memory");
            Storage::Memory(InMemoryStore::new())
        }
    };

    let lookup = match ClientConfig::from_env()? {
        Some(client_config) => CountryLookup::Remote(RemoteCountryDirectory::new(
            RemoteClient::new(&client_config)?,
        )),
        None => CountryLookup::local(&storage),
    };

    let verifier = JwtVerifier::new(&config.jwt)?;
    let state = Arc::new(AppState::new(storage, lookup, verifier, &config.admin_role));
    let app = atlas_server::app(state, &config.cors)?;

    tracing::info!("Starting server on {addr}");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
