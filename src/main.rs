use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use studiobook::config::AppConfig;
use studiobook::state::AppState;
use studiobook::store::DocStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let store = DocStore::open(&config.database_url)?;

    let state = Arc::new(AppState {
        store,
        config: config.clone(),
    });

    let app = studiobook::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
