use std::sync::Arc;

use riderly_dashboard::api;
use riderly_dashboard::auth::MemoryAuth;
use riderly_dashboard::config::{Config, LogFormat};
use riderly_dashboard::error::AppError;
use riderly_dashboard::state::AppState;
use riderly_dashboard::store::MemoryStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let store = match &config.seed_path {
        Some(path) => MemoryStore::from_seed_file(path, config.event_buffer_size).await?,
        None => MemoryStore::new(config.event_buffer_size),
    };

    let state = AppState::new(Arc::new(store), Arc::new(MemoryAuth::new()), &config);
    let app = api::rest::router(Arc::new(state));

    let bind_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(
        http_port = config.http_port,
        require_admin = config.require_admin,
        "http server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);

    match config.log_format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
