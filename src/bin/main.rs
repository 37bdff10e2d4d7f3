#![warn(clippy::all)]

mod api;
mod config;
mod database;
mod media;

use std::sync::Arc;

use anyhow::Context;
use tokio::{
    net::TcpListener,
    signal::{self, ctrl_c},
};
use tracing::{error, info, trace_span};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry};

use crate::{
    api::state::AppState,
    config::Config,
    database::{connection::establish_pooled_connection, pg_store::PgStore, store::Store},
    media::MediaStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().with_span_events(FmtSpan::CLOSE);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default().with(filter).with(stdout_log);

    tracing::subscriber::set_global_default(subscriber).context("Unable to set global subscriber")?;

    let (state, port) = {
        let span = trace_span!("starting main");
        let _guard = span.enter();

        let config = Config::load()?;
        info!("Connecting to database with {} pooled connections", config.pool_size);
        let pool = establish_pooled_connection(&config.database_url, config.pool_size)
            .context("Unable to create database pool")?;

        let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
        let media = MediaStore::new(config.media_root, config.media_url);
        (AppState::new(store, media, config.page_size), config.port)
    };

    let app = api::router(state);

    let address = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Unable to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
