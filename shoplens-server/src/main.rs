//! ShopLens Server - REST API for visual product search
//!
//! - POST /upload-image - Find products that look like an uploaded photo
//! - GET  /products     - List the catalog
//! - GET  /health       - Health check

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use shoplens_core::{LocalImageStore, ProcessEngine, SearchPipeline};
use shoplens_server::{connect_catalog, create_router, AppState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Config::from_env()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = connect_catalog(&config).await?;

    let intake = LocalImageStore::new(&config.upload_dir, config.uploads_base_url()?)?;
    let engine_config = config.engine_config();
    tracing::info!(
        program = %engine_config.program.display(),
        args = ?engine_config.args,
        timeout_secs = engine_config.timeout.as_secs(),
        "Similarity engine configured"
    );
    let engine = Arc::new(ProcessEngine::new(engine_config));

    let pipeline =
        SearchPipeline::new(intake, engine, catalog).with_style_policy(config.style_policy());
    let state = AppState::new(pipeline, config.max_file_size());

    let app = create_router(&config, state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "ShopLens server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}
