use tokio::signal;
use tracing::info;

use todo_api::config::ServerConfig;
use todo_api::todos::{TodoService, TodoState, todo_routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env()?;

    eprintln!("📝 Todo API v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Store: {:?}", config.store);
    if config.store == todo_api::config::StoreKind::Sqlite {
        eprintln!("   Database: {}", config.db_path.display());
    }
    eprintln!("   REST: http://0.0.0.0:{}/todos", config.port);

    // ── Store ────────────────────────────────────────────────────────────
    let store = todo_api::open_store(&config).await?;

    // ── HTTP ─────────────────────────────────────────────────────────────
    let state =
        TodoState::new(TodoService::new(store)).with_request_timeout(config.request_timeout);
    let app = todo_routes(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!(port = config.port, "Todo API server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
