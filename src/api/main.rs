use form_builder_api::config::ServerConfig;
use form_builder_api::middleware::{create_cors_layer, observability::init_tracing};
use form_builder_api::routes::app_state::start_session_cleanup_task;
use form_builder_api::routes::{AppState, create_app};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{error, info};

// Panic hook to catch and log panics
fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        match panic_info.location() {
            Some(location) => error!(
                "Panic at {}:{}:{}: {}",
                location.file(),
                location.line(),
                location.column(),
                message
            ),
            None => error!("Panic: {}", message),
        }
    }));
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    setup_panic_hook();
    info!("Application starting...");

    let config = ServerConfig::from_env()?;
    if config.is_development {
        info!("Running in development mode");
    }

    let app_state = AppState::from_config(&config).await?;
    tokio::spawn(start_session_cleanup_task(
        app_state.clone(),
        Duration::from_secs(config.cleanup_interval_secs),
    ));
    let app = create_app(app_state).layer(create_cors_layer(&config.cors_allowed_origins));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {}: {}", addr, e);
        e
    })?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM (Docker stop).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received, shutting down gracefully"),
        _ = terminate => info!("SIGTERM received, shutting down gracefully"),
    }
}
