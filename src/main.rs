//! SchemaFlow Diagram API
//!
//! Serves one ER diagram view model over HTTP. Schema snapshots posted to
//! `/api/reverse-engineer` are merged into the diagram; the rest of the API
//! drives hover, selection, layering and export/import.

use schemaflow_diagram::config::Settings;
use schemaflow_diagram::routes::create_router;
use schemaflow_diagram::state::AppState;
use schemaflow_diagram::ReconciliationEngine;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    info!("🚀 Starting SchemaFlow Diagram...");

    // Load configuration
    let settings = Settings::load()?;
    info!(
        "📋 Configuration loaded (grid spacing {}x{}, origin {},{})",
        settings.layout.horizontal_spacing,
        settings.layout.vertical_spacing,
        settings.layout.start_x,
        settings.layout.start_y
    );

    let state = Arc::new(AppState::new(ReconciliationEngine::new(settings.layout)));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("📚 API Endpoints:");
    info!("   GET  /api/init              - Current view model");
    info!("   POST /api/reverse-engineer  - Merge a schema snapshot");
    info!("   POST /api/hover             - Hover an entity, edge or column");
    info!("   POST /api/select            - Select an item (null clears)");
    info!("   POST /api/highlight         - Resolve a highlight set");
    info!("   GET  /api/export            - Download the view model");
    info!("   POST /api/import            - Load an exported view model");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,schemaflow_diagram=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
