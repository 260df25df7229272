//! Scavenger hunt tracker - Entry point.

use hunt_progress::{BackendHandle, ProgressStore};
use scan_admission::spawn_sweeper;
use scavenger_hunt::{
    api::{create_router, AdmissionState, AppState},
    config::Config,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting scavenger hunt tracker");

    // Open participant storage up front so a bad url fails at startup
    let backend = Arc::new(BackendHandle::new(config.storage.url.clone()));
    if let Err(e) = backend.get().await {
        error!("Failed to open participant storage: {}", e);
        std::process::exit(1);
    }

    let progress = Arc::new(ProgressStore::new(
        backend.clone(),
        config.hunt.catalog(),
        config.storage.timeout(),
    ));

    // Scan admission with background sweeping of idle clients
    let admission = AdmissionState::new(
        config.admission.policy(),
        config.server.trust_forwarded_for,
    );
    let sweeper = spawn_sweeper(admission.control.clone(), config.admission.sweep_interval());

    if !config.server.production {
        warn!("Running in non-production mode, registration cookie is not marked Secure");
    }

    let state = AppState::new(progress, config.server.production);
    let app = create_router(state, admission);

    // Bind to address
    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Listening on {}", addr);

    // Run server
    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    sweeper.abort();

    if let Err(e) = backend.shutdown().await {
        warn!("Failed to close participant storage: {}", e);
    }

    if let Err(e) = served {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
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
