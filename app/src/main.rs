use std::error::Error;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info, warn};

use petfinder_app::bootstrap::background::{SessionRefresher, spawn_query_gc};
use petfinder_app::bootstrap::context::AppContext;
use petfinder_app::config_loader;
use petfinder_app::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    let config = config_loader::load_config()?;

    observability::tracing::setup_logging(&config)?;

    info!("Starting pet finder auth client");
    observability::startup_info::print_startup_info(&config);

    let context = AppContext::new(config)?;
    let subscription = context
        .auth_store
        .listen(Arc::clone(&context.task_spawn));

    if let Err(e) = context.auth_store.initialize().await {
        warn!(error = %e, "Could not restore the previous session");
    }
    match context.auth_store.snapshot().user {
        Some(user) => info!(user_id = %user.id, email = %user.email, "Session restored"),
        None => info!("No active session"),
    }

    let refresher = SessionRefresher::new(
        Arc::clone(&context.auth_service),
        &context.config.session,
    )
    .spawn();
    let query_gc = spawn_query_gc(Arc::clone(&context.query_client));

    shutdown_signal().await;

    refresher.abort();
    query_gc.abort();
    drop(subscription);

    info!("Shutdown completed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
            }
        }
    };

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down...");
        },
        () = terminate => {
            info!("Received terminate signal, shutting down...");
        },
    }
}
