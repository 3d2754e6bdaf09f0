// Main entry point - Dependency injection, refresh loop and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::clock::SystemClock;
use crate::application::controller::DashboardController;
use crate::application::data_fetcher::DataFetcher;
use crate::application::scheduler::Scheduler;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_source::HttpDashboardSource;
use crate::infrastructure::memory_view::MemoryView;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    change_range, health_check, refresh, refresh_status, switch_site, view_element, view_snapshot,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let time_range = config.dashboard.time_range()?;

    // Upstream data source (infrastructure layer)
    let source = Arc::new(HttpDashboardSource::new(
        &config.api.base_url,
        config.api.request_timeout(),
    )?);

    // In-memory presentation surface, also the chart backend
    let view = Arc::new(MemoryView::new());

    // Controller and scheduler (application layer)
    let controller = Arc::new(DashboardController::new(
        DataFetcher::new(source, config.refresh.cycle_timeout()),
        view.clone(),
        view.clone(),
        Arc::new(SystemClock),
        config.dashboard.default_site.clone(),
        time_range,
        config.dashboard.site_list(),
    ));
    controller.load_sites().await;
    let scheduler = Scheduler::new(controller.clone(), config.refresh.interval()).start();

    let state = Arc::new(AppState {
        controller,
        triggers: scheduler.triggers(),
        view,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/view", get(view_snapshot))
        .route("/view/:element", get(view_element))
        .route("/status", get(refresh_status))
        .route("/refresh", post(refresh))
        .route("/sites/:id", post(switch_site))
        .route("/range/:token", post(change_range))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        "Starting factory-dashboard on {} (upstream {})",
        config.server.bind,
        config.api.base_url
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the timers and every live chart before exiting
    scheduler.stop().await;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
