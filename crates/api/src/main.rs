use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use domain::services::LoggingNotifier;
use gallery_api::{app, config::Config, jobs, middleware};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging).context("Failed to initialize logging")?;
    middleware::init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Gallery API v{}", env!("CARGO_PKG_VERSION"));

    let db_config: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&db_config).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let mut scheduler = jobs::JobScheduler::new();
    scheduler.register(jobs::NotificationDispatchJob::new(
        pool.clone(),
        Arc::new(LoggingNotifier::new()),
        config.queue.notification_interval_secs,
        config.queue.notification_batch_size,
    ));
    scheduler.start();

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(Duration::from_secs(10)).await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
