use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{artists, dashboard, exhibitions, health, registrations};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Identity is checked per handler by the AuthenticatedUser extractor.
    let api_routes = Router::new()
        .route(
            "/registrations",
            post(registrations::submit_registration).get(registrations::list_registrations),
        )
        .route(
            "/registrations/queue-status",
            get(registrations::queue_status),
        )
        .route("/registrations/mine", get(registrations::my_registrations))
        .route("/registrations/:id", get(registrations::get_registration))
        .route(
            "/registrations/:id/approve",
            post(registrations::approve_registration),
        )
        .route(
            "/registrations/:id/reject",
            post(registrations::reject_registration),
        )
        .route(
            "/registrations/:id/cancel",
            post(registrations::cancel_registration),
        )
        .route("/exhibitions/:id", get(exhibitions::get_exhibition))
        .route(
            "/exhibitions/:id/register",
            post(registrations::register_for_exhibition),
        )
        .route("/artists/:id", get(artists::get_artist))
        .route("/dashboard/stats", get(dashboard::get_dashboard_stats));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        // Bottom layers run first
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
