//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::auth::{auth_callback, auth_url, disconnect, get_status, set_credentials};
use crate::handlers::channel::get_channel;
use crate::handlers::scripts::generate_script;
use crate::handlers::videos::{delete_video, list_videos, schedule_video};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, create_rate_limiter, rate_limit_middleware, request_id, request_logging,
    security_headers,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/status", get(get_status))
        .route("/credentials", post(set_credentials))
        .route("/auth/url", get(auth_url))
        .route("/auth/callback", get(auth_callback))
        .route("/auth/disconnect", post(disconnect));

    let channel_routes = Router::new().route("/channel", get(get_channel));

    let script_routes = Router::new().route("/scripts/generate", post(generate_script));

    let video_routes = Router::new()
        .route("/videos", get(list_videos))
        .route("/videos/:video_id", delete(delete_video))
        .route("/videos/:video_id/schedule", post(schedule_video));

    let rate_limiter = create_rate_limiter(state.config.rate_limit_rps);

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(channel_routes)
        .merge(script_routes)
        .merge(video_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
