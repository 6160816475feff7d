//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "shorts_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "shorts_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "shorts_http_requests_in_flight";

    // Draft lifecycle metrics
    pub const DRAFTS_GENERATED_TOTAL: &str = "shorts_drafts_generated_total";
    pub const DRAFTS_SCHEDULED_TOTAL: &str = "shorts_drafts_scheduled_total";
    pub const SCHEDULE_FAILURES_TOTAL: &str = "shorts_schedule_failures_total";

    // Rate limiting metrics
    pub const RATE_LIMIT_HITS_TOTAL: &str = "shorts_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a generated draft, labeled by which path produced the script.
pub fn record_draft_generated(source: &str) {
    let labels = [("source", source.to_string())];
    counter!(names::DRAFTS_GENERATED_TOTAL, &labels).increment(1);
}

/// Record a successful schedule transition.
pub fn record_draft_scheduled() {
    counter!(names::DRAFTS_SCHEDULED_TOTAL).increment(1);
}

/// Record a failed schedule transition.
pub fn record_schedule_failure(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::SCHEDULE_FAILURES_TOTAL, &labels).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Sanitize path for metrics labels (draft ids are numeric strings).
fn sanitize_path(path: &str) -> String {
    let path = regex_lite::Regex::new(r"/videos/[0-9][0-9-]*")
        .unwrap()
        .replace_all(path, "/videos/:video_id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();
    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(
            sanitize_path("/api/videos/1714690000123/schedule"),
            "/api/videos/:video_id/schedule"
        );
        assert_eq!(sanitize_path("/api/videos"), "/api/videos");
    }
}
