//! Prometheus metrics collection middleware
//!
//! Records `http_requests_total` (counter) and `http_request_duration_seconds`
//! (histogram) for every request, with method/path/status labels.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Collapse per-record path segments so labels stay low-cardinality.
/// Numeric ids become `:id` and stored upload names become `:file`.
fn normalize_path(path: &str) -> String {
    if path.starts_with("/uploads/") {
        return "/uploads/:file".to_string();
    }

    path.split('/')
        .map(|seg| {
            if !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()) {
                ":id"
            } else {
                seg
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware that records request count and duration metrics.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();

    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(duration);

    response
}

#[cfg(test)]
mod tests {
    use super::normalize_path;

    #[test]
    fn numeric_segments_are_collapsed() {
        assert_eq!(
            normalize_path("/doctor-question/42/messages"),
            "/doctor-question/:id/messages"
        );
        assert_eq!(normalize_path("/appointments/7"), "/appointments/:id");
        assert_eq!(normalize_path("/history"), "/history");
    }

    #[test]
    fn upload_names_are_collapsed() {
        assert_eq!(normalize_path("/uploads/ab12_avatar.png"), "/uploads/:file");
    }
}
