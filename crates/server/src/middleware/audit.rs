//! Audit logging middleware for mutations

use axum::{body::Body, extract::Request, http::Method, middleware::Next, response::Response};

use super::auth::AuthenticatedUser;
use super::request_id::RequestId;

/// Log every POST, PUT and DELETE with its outcome and the caller, if known
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let response = next.run(request).await;

    if matches!(method, Method::POST | Method::PUT | Method::DELETE) {
        let status = response.status().as_u16();
        let username = response
            .extensions()
            .get::<AuthenticatedUser>()
            .map(|u| u.0.as_str())
            .unwrap_or("-");

        tracing::info!(
            target: "audit",
            request_id = %request_id,
            method = %method,
            path = %uri,
            status = %status,
            username = %username,
            "Mutation request"
        );
    }

    response
}
