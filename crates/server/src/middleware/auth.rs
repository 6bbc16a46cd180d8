//! Bearer token authentication middleware

use axum::{
    body::Body,
    extract::Request,
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::{Claims, TokenKeys};
use crate::error::AppError;

/// Username of the authenticated caller, attached to the response for audit logging
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// Reject requests without a valid bearer token.
///
/// On success the verified [`Claims`] are inserted into the request
/// extensions for handlers to extract.
pub async fn auth_middleware(mut request: Request<Body>, next: Next) -> Response {
    let Some(keys) = request.extensions().get::<TokenKeys>().cloned() else {
        return AppError::Internal("Token keys not configured".to_string()).into_response();
    };

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let claims: Claims = match keys.verify_header(header) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = ?err, path = %request.uri().path(), "Rejected bearer token");
            return AppError::from(err).into_response();
        }
    };

    let username = claims.username.clone();
    request.extensions_mut().insert(claims);

    let mut response = next.run(request).await;
    response
        .extensions_mut()
        .insert(AuthenticatedUser(username));
    response
}
