//! Error taxonomy for the auth endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Client-visible authentication failures.
///
/// Token verification failures never reach this type: they collapse to a
/// "no session" result at the codec boundary and surface here only as the
/// uniform [`AuthError::Unauthenticated`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// OTP absent, expired, or mismatched, indistinguishable on purpose.
    #[error("invalid or expired code")]
    InvalidCode,

    /// Missing, invalid, or expired session token, or wrong role.
    #[error("authentication required")]
    Unauthenticated,

    /// Referenced identity no longer exists in the external store.
    #[error("account not found")]
    NotFound,

    /// Subdomain lookup transport failure; swallowed by the tenant
    /// resolver's fallback and never shown to end users.
    #[error("subdomain lookup unavailable")]
    UpstreamUnavailable,

    /// Unexpected store or codec failure. Detail is logged, never leaked.
    #[error("internal error")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct AuthErrorResponse {
    error: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AuthError::InvalidCode => (StatusCode::UNAUTHORIZED, "invalid_code"),
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AuthError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AuthError::UpstreamUnavailable => (StatusCode::BAD_GATEWAY, "upstream_unavailable"),
            AuthError::Internal(detail) => {
                tracing::error!("internal auth error: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        (status, Json(AuthErrorResponse { error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            AuthError::InvalidCode.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::UpstreamUnavailable.into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AuthError::Internal("boom".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let display = AuthError::Internal("connection refused".to_string()).to_string();
        assert_eq!(display, "internal error");
    }
}
