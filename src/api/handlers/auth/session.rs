//! Session extraction and logout.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::error;

use super::cookie::{self, AUTH_COOKIE_NAME};
use super::error::AuthError;
use super::state::AuthState;
use super::token::SessionClaims;
use super::types::OkResponse;

/// Resolve the auth cookie into verified claims, if any.
///
/// Missing cookies and failed verification are both "no session"; callers
/// cannot distinguish the two, and neither can clients.
pub(crate) fn authenticate(headers: &HeaderMap, state: &AuthState) -> Option<SessionClaims> {
    let token = cookie::cookie_value(headers, AUTH_COOKIE_NAME)?;
    state.codec().verify(&token)
}

/// Resolve the auth cookie or fail with [`AuthError::Unauthenticated`].
pub(crate) fn require_user(
    headers: &HeaderMap,
    state: &AuthState,
) -> Result<SessionClaims, AuthError> {
    authenticate(headers, state).ok_or(AuthError::Unauthenticated)
}

/// Clear the auth cookie. Idempotent: logging out without a session is not
/// an error.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cleared", body = OkResponse)
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let mut response_headers = HeaderMap::new();
    match cookie::clear_auth_cookie(auth_state.config()) {
        Ok(directive) => {
            response_headers.insert(SET_COOKIE, directive);
        }
        Err(err) => error!("Failed to build clear-cookie directive: {err}"),
    }

    (StatusCode::OK, response_headers, Json(OkResponse::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::email::LogOtpSender;
    use crate::api::handlers::auth::otp::InMemoryOtpStore;
    use crate::api::handlers::auth::state::AuthConfig;
    use crate::api::handlers::auth::token::Role;
    use axum::http::header::COOKIE;
    use axum::http::HeaderValue;
    use secrecy::SecretString;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("tikezone.com".to_string(), false);
        Arc::new(AuthState::new(
            config,
            &SecretString::from("test-secret".to_string()),
            Arc::new(InMemoryOtpStore::new(600)),
            Arc::new(LogOtpSender),
        ))
    }

    #[test]
    fn authenticate_requires_cookie_and_signature() {
        let state = auth_state();
        let mut headers = HeaderMap::new();
        assert!(authenticate(&headers, &state).is_none());

        headers.insert(COOKIE, HeaderValue::from_static("auth_token=garbage"));
        assert!(authenticate(&headers, &state).is_none());

        let token = state.codec().sign("id-1", "a@b.com", Role::Customer).unwrap();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("auth_token={token}")).unwrap(),
        );
        let claims = authenticate(&headers, &state).unwrap();
        assert_eq!(claims.sub, "id-1");
        assert_eq!(claims.role, Role::Customer);
    }

    #[test]
    fn scan_cookie_does_not_authenticate_user_session() {
        let state = auth_state();
        let token = state.codec().sign("agent-1", "g@b.com", Role::Agent).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("scan_token={token}")).unwrap(),
        );
        assert!(authenticate(&headers, &state).is_none());
    }

    #[tokio::test]
    async fn logout_clears_cookie_and_acks() {
        let response = logout(Extension(auth_state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap();
        assert!(set_cookie.starts_with("auth_token=; "));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
