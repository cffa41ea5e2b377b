//! Scan-agent endpoints: login, identity check, logout.
//!
//! Agents authenticate through the `scan_token` cookie slot, fully
//! independent of the `auth_token` namespace: a person can hold both a
//! customer session and an agent session at once.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::auth::cookie::{self, SCAN_COOKIE_NAME};
use super::auth::error::AuthError;
use super::auth::otp::OtpStore;
use super::auth::otp_login::check_code;
use super::auth::storage::{self, AgentRecord};
use super::auth::token::Role;
use super::auth::types::{AgentProfile, AgentResponse, OkResponse, ScanLoginRequest};
use super::auth::utils::normalize_email;
use super::auth::AuthState;

/// Liveness window: an agent is online if it reported activity within the
/// last two minutes.
const AGENT_LIVENESS_WINDOW_SECONDS: i64 = 120;

/// Pure presence derivation over the stored heartbeat timestamp.
fn is_online(last_active_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    last_active_at
        .is_some_and(|at| now - at <= Duration::seconds(AGENT_LIVENESS_WINDOW_SECONDS))
}

fn profile(agent: AgentRecord, now: DateTime<Utc>) -> AgentProfile {
    let online = is_online(agent.last_active_at, now);
    AgentProfile {
        id: agent.id.to_string(),
        name: agent.name,
        email: agent.email,
        status: agent.status,
        is_online: online,
    }
}

/// Every verification failure collapses to the same shape with 401; the
/// client cannot tell a missing cookie from a wrong role or a deleted row.
fn no_agent(status: StatusCode) -> Response {
    (status, Json(AgentResponse { agent: None })).into_response()
}

/// Authenticate a scan agent with a one-time code and set the scan cookie.
///
/// Agents are provisioned out of band; an email without an agent row fails
/// exactly like a bad code so the endpoint cannot enumerate agents.
#[utoipa::path(
    post,
    path = "/api/scan/login",
    request_body = ScanLoginRequest,
    responses(
        (status = 200, description = "Agent session issued", body = AgentResponse),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "Invalid code or unknown agent"),
        (status = 500, description = "Store failure")
    ),
    tag = "scan"
)]
pub async fn scan_login(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<ScanLoginRequest>>,
) -> impl IntoResponse {
    let request: ScanLoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if let Err(err) = check_code(&auth_state, &email, &request.code) {
        return err.into_response();
    }
    auth_state.otp().consume(&email);

    let agent = match storage::lookup_agent_by_email(&pool, &email).await {
        Ok(Some(agent)) => agent,
        Ok(None) => return AuthError::InvalidCode.into_response(),
        Err(err) => {
            error!("Failed to lookup agent for login: {err}");
            return AuthError::Internal(err.to_string()).into_response();
        }
    };

    let token = match auth_state
        .codec()
        .sign(&agent.id.to_string(), &agent.email, Role::Agent)
    {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };

    let mut response_headers = HeaderMap::new();
    match cookie::scan_cookie(auth_state.config(), &token) {
        Ok(directive) => {
            response_headers.insert(SET_COOKIE, directive);
        }
        Err(err) => {
            error!("Failed to build scan cookie: {err}");
            return AuthError::Internal(err.to_string()).into_response();
        }
    }

    let body = AgentResponse {
        agent: Some(profile(agent, Utc::now())),
    };
    (StatusCode::OK, response_headers, Json(body)).into_response()
}

/// Return the authenticated agent's profile with the derived liveness flag.
#[utoipa::path(
    get,
    path = "/api/scan/me",
    responses(
        (status = 200, description = "Agent profile", body = AgentResponse),
        (status = 401, description = "No valid agent session", body = AgentResponse),
        (status = 500, description = "Store failure", body = AgentResponse)
    ),
    tag = "scan"
)]
pub async fn scan_me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let Some(token) = cookie::cookie_value(&headers, SCAN_COOKIE_NAME) else {
        return no_agent(StatusCode::UNAUTHORIZED);
    };

    let Some(claims) = auth_state.codec().verify(&token) else {
        return no_agent(StatusCode::UNAUTHORIZED);
    };

    if claims.role != Role::Agent {
        return no_agent(StatusCode::UNAUTHORIZED);
    }

    let Ok(agent_id) = claims.sub.parse::<Uuid>() else {
        return no_agent(StatusCode::UNAUTHORIZED);
    };

    match storage::get_agent_by_id(&pool, agent_id).await {
        Ok(Some(agent)) => {
            let body = AgentResponse {
                agent: Some(profile(agent, Utc::now())),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(None) => no_agent(StatusCode::UNAUTHORIZED),
        Err(err) => {
            error!("Failed to lookup agent: {err}");
            no_agent(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Clear the scan cookie. Idempotent, like the user logout.
#[utoipa::path(
    post,
    path = "/api/scan/logout",
    responses(
        (status = 200, description = "Agent session cleared", body = OkResponse)
    ),
    tag = "scan"
)]
pub async fn scan_logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let mut response_headers = HeaderMap::new();
    match cookie::clear_scan_cookie(auth_state.config()) {
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
    use crate::api::handlers::auth::AuthConfig;
    use axum::body::to_bytes;
    use axum::http::header::COOKIE;
    use axum::http::HeaderValue;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("tikezone.com".to_string(), false);
        Arc::new(AuthState::new(
            config,
            &SecretString::from("test-secret".to_string()),
            Arc::new(InMemoryOtpStore::new(600)),
            Arc::new(LogOtpSender),
        ))
    }

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/postgres")
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn liveness_window_is_two_minutes() {
        let now = Utc::now();
        assert!(is_online(Some(now - Duration::seconds(30)), now));
        assert!(is_online(Some(now - Duration::seconds(120)), now));
        assert!(!is_online(Some(now - Duration::seconds(300)), now));
        assert!(!is_online(None, now));
    }

    #[tokio::test]
    async fn scan_me_without_cookie_is_null_agent() {
        let response = scan_me(HeaderMap::new(), Extension(lazy_pool()), Extension(auth_state()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "agent": null }));
    }

    #[tokio::test]
    async fn scan_me_with_forged_token_is_null_agent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("scan_token=forged"));

        let response = scan_me(headers, Extension(lazy_pool()), Extension(auth_state()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn scan_me_with_user_role_is_null_agent() {
        let state = auth_state();
        let token = state
            .codec()
            .sign(&Uuid::new_v4().to_string(), "a@b.com", Role::User)
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("scan_token={token}")).unwrap(),
        );

        let response = scan_me(headers, Extension(lazy_pool()), Extension(state))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "agent": null }));
    }

    #[tokio::test]
    async fn scan_me_auth_cookie_is_ignored() {
        let state = auth_state();
        let token = state
            .codec()
            .sign(&Uuid::new_v4().to_string(), "a@b.com", Role::Agent)
            .unwrap();
        let mut headers = HeaderMap::new();
        // Agent-role token in the wrong slot must not authenticate.
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("auth_token={token}")).unwrap(),
        );

        let response = scan_me(headers, Extension(lazy_pool()), Extension(state))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn scan_login_missing_payload() {
        let response = scan_login(Extension(lazy_pool()), Extension(auth_state()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn scan_login_without_issued_code_is_invalid() {
        let response = scan_login(
            Extension(lazy_pool()),
            Extension(auth_state()),
            Some(Json(ScanLoginRequest {
                email: "gate-a@example.com".to_string(),
                code: "123456".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn scan_logout_clears_scan_cookie() {
        let response = scan_logout(Extension(auth_state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .unwrap();
        assert!(set_cookie.starts_with("scan_token=; "));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
