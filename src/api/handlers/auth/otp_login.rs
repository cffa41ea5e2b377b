//! Passwordless login: request a code, verify it, receive a session.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::cookie;
use super::error::AuthError;
use super::otp::OtpStore;
use super::state::AuthState;
use super::token::Role;
use super::types::{OkResponse, SendOtpRequest, UserResponse, VerifyOtpRequest, VerifyOtpResponse};
use super::utils::{display_name_from_email, normalize_email, valid_email};
use crate::api::email::OtpMessage;

/// Issue a one-time login code and hand it to the delivery channel.
///
/// Responds `{ok:true}` for any well-formed email, registered or not, so
/// the endpoint cannot be used to probe which accounts exist.
#[utoipa::path(
    post,
    path = "/api/auth/send-otp",
    request_body = SendOtpRequest,
    responses(
        (status = 200, description = "Code issued (or silently ignored)", body = OkResponse),
        (status = 400, description = "Missing or malformed email", body = String)
    ),
    tag = "auth"
)]
pub async fn send_otp(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<SendOtpRequest>>,
) -> impl IntoResponse {
    let request: SendOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let code = auth_state.otp().issue(&email);

    // Delivery failures are logged, never reported: the response shape must
    // not depend on anything account-specific.
    let message = OtpMessage {
        to_email: email,
        code,
    };
    if let Err(err) = auth_state.sender().send(&message) {
        error!("Failed to deliver login code: {err}");
    }

    (StatusCode::OK, Json(OkResponse::new())).into_response()
}

/// Verify a one-time code and start a session.
///
/// Absent, expired and mismatched codes are indistinguishable to the
/// client; a matching code is consumed before any store work so it can
/// never be replayed.
#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Session issued", body = VerifyOtpResponse),
        (status = 400, description = "Missing payload", body = String),
        (status = 401, description = "Invalid or expired code"),
        (status = 500, description = "Store failure")
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyOtpRequest>>,
) -> impl IntoResponse {
    let request: VerifyOtpRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if let Err(err) = check_code(&auth_state, &email, &request.code) {
        return err.into_response();
    }
    auth_state.otp().consume(&email);

    let name = display_name_from_email(&email);
    let user = match super::storage::ensure_user(&pool, &email, &name).await {
        Ok(user) => user,
        Err(err) => {
            error!("Failed to resolve user for login: {err}");
            return AuthError::Internal(err.to_string()).into_response();
        }
    };

    let role = user.role.parse::<Role>().unwrap_or(Role::User);
    let token = match auth_state.codec().sign(&user.id.to_string(), &user.email, role) {
        Ok(token) => token,
        Err(err) => return err.into_response(),
    };

    let mut response_headers = HeaderMap::new();
    match cookie::auth_cookie(auth_state.config(), &token) {
        Ok(directive) => {
            response_headers.insert(SET_COOKIE, directive);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return AuthError::Internal(err.to_string()).into_response();
        }
    }

    let body = VerifyOtpResponse {
        verified: true,
        token,
        user: UserResponse {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            role,
        },
    };

    (StatusCode::OK, response_headers, Json(body)).into_response()
}

/// Shared OTP check for user and scan login: expired entries are deleted on
/// sight, everything else collapses to [`AuthError::InvalidCode`].
pub(crate) fn check_code(state: &AuthState, email: &str, code: &str) -> Result<(), AuthError> {
    let entry = state.otp().lookup(email).ok_or(AuthError::InvalidCode)?;

    if entry.is_expired(chrono::Utc::now()) {
        state.otp().consume(email);
        return Err(AuthError::InvalidCode);
    }

    if entry.code != code {
        return Err(AuthError::InvalidCode);
    }

    Ok(())
}
