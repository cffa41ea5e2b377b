//! Role elevation: customer/user sessions become organizer sessions.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::cookie;
use super::error::AuthError;
use super::session::require_user;
use super::state::AuthState;
use super::token::Role;
use super::types::{UpgradeResponse, UserResponse};

/// Upgrade the authenticated user to organizer.
///
/// The role change re-signs a fresh token and replaces the auth cookie;
/// the session is never mutated in place. A stale session whose user row
/// vanished maps to 404, not a crash.
#[utoipa::path(
    post,
    path = "/api/auth/upgrade-to-organizer",
    responses(
        (status = 200, description = "Role upgraded, cookie replaced", body = UpgradeResponse),
        (status = 401, description = "Missing or invalid session"),
        (status = 404, description = "User record no longer exists"),
        (status = 500, description = "Store failure")
    ),
    tag = "auth"
)]
pub async fn upgrade_to_organizer(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let claims = match require_user(&headers, &auth_state) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    // A well-formed cookie with an unparsable subject is a stale or foreign
    // session, not a server fault.
    let Ok(user_id) = claims.sub.parse::<Uuid>() else {
        return AuthError::Unauthenticated.into_response();
    };

    let user = match super::storage::promote_to_organizer(&pool, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return AuthError::NotFound.into_response(),
        Err(err) => {
            error!("Failed to promote user {user_id}: {err}");
            return AuthError::Internal(err.to_string()).into_response();
        }
    };

    let token = match auth_state
        .codec()
        .sign(&user.id.to_string(), &user.email, Role::Organizer)
    {
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

    let body = UpgradeResponse {
        ok: true,
        user: UserResponse {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            role: Role::Organizer,
        },
    };

    (StatusCode::OK, response_headers, Json(body)).into_response()
}
