//! Database helpers for the user and agent stores.
//!
//! All access is through parameterized queries; each call is independently
//! committed; no cross-request transaction spans these helpers.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

/// Minimal user fields the auth flows need.
#[derive(Clone, Debug)]
pub(crate) struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) role: String,
}

/// Read-only agent view; presence is derived from `last_active_at`.
#[derive(Clone, Debug)]
pub(crate) struct AgentRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) status: String,
    pub(crate) last_active_at: Option<DateTime<Utc>>,
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role: row.get("role"),
    }
}

fn agent_from_row(row: &sqlx::postgres::PgRow) -> AgentRecord {
    AgentRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        status: row.get("status"),
        last_active_at: row.get("last_active_at"),
    }
}

fn query_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

/// Resolve a user by email, creating the row on first verified login.
///
/// The upsert keeps the existing name and role for returning users; only
/// brand-new rows get the defaults.
pub(crate) async fn ensure_user(pool: &PgPool, email: &str, name: &str) -> Result<UserRecord> {
    let query = r"
        INSERT INTO users (id, name, email, role)
        VALUES ($1, $2, $3, 'user')
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING id, name, email, role
    ";
    let row = sqlx::query(query)
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .fetch_one(pool)
        .instrument(query_span("INSERT", "upsert user by email"))
        .await
        .context("failed to resolve or create user")?;

    Ok(user_from_row(&row))
}

pub(crate) async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
    let query = "SELECT id, name, email, role FROM users WHERE id = $1";
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span("SELECT", "user by id"))
        .await
        .context("failed to lookup user")?;

    Ok(row.as_ref().map(user_from_row))
}

/// Persist the organizer role and return the updated row, or `None` if the
/// user vanished between session issuance and this call.
pub(crate) async fn promote_to_organizer(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
    let query = r"
        UPDATE users SET role = 'organizer'
        WHERE id = $1
        RETURNING id, name, email, role
    ";
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span("UPDATE", "promote user to organizer"))
        .await
        .context("failed to promote user")?;

    Ok(row.as_ref().map(user_from_row))
}

pub(crate) async fn get_agent_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AgentRecord>> {
    let query = "SELECT id, name, email, status, last_active_at FROM agents WHERE id = $1";
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(query_span("SELECT", "agent by id"))
        .await
        .context("failed to lookup agent")?;

    Ok(row.as_ref().map(agent_from_row))
}

/// Agents are provisioned out of band; login only matches existing rows.
pub(crate) async fn lookup_agent_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<AgentRecord>> {
    let query = "SELECT id, name, email, status, last_active_at FROM agents WHERE email = $1";
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(query_span("SELECT", "agent by email"))
        .await
        .context("failed to lookup agent")?;

    Ok(row.as_ref().map(agent_from_row))
}
