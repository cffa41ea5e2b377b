//! Internal subdomain lookup, consumed only by the tenant resolver.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};
use tracing::{error, Instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, Debug)]
pub struct LookupParams {
    /// Tenant subdomain label, e.g. `shop1` for `shop1.tikezone.com`.
    pub sub: Option<String>,
}

/// `{slug}` when the subdomain maps to a tenant page, `{}` otherwise.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct SubdomainLookupResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/subdomain-lookup",
    params(LookupParams),
    responses(
        (status = 200, description = "Mapping result, empty when unresolved", body = SubdomainLookupResponse),
        (status = 500, description = "Store failure")
    ),
    tag = "tenants"
)]
pub async fn subdomain_lookup(
    pool: Extension<PgPool>,
    Query(params): Query<LookupParams>,
) -> impl IntoResponse {
    let Some(sub) = params
        .sub
        .as_deref()
        .map(|sub| sub.trim().to_lowercase())
        .filter(|sub| !sub.is_empty())
    else {
        return (StatusCode::OK, Json(SubdomainLookupResponse::default())).into_response();
    };

    let query = "SELECT slug FROM tenants WHERE subdomain = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    match sqlx::query(query)
        .bind(&sub)
        .fetch_optional(&*pool)
        .instrument(span)
        .await
    {
        Ok(row) => {
            let response = SubdomainLookupResponse {
                slug: row.map(|row| row.get("slug")),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => {
            error!("Failed to lookup subdomain {sub}: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/postgres")
            .unwrap()
    }

    #[tokio::test]
    async fn missing_sub_is_empty_mapping() {
        let response = subdomain_lookup(
            Extension(lazy_pool()),
            Query(LookupParams { sub: None }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn blank_sub_is_empty_mapping() {
        let response = subdomain_lookup(
            Extension(lazy_pool()),
            Query(LookupParams {
                sub: Some("   ".to_string()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn response_omits_absent_slug() {
        let empty = serde_json::to_value(SubdomainLookupResponse::default()).unwrap();
        assert_eq!(empty, serde_json::json!({}));

        let mapped = serde_json::to_value(SubdomainLookupResponse {
            slug: Some("shop1-page".to_string()),
        })
        .unwrap();
        assert_eq!(mapped, serde_json::json!({ "slug": "shop1-page" }));
    }
}
