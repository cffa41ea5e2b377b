//! Tenant subdomain resolution, ahead of all other routing.
//!
//! `shop1.tikezone.com` style hosts are mapped to canonical
//! `https://tikezone.com/<slug>` redirects through the internal lookup
//! endpoint. The lookup is best-effort: a single outbound call with an
//! explicit timeout, and every failure mode degrades to a redirect to the
//! apex root. A lookup outage must never fault user navigation.

use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::State,
    http::{
        header::{HOST, LOCATION},
        HeaderValue, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tracing::warn;

use crate::api::handlers::auth::error::AuthError;
use crate::APP_USER_AGENT;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct LookupResponse {
    slug: Option<String>,
}

/// Resolver state: configured domains plus the lookup client, built once
/// at startup.
pub struct TenantResolver {
    main_domain: String,
    lookup_base_url: String,
    client: reqwest::Client,
}

impl TenantResolver {
    /// # Errors
    ///
    /// Returns an error if the lookup client cannot be constructed.
    pub fn new(main_domain: String, lookup_base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(LOOKUP_TIMEOUT)
            .build()
            .context("Failed to build subdomain lookup client")?;

        Ok(Self {
            main_domain,
            lookup_base_url: lookup_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Extract the tenant label from a Host header value.
    ///
    /// Strips the port, requires a strict subdomain of the main domain, and
    /// excludes the bare `www` label. The apex itself is not a tenant.
    fn tenant_label(&self, host: &str) -> Option<String> {
        let host = host.trim().to_lowercase();
        let host = match host.rsplit_once(':') {
            Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
                name
            }
            _ => host.as_str(),
        };

        let suffix = format!(".{}", self.main_domain);
        let label = host.strip_suffix(suffix.as_str())?;
        if label.is_empty() || label == "www" {
            return None;
        }
        Some(label.to_string())
    }

    /// One lookup call per request, no caching. `Ok(None)` means the
    /// subdomain has no mapping; `Err` means the call itself failed.
    async fn resolve(&self, label: &str) -> Result<Option<String>, AuthError> {
        let url = format!("{}/api/subdomain-lookup", self.lookup_base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("sub", label)])
            .send()
            .await
            .map_err(|_| AuthError::UpstreamUnavailable)?;

        if !response.status().is_success() {
            return Err(AuthError::UpstreamUnavailable);
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|_| AuthError::UpstreamUnavailable)?;

        Ok(body.slug.filter(|slug| !slug.is_empty()))
    }

    fn root_url(&self) -> String {
        format!("https://{}/", self.main_domain)
    }

    fn slug_url(&self, slug: &str) -> String {
        format!("https://{}/{}", self.main_domain, slug)
    }
}

/// API routes, asset prefixes, and anything that looks like a static file
/// reference (a path with a literal dot) bypass tenant resolution.
fn is_passthrough_path(path: &str) -> bool {
    path == "/api"
        || path.starts_with("/api/")
        || path.starts_with("/assets/")
        || path.starts_with("/static/")
        || path.contains('.')
}

/// Temporary redirect: tenant mappings can change, so clients must not
/// cache the hop.
fn found(location: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(LOCATION, value);
    }
    response
}

/// Middleware entry point. Runs ahead of the router; requests that are not
/// tenant navigation pass through unchanged.
pub async fn tenant_resolver(
    State(resolver): State<Arc<TenantResolver>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if is_passthrough_path(request.uri().path()) {
        return next.run(request).await;
    }

    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let Some(label) = resolver.tenant_label(host) else {
        return next.run(request).await;
    };

    match resolver.resolve(&label).await {
        Ok(Some(slug)) => found(&resolver.slug_url(&slug)),
        Ok(None) => found(&resolver.root_url()),
        Err(err) => {
            warn!("Subdomain lookup failed for {label}: {err}");
            found(&resolver.root_url())
        }
    }
}
