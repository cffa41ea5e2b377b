//! Transport policy: HTTPS enforcement and strict-transport headers.
//!
//! TLS terminates upstream, so the inbound scheme is read from
//! `x-forwarded-proto`. In production, plaintext requests are permanently
//! redirected to the same URL with the scheme upgraded; everything that
//! passes through carries a long-lived `Strict-Transport-Security` header.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{HOST, LOCATION, STRICT_TRANSPORT_SECURITY},
        HeaderMap, HeaderValue, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

pub const STRICT_TRANSPORT_SECURITY_VALUE: &str = "max-age=63072000; includeSubDomains; preload";

const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";

/// Load-balancer probes hit this path over plaintext; upgrading them would
/// break health checking.
const EXEMPT_PATH: &str = "/health";

#[derive(Clone, Debug)]
pub struct TransportPolicy {
    production: bool,
}

impl TransportPolicy {
    #[must_use]
    pub fn new(production: bool) -> Self {
        Self { production }
    }
}

fn is_plaintext(headers: &HeaderMap) -> bool {
    headers
        .get(FORWARDED_PROTO_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("http"))
}

fn upgraded_url(headers: &HeaderMap, path_and_query: &str) -> Option<String> {
    let host = headers.get(HOST)?.to_str().ok()?;
    let host = host.rsplit_once(':').map_or(host, |(name, _)| name);
    Some(format!("https://{host}{path_and_query}"))
}

pub async fn enforce_https(
    State(policy): State<TransportPolicy>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if policy.production && path != EXEMPT_PATH && is_plaintext(request.headers()) {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map_or("/", |pq| pq.as_str());
        if let Some(location) = upgraded_url(request.headers(), path_and_query) {
            let mut response = StatusCode::MOVED_PERMANENTLY.into_response();
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(LOCATION, value);
            }
            return response;
        }
    }

    let mut response = next.run(request).await;
    response.headers_mut().insert(
        STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static(STRICT_TRANSPORT_SECURITY_VALUE),
    );
    response
}
