use crate::api::handlers::{auth, health, scan, tenants};
use utoipa::openapi::{InfoBuilder, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both
/// served and included in the generated spec. Routes added outside (like
/// `GET /`) are intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    let router = OpenApiRouter::with_openapi(cargo_openapi())
        .routes(routes!(health::health))
        .routes(routes!(auth::otp_login::send_otp))
        .routes(routes!(auth::otp_login::verify_otp))
        .routes(routes!(auth::session::logout))
        .routes(routes!(auth::organizer::upgrade_to_organizer))
        .routes(routes!(scan::scan_login))
        .routes(routes!(scan::scan_me))
        .routes(routes!(scan::scan_logout))
        .routes(routes!(tenants::subdomain_lookup));

    router
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(Some(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Passwordless login and session lifecycle".to_string());
    let mut scan_tag = Tag::new("scan");
    scan_tag.description = Some("Scan-agent sessions and identity".to_string());
    let mut tenants_tag = Tag::new("tenants");
    tenants_tag.description = Some("Internal subdomain resolution".to_string());

    OpenApiBuilder::new()
        .info(info)
        .tags(Some(vec![auth_tag, scan_tag, tenants_tag]))
        .build()
}
