//! # TikeZone Gateway (Authentication & Tenant Routing)
//!
//! `tikezone` is the authentication and request-routing layer of the
//! TikeZone events platform. It issues and verifies signed session tokens
//! for two principal kinds (end users/organizers and scan agents), keeps
//! short-lived one-time login codes, and resolves per-tenant subdomains to
//! canonical resource paths.
//!
//! ## Sessions & Cookies
//!
//! Sessions are stateless HS256 tokens carrying `{sub, email, role}` plus
//! issued-at/expiry. Two independent cookie namespaces exist:
//!
//! - `auth_token`: user, organizer, and customer sessions.
//! - `scan_token`: scan-agent sessions.
//!
//! Both slots use the same codec; a principal can hold both cookies at the
//! same time without interference. Rotating the signing secret invalidates
//! every outstanding token.
//!
//! ## Passwordless Login
//!
//! Login is OTP-based: `/api/auth/send-otp` issues a 6-digit code with a
//! 10-minute expiry, `/api/auth/verify-otp` consumes it and sets the auth
//! cookie. The code store is process-local and single-instance by design;
//! see [`api::handlers::auth::otp`] for the replacement seam.
//!
//! ## Tenant Routing
//!
//! A middleware ahead of all routing maps `shop1.tikezone.com` style hosts
//! to `https://tikezone.com/<slug>` redirects through an internal lookup
//! endpoint. Lookup outages never fault user navigation; they degrade to
//! a redirect to the apex root.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
