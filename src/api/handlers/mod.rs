//! API handlers.
//!
//! Auth flows live under [`auth`], scan-agent endpoints under [`scan`],
//! and the resolver-facing subdomain lookup under [`tenants`].

pub mod auth;
pub mod health;
pub mod root;
pub mod scan;
pub mod tenants;
