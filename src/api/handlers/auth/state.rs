//! Auth configuration and shared state.

use secrecy::SecretString;
use std::sync::Arc;

use super::otp::OtpStore;
use super::token::TokenCodec;
use crate::api::email::OtpSender;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;
const DEFAULT_OTP_TTL_SECONDS: i64 = 10 * 60;

/// Environment-derived configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    main_domain: String,
    api_base_url: String,
    production: bool,
    session_ttl_seconds: i64,
    otp_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(main_domain: String, production: bool) -> Self {
        let api_base_url = format!("https://{main_domain}");

        Self {
            main_domain,
            api_base_url,
            production,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
        }
    }

    #[must_use]
    pub fn with_api_base_url(mut self, api_base_url: String) -> Self {
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn main_domain(&self) -> &str {
        &self.main_domain
    }

    #[must_use]
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    #[must_use]
    pub fn production(&self) -> bool {
        self.production
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }

    /// Cookies are only marked `Secure` in production deployments.
    pub(crate) fn cookie_secure(&self) -> bool {
        self.production
    }
}

/// Shared state injected into the auth and scan handlers.
pub struct AuthState {
    config: AuthConfig,
    codec: TokenCodec,
    otp: Arc<dyn OtpStore>,
    sender: Arc<dyn OtpSender>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        token_secret: &SecretString,
        otp: Arc<dyn OtpStore>,
        sender: Arc<dyn OtpSender>,
    ) -> Self {
        let codec = TokenCodec::new(token_secret, config.session_ttl_seconds());
        Self {
            config,
            codec,
            otp,
            sender,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub(crate) fn otp(&self) -> &dyn OtpStore {
        self.otp.as_ref()
    }

    pub(crate) fn sender(&self) -> &dyn OtpSender {
        self.sender.as_ref()
    }
}
