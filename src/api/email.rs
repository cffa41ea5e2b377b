//! One-time code delivery abstraction.
//!
//! The login flow issues a code and hands it to an [`OtpSender`]; the
//! sender decides how to deliver (SMTP, provider API, SMS, ...). Delivery
//! is a single best-effort call: codes expire within minutes, so there is
//! no queue or retry machinery behind this seam.
//!
//! The default sender for local dev is [`LogOtpSender`], which logs the
//! code instead of sending real email.

use anyhow::Result;
use tracing::info;

#[derive(Clone, Debug)]
pub struct OtpMessage {
    pub to_email: String,
    pub code: String,
}

/// Code delivery abstraction used by the send-otp endpoint.
pub trait OtpSender: Send + Sync {
    /// Deliver a login code or return an error to be logged server-side.
    fn send(&self, message: &OtpMessage) -> Result<()>;
}

/// Local dev sender that logs the code instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogOtpSender;

impl OtpSender for LogOtpSender {
    fn send(&self, message: &OtpMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            code = %message.code,
            "otp delivery stub"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sender_always_succeeds() {
        let sender = LogOtpSender;
        let message = OtpMessage {
            to_email: "a@b.com".to_string(),
            code: "123456".to_string(),
        };
        assert!(sender.send(&message).is_ok());
    }
}
