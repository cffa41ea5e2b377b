//! Request/response types for the auth and scan endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::token::Role;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SendOtpRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

/// Generic acknowledgement for fire-and-forget endpoints.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    #[must_use]
    pub fn new() -> Self {
        Self { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Public projection of a user record.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpResponse {
    pub verified: bool,
    pub token: String,
    pub user: UserResponse,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpgradeResponse {
    pub ok: bool,
    pub user: UserResponse,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ScanLoginRequest {
    pub email: String,
    pub code: String,
}

/// Agent profile merged with the derived liveness flag.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub status: String,
    pub is_online: bool,
}

/// Uniform scan identity shape: `agent` is `null` for every failure mode.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AgentResponse {
    pub agent: Option<AgentProfile>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn verify_otp_request_round_trips() -> Result<()> {
        let request = VerifyOtpRequest {
            email: "alice@example.com".to_string(),
            code: "123456".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let email = value
            .get("email")
            .and_then(serde_json::Value::as_str)
            .context("missing email")?;
        assert_eq!(email, "alice@example.com");
        let decoded: VerifyOtpRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.code, "123456");
        Ok(())
    }

    #[test]
    fn agent_profile_uses_camel_case_liveness_flag() -> Result<()> {
        let profile = AgentProfile {
            id: "agent-1".to_string(),
            name: "Gate A".to_string(),
            email: "gate-a@example.com".to_string(),
            status: "active".to_string(),
            is_online: true,
        };
        let value = serde_json::to_value(&profile)?;
        assert_eq!(value.get("isOnline"), Some(&serde_json::Value::Bool(true)));
        assert!(value.get("is_online").is_none());
        Ok(())
    }

    #[test]
    fn agent_response_serializes_null_agent() -> Result<()> {
        let response = AgentResponse { agent: None };
        let value = serde_json::to_value(&response)?;
        assert_eq!(value.get("agent"), Some(&serde_json::Value::Null));
        Ok(())
    }

    #[test]
    fn user_role_serializes_lowercase() -> Result<()> {
        let user = UserResponse {
            id: "u1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Organizer,
        };
        let value = serde_json::to_value(&user)?;
        assert_eq!(
            value.get("role").and_then(serde_json::Value::as_str),
            Some("organizer")
        );
        Ok(())
    }
}
