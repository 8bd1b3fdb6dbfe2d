//! Thin passthrough of the upstream authentication actions.
//!
//! These are one-shot actions: unlike polling, every failure is returned
//! to the caller so the dashboard can show it next to the form.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UpstreamClient;
use crate::error::GatewayError;

/// Account role requested at sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Dashboard administrator.
    Admin,
    /// Regular user.
    User,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Login e-mail.
    pub email: String,
    /// Password.
    pub password: String,
    /// Requested role.
    pub role: UserRole,
}

/// Body of `POST /auth/verify-otp`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    /// Account e-mail.
    pub email: String,
    /// One-time password received by e-mail.
    pub otp: String,
}

/// Body of `POST /auth/resend-otp`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResendOtpRequest {
    /// Account e-mail.
    pub email: String,
}

/// Body of `POST /auth/signin`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SigninRequest {
    /// Login e-mail.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Forwards authentication actions to the upstream service.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: Arc<UpstreamClient>,
}

impl AuthApi {
    /// Creates the API over a shared upstream client.
    #[must_use]
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self { client }
    }

    /// Registers a new account; the user must verify an OTP next.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure unchanged.
    pub async fn signup(&self, req: &SignupRequest) -> Result<serde_json::Value, GatewayError> {
        self.client.post_json("/auth/signup", Some(req)).await
    }

    /// Confirms an account with the e-mailed OTP.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure unchanged.
    pub async fn verify_otp(
        &self,
        req: &VerifyOtpRequest,
    ) -> Result<serde_json::Value, GatewayError> {
        self.client.post_json("/auth/verify-otp", Some(req)).await
    }

    /// Asks the upstream to send a fresh OTP.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure unchanged.
    pub async fn resend_otp(
        &self,
        req: &ResendOtpRequest,
    ) -> Result<serde_json::Value, GatewayError> {
        self.client.post_json("/auth/resend-otp", Some(req)).await
    }

    /// Signs in. A `token` field in the answer becomes the bearer token
    /// for all later upstream requests.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure unchanged; the stored token is left
    /// as it was.
    pub async fn signin(&self, req: &SigninRequest) -> Result<serde_json::Value, GatewayError> {
        let answer = self.client.post_json("/auth/signin", Some(req)).await?;
        if let Some(token) = answer.get("token").and_then(|t| t.as_str()) {
            self.client.token().set(token).await;
            tracing::info!(email = %req.email, "signed in; bearer token updated");
        } else {
            tracing::info!(email = %req.email, "signed in");
        }
        Ok(answer)
    }

    /// Signs out and forgets the bearer token.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure unchanged; the token is kept in that
    /// case.
    pub async fn logout(&self) -> Result<serde_json::Value, GatewayError> {
        let answer = self.client.post_json::<()>("/auth/logout", None).await?;
        self.client.token().clear().await;
        tracing::info!("signed out; bearer token cleared");
        Ok(answer)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn signup_uses_camel_case_and_upper_role() {
        let req = SignupRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            role: UserRole::Admin,
        };
        let Ok(json) = serde_json::to_value(&req) else {
            panic!("serialization failed");
        };
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["lastName"], "Lovelace");
        assert_eq!(json["role"], "ADMIN");
    }
}
