//! Authentication endpoints
//!
//! Login and registration install session credentials on the coordinator
//! (which also resets a failed refresh state machine); logout clears them
//! locally even when the server-side call fails.

use std::sync::Arc;

use murmur_domain::types::auth::{
    AuthPayload, Credentials, ForgotPasswordRequest, RegisterData, ResetPasswordRequest,
    VerifyEmailRequest,
};
use murmur_domain::types::user::User;
use murmur_domain::ApiResult;
use serde_json::json;
use tracing::warn;

use crate::http::ApiClient;

/// `/auth/*` endpoints
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Sign in and install the issued session credentials
    ///
    /// # Errors
    /// Returns a classified [`ApiError`](murmur_domain::ApiError); invalid
    /// credentials surface as a `Client` error with the server's detail.
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<AuthPayload> {
        let payload: AuthPayload = self.client.post("/auth/login", credentials).await?;
        self.client.session().install(&payload.token_pair()).await;
        Ok(payload)
    }

    /// Create an account and install the issued session credentials
    pub async fn register(&self, data: &RegisterData) -> ApiResult<AuthPayload> {
        let payload: AuthPayload = self.client.post("/auth/register", data).await?;
        self.client.session().install(&payload.token_pair()).await;
        Ok(payload)
    }

    /// Sign out
    ///
    /// The server-side revocation is best effort: the local session is
    /// cleared even when the call fails, so the user is never stuck
    /// signed in.
    pub async fn logout(&self) -> ApiResult<()> {
        if let Err(e) = self.client.post_empty_unit("/auth/logout").await {
            warn!(error = %e, "server-side logout failed, clearing local session anyway");
        }
        self.client.session().clear().await;
        Ok(())
    }

    /// Fetch the authenticated user (token validity check)
    pub async fn me(&self) -> ApiResult<User> {
        self.client.get("/auth/me").await
    }

    /// Request a password-reset email
    pub async fn forgot_password(&self, email: impl Into<String>) -> ApiResult<()> {
        self.client
            .post_unit("/auth/forgot-password", &ForgotPasswordRequest { email: email.into() })
            .await
    }

    /// Complete a password reset with the emailed token
    pub async fn reset_password(
        &self,
        token: impl Into<String>,
        password: impl Into<String>,
    ) -> ApiResult<()> {
        self.client
            .post_unit(
                "/auth/reset-password",
                &ResetPasswordRequest { token: token.into(), password: password.into() },
            )
            .await
    }

    /// Confirm an email address with the emailed token
    pub async fn verify_email(&self, token: impl Into<String>) -> ApiResult<()> {
        self.client
            .post_unit("/auth/verify-email", &VerifyEmailRequest { token: token.into() })
            .await
    }

    /// Re-send the verification email
    pub async fn resend_verification(&self) -> ApiResult<()> {
        self.client.post_unit("/auth/resend-verification", &json!({})).await
    }
}
