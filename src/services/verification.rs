use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::errors::{AppError, Result};
use crate::models::auth::{
    AuthResponse, ForgotPasswordRequest, ResetPasswordRequest, VerifyOtpRequest,
};

/// The three remote operations the reset flow consumes. The backend owns
/// the payloads; the client only supplies the fields below and reads
/// back `{success, message}`.
#[async_trait]
pub trait VerificationService: Send + Sync {
    async fn request_otp(&self, email: &str) -> Result<AuthResponse>;
    async fn verify_otp(&self, email: &str, otp: &str) -> Result<AuthResponse>;
    async fn reset_password(&self, email: &str, new_password: &str) -> Result<AuthResponse>;
}

#[derive(Clone)]
pub struct HttpVerificationService {
    base_url: String,
    client: Client,
}

impl HttpVerificationService {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::HttpClientError(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            base_url: config.api_base_url.clone(),
            client,
        })
    }

    async fn post_json<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::RemoteApi(format!("Request to {} failed: {}", path, e)))?;

        // Error statuses still carry a {success, message} body worth
        // surfacing, so parse before checking the status.
        let status = response.status();
        match response.json::<AuthResponse>().await {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(AppError::RemoteApi(format!(
                "Request to {} failed with status: {}",
                path, status
            ))),
            Err(e) => Err(AppError::RemoteApi(format!(
                "Invalid response from {}: {}",
                path, e
            ))),
        }
    }
}

#[async_trait]
impl VerificationService for HttpVerificationService {
    async fn request_otp(&self, email: &str) -> Result<AuthResponse> {
        let req = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.post_json("/auth/forgot-password", &req).await
    }

    async fn verify_otp(&self, email: &str, otp: &str) -> Result<AuthResponse> {
        let req = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        };
        self.post_json("/auth/verify-otp", &req).await
    }

    async fn reset_password(&self, email: &str, new_password: &str) -> Result<AuthResponse> {
        let req = ResetPasswordRequest {
            email: email.to_string(),
            new_password: new_password.to_string(),
        };
        self.post_json("/auth/reset-password", &req).await
    }
}
