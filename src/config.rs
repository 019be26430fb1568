// config.rs
use std::env;

use crate::errors::{AppError, Result};

pub const DEFAULT_OTP_TTL_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub otp_ttl_secs: u64,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("RPS_API_BASE_URL")
            .map_err(|_| AppError::configuration("RPS_API_BASE_URL must be set"))?;

        let request_timeout_secs = env::var("RPS_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;

        let otp_ttl_secs = env::var("RPS_OTP_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_OTP_TTL_SECS.to_string())
            .parse()?;

        Ok(ClientConfig {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout_secs,
            otp_ttl_secs,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: "http://localhost:10000/api".to_string(),
            request_timeout_secs: 30,
            otp_ttl_secs: DEFAULT_OTP_TTL_SECS,
        }
    }
}
