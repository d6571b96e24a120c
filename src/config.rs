//! Application configuration loaded from environment variables.
//!
//! Secrets (Twilio credentials, JWT key) are injected as environment
//! variables by the deployment platform and read once at startup.

use std::env;

/// Default inactivity threshold when INACTIVITY_THRESHOLD_HOURS is unset.
pub const DEFAULT_THRESHOLD_HOURS: i64 = 24;

/// Queue name expected in the `x-cloudtasks-queuename` header on
/// scheduler-invoked requests.
pub const CHECK_QUEUE_NAME: &str = "inactivity-check";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Hours without activity before a user is considered inactive
    pub inactivity_threshold_hours: i64,
    /// Sender phone number for outbound SMS
    pub twilio_from_number: String,

    // --- Secrets ---
    /// Twilio account SID
    pub twilio_account_sid: String,
    /// Twilio auth token
    pub twilio_auth_token: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            inactivity_threshold_hours: env::var("INACTIVITY_THRESHOLD_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_THRESHOLD_HOURS),
            twilio_from_number: env::var("TWILIO_PHONE_NUMBER")
                .map_err(|_| ConfigError::Missing("TWILIO_PHONE_NUMBER"))?,
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("TWILIO_ACCOUNT_SID"))?,
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("TWILIO_AUTH_TOKEN"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            inactivity_threshold_hours: DEFAULT_THRESHOLD_HOURS,
            twilio_from_number: "+15550000000".to_string(),
            twilio_account_sid: "ACtest".to_string(),
            twilio_auth_token: "test_token".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
