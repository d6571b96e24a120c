// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Twilio SMS client.
//!
//! Thin wrapper over the Twilio Messages REST API. The rest of the crate
//! talks to it through the [`MessagingProvider`] trait so tests can
//! substitute a recording fake.

use crate::error::AppError;
use async_trait::async_trait;

/// Outbound SMS seam. Delivery guarantees beyond the provider's HTTP
/// response are out of scope.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send(&self, to_phone_number: &str, body: &str) -> Result<(), AppError>;
}

/// Twilio REST API client.
#[derive(Clone)]
pub struct TwilioClient {
    http: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl TwilioClient {
    /// Create a new client with account credentials and sender number.
    pub fn new(account_sid: String, auth_token: String, from_number: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.twilio.com/2010-04-01".to_string(),
            account_sid,
            auth_token,
            from_number,
        }
    }

    /// Override the API base URL (tests against a local stub).
    #[doc(hidden)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl MessagingProvider for TwilioClient {
    /// POST /Accounts/{sid}/Messages.json with a form-encoded body.
    async fn send(&self, to_phone_number: &str, body: &str) -> Result<(), AppError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("To", to_phone_number),
                ("From", self.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| AppError::Messaging(format!("Send request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        // Twilio error payloads carry a message field worth surfacing
        let detail = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(text);

        Err(AppError::Messaging(format!("HTTP {}: {}", status, detail)))
    }
}
