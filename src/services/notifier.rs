// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification dispatch with per-episode deduplication.
//!
//! A recipient is alerted at most once per inactivity episode. Bookkeeping
//! is written only after the provider confirms the send; any failure leaves
//! it unchanged so the next scheduled run retries.

use crate::error::AppError;
use crate::models::{ActivitySample, NotificationResult, NotificationStatus, Recipient};
use crate::services::stores::RecipientStore;
use crate::services::twilio::MessagingProvider;
use crate::time_utils::format_message_timestamp;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Per-call ceiling for a provider send, so one slow recipient cannot
/// stall the whole batch.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decide whether a recipient should be notified for the given episode.
///
/// Equality only, never ordering: a changed marker resets eligibility even
/// if the new marker is earlier (misconfigured clocks must not suppress
/// alerts). A recipient is skipped iff they were notified before and the
/// stored episode marker equals the current one, `None` markers included;
/// that makes re-runs for never-checked-in users idempotent while a `None`
/// marker after a real episode still notifies.
pub fn should_notify(recipient: &Recipient, episode: Option<DateTime<Utc>>) -> bool {
    recipient.last_notified_at.is_none() || recipient.last_notified_episode != episode
}

/// Sends inactivity alerts and maintains recipient bookkeeping.
pub struct NotificationService {
    recipients: Arc<dyn RecipientStore>,
    messaging: Arc<dyn MessagingProvider>,
}

impl NotificationService {
    pub fn new(recipients: Arc<dyn RecipientStore>, messaging: Arc<dyn MessagingProvider>) -> Self {
        Self {
            recipients,
            messaging,
        }
    }

    /// Dispatch one alert: fresh bookkeeping read, dedup check, provider
    /// send, then bookkeeping write.
    ///
    /// The re-read narrows the race window between concurrent episode
    /// checks; the stale copy from the batch scan is only used for
    /// reporting if the recipient vanished meanwhile.
    pub async fn dispatch(
        &self,
        recipient: &Recipient,
        message: &str,
        episode: Option<DateTime<Utc>>,
    ) -> NotificationResult {
        let fresh = match self.recipients.recipient(&recipient.id).await {
            Ok(Some(r)) => r,
            Ok(None) => {
                return failed(recipient, "Recipient no longer exists".to_string());
            }
            Err(e) => {
                tracing::warn!(recipient_id = %recipient.id, error = %e, "Bookkeeping read failed");
                return failed(recipient, e.to_string());
            }
        };

        if !should_notify(&fresh, episode) {
            tracing::debug!(
                recipient_id = %fresh.id,
                "Already notified for this inactivity episode"
            );
            return NotificationResult {
                recipient_id: fresh.id,
                status: NotificationStatus::Skipped,
                phone_number: fresh.phone_number,
                error: Some("Already notified for this inactivity period".to_string()),
            };
        }

        match tokio::time::timeout(SEND_TIMEOUT, self.messaging.send(&fresh.phone_number, message))
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(
                    recipient_id = %fresh.id,
                    error = %e,
                    "Failed to send inactivity alert"
                );
                return failed(&fresh, e.to_string());
            }
            Err(_) => {
                tracing::error!(recipient_id = %fresh.id, "Inactivity alert send timed out");
                return failed(&fresh, format!("Send timed out after {:?}", SEND_TIMEOUT));
            }
        }

        // The write happens only after the provider confirmed the send;
        // marking-before-sending could suppress an alert that never left.
        if let Err(e) = self
            .recipients
            .record_notification(&fresh.id, episode, Utc::now())
            .await
        {
            tracing::error!(
                recipient_id = %fresh.id,
                error = %e,
                "Alert sent but bookkeeping write failed"
            );
            return failed(&fresh, e.to_string());
        }

        tracing::info!(recipient_id = %fresh.id, "Inactivity alert sent");
        NotificationResult {
            recipient_id: fresh.id,
            status: NotificationStatus::Success,
            phone_number: fresh.phone_number,
            error: None,
        }
    }
}

fn failed(recipient: &Recipient, error: String) -> NotificationResult {
    NotificationResult {
        recipient_id: recipient.id.clone(),
        status: NotificationStatus::Failed,
        phone_number: recipient.phone_number.clone(),
        error: Some(error),
    }
}

/// Build the inactivity alert SMS body.
pub fn format_inactivity_message(
    user_name: &str,
    last_activity: Option<&ActivitySample>,
    recipient_name: &str,
) -> String {
    let time_string = last_activity
        .map(|sample| format_message_timestamp(sample.timestamp))
        .unwrap_or_else(|| "an unknown time".to_string());

    let location_string = last_activity
        .and_then(|sample| sample.location)
        .map(|loc| format!("Their last known location was near {}, {}.", loc.lat, loc.lng))
        .unwrap_or_default();

    format!(
        "Dear {recipient_name},\n\n\
         We wanted to inform you that {user_name} hasn't shown any activity in our system \
         for over 24 hours. Their last activity was recorded on {time_string}. {location_string}\n\n\
         Please take a moment to check on their well-being. You're receiving this message \
         because you're listed as their emergency contact.\n\n\
         If you've already confirmed their safety, you can disregard this message. \
         If you have any concerns, please reach out to {user_name} directly or contact \
         emergency services if necessary.\n\n\
         This is an automated message from the Alive monitoring system."
    )
}

/// Build the one-time "you are an emergency contact" SMS body.
pub fn format_explanation_message(user_name: &str, recipient_name: &str) -> String {
    format!(
        "Important: {recipient_name}, you've been designated as an emergency contact by \
         {user_name} on the Alive safety app. Here's what this means:\n\n\
         1. You'll receive alerts if {user_name} becomes inactive for an extended period\n\
         2. These alerts will include their last known location\n\
         3. This helps ensure {user_name}'s safety with your help\n\n\
         No action needed from you now. You'll only receive messages if needed. \
         Reply STOP to opt out."
    )
}
