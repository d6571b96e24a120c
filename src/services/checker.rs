// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batch inactivity check orchestration.
//!
//! One run: scan every activity record, classify against a single `now`
//! snapshot, and fan alert dispatch out across the inactive users'
//! recipients. Failures stay local to the recipient or user they occur
//! in; only an unreachable store fails the run as a whole.

use crate::error::AppError;
use crate::models::{ActivityRecord, InactivityReport, NotificationStatus, UserCheckResult};
use crate::services::inactivity::{episode_marker, is_inactive};
use crate::services::notifier::{format_inactivity_message, NotificationService};
use crate::services::stores::{ActivityStore, RecipientStore, UserDirectory};
use crate::services::twilio::MessagingProvider;
use chrono::{Duration, Utc};
use futures_util::{stream, StreamExt};
use std::sync::Arc;

const MAX_CONCURRENT_USERS: usize = 10;
const MAX_CONCURRENT_DISPATCHES: usize = 10;

/// Scans all users and alerts the emergency contacts of inactive ones.
pub struct InactivityChecker {
    activities: Arc<dyn ActivityStore>,
    recipients: Arc<dyn RecipientStore>,
    directory: Arc<dyn UserDirectory>,
    notifier: NotificationService,
}

impl InactivityChecker {
    pub fn new(
        activities: Arc<dyn ActivityStore>,
        recipients: Arc<dyn RecipientStore>,
        directory: Arc<dyn UserDirectory>,
        messaging: Arc<dyn MessagingProvider>,
    ) -> Self {
        let notifier = NotificationService::new(recipients.clone(), messaging);
        Self {
            activities,
            recipients,
            directory,
            notifier,
        }
    }

    /// Run one inactivity check over all users.
    ///
    /// The `now` snapshot is taken once so the inactivity boundary is
    /// consistent across the whole batch. Returns an error only when the
    /// initial scan itself fails.
    pub async fn run_check(&self, threshold: Duration) -> Result<InactivityReport, AppError> {
        let now = Utc::now();

        let records = self.activities.all_activity_records().await?;
        let total_scanned = records.len();

        let inactive: Vec<ActivityRecord> = records
            .into_iter()
            .filter(|record| is_inactive(record, now, threshold))
            .collect();

        tracing::info!(
            total_scanned,
            inactive = inactive.len(),
            threshold_hours = threshold.num_hours(),
            "Inactivity scan complete"
        );

        if inactive.is_empty() {
            return Ok(InactivityReport::empty());
        }

        let results: Vec<UserCheckResult> = stream::iter(inactive)
            .map(|record| self.process_user(record))
            .buffer_unordered(MAX_CONCURRENT_USERS)
            .collect()
            .await;

        let report = InactivityReport::from_results(results);
        tracing::info!(
            total_notifications = report.total_notifications,
            total_successful = report.total_successful,
            "Inactivity check complete"
        );
        Ok(report)
    }

    /// Process one inactive user. Never fails the batch: lookup errors
    /// become a degraded result entry for this user alone.
    async fn process_user(&self, record: ActivityRecord) -> UserCheckResult {
        let user_id = record.user_id.clone();
        let last_activity = record.newest_sample().cloned();

        let (name_result, recipients_result) = tokio::join!(
            self.directory.display_name(&user_id),
            self.recipients.recipients_for_user(&user_id),
        );

        let user_name = match name_result {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Display name lookup failed");
                return UserCheckResult::degraded(user_id, last_activity, e.to_string());
            }
        };

        let recipients = match recipients_result {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Recipient lookup failed");
                return UserCheckResult::degraded(user_id, last_activity, e.to_string());
            }
        };

        if recipients.is_empty() {
            tracing::debug!(user_id = %user_id, "Inactive user has no recipients");
            return UserCheckResult {
                user_id,
                user_name,
                last_activity,
                notifications: Vec::new(),
                success_count: 0,
                total_recipients: 0,
                error: None,
            };
        }

        let episode = episode_marker(&record);

        let notifications: Vec<_> = stream::iter(recipients)
            .map(|recipient| {
                let message =
                    format_inactivity_message(&user_name, last_activity.as_ref(), &recipient.name);
                let notifier = &self.notifier;
                async move { notifier.dispatch(&recipient, &message, episode).await }
            })
            .buffer_unordered(MAX_CONCURRENT_DISPATCHES)
            .collect()
            .await;

        let success_count = notifications
            .iter()
            .filter(|n| n.status == NotificationStatus::Success)
            .count();
        let total_recipients = notifications.len();

        UserCheckResult {
            user_id,
            user_name,
            last_activity,
            notifications,
            success_count,
            total_recipients,
            error: None,
        }
    }
}
