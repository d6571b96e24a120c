// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Result types produced by an inactivity check run.
//!
//! These are transient: returned to the scheduler as JSON, never persisted.

use crate::models::ActivitySample;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Outcome of a single dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum NotificationStatus {
    /// Message sent and bookkeeping updated
    Success,
    /// Provider or persistence failure; bookkeeping unchanged so the
    /// next run retries
    Failed,
    /// Already notified for this inactivity episode
    Skipped,
}

/// Per-recipient dispatch result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NotificationResult {
    pub recipient_id: String,
    pub status: NotificationStatus,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-user aggregation of a check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserCheckResult {
    pub user_id: String,
    pub user_name: String,
    /// The user's newest sample at scan time, if any
    pub last_activity: Option<ActivitySample>,
    pub notifications: Vec<NotificationResult>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub success_count: usize,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_recipients: usize,
    /// Set when a per-user lookup failed and dispatch was not attempted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UserCheckResult {
    /// Entry for a user whose display-name or recipient lookup failed.
    /// The batch keeps going; this user is retried on the next run.
    pub fn degraded(user_id: String, last_activity: Option<ActivitySample>, error: String) -> Self {
        Self {
            user_id,
            user_name: "User".to_string(),
            last_activity,
            notifications: Vec::new(),
            success_count: 0,
            total_recipients: 0,
            error: Some(error),
        }
    }
}

/// Batch-level report for a whole check run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InactivityReport {
    /// Human-readable summary
    pub message: String,
    pub results: Vec<UserCheckResult>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_notifications: usize,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_successful: usize,
}

impl InactivityReport {
    /// Report for a run that found no inactive users.
    pub fn empty() -> Self {
        Self {
            message: "No inactive users found".to_string(),
            results: Vec::new(),
            total_notifications: 0,
            total_successful: 0,
        }
    }

    /// Aggregate per-user results into the batch report.
    pub fn from_results(results: Vec<UserCheckResult>) -> Self {
        let total_notifications: usize = results.iter().map(|r| r.total_recipients).sum();
        let total_successful: usize = results.iter().map(|r| r.success_count).sum();
        let message = format!(
            "Processed {} inactive users. Successfully sent {} out of {} notifications.",
            results.len(),
            total_successful,
            total_notifications
        );
        Self {
            message,
            results,
            total_notifications,
            total_successful,
        }
    }
}
