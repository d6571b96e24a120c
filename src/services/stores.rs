// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage collaborator interfaces.
//!
//! The check engine only talks to storage through these traits so the
//! production Firestore client and the in-memory test fakes are
//! interchangeable. Dependencies are injected at construction time,
//! never reached through globals.

use crate::error::AppError;
use crate::models::{ActivityRecord, ActivitySample, Recipient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Per-user activity history persistence.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Full scan of every user's activity record.
    async fn all_activity_records(&self) -> Result<Vec<ActivityRecord>, AppError>;

    /// A single user's activity record, if they ever checked in.
    async fn activity_record(&self, user_id: &str) -> Result<Option<ActivityRecord>, AppError>;

    /// Append a check-in (prepend + trim + conditional `last_active_state`
    /// refresh) and return the updated record.
    async fn append_activity(
        &self,
        user_id: &str,
        sample: ActivitySample,
    ) -> Result<ActivityRecord, AppError>;
}

/// Emergency contact persistence with notification bookkeeping.
#[async_trait]
pub trait RecipientStore: Send + Sync {
    /// All recipients registered by a user.
    async fn recipients_for_user(&self, user_id: &str) -> Result<Vec<Recipient>, AppError>;

    /// A single recipient by document ID.
    async fn recipient(&self, id: &str) -> Result<Option<Recipient>, AppError>;

    /// Persist bookkeeping after a confirmed send: the episode marker the
    /// alert was sent for and the send time.
    async fn record_notification(
        &self,
        id: &str,
        episode: Option<DateTime<Utc>>,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}

/// Display-name lookup for notification messages.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, user_id: &str) -> Result<String, AppError>;
}
