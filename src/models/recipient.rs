// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emergency contact model with notification bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Emergency contact stored in Firestore. Many recipients per user.
///
/// The bookkeeping fields are mutated only by the notification dispatcher
/// (and the explanation-message endpoint); recipient CRUD never touches them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    /// Document ID
    pub id: String,
    /// Owning user ID
    pub user_id: String,
    /// Contact name used in message greetings
    pub name: String,
    /// Destination phone number (E.164)
    pub phone_number: String,
    /// Contact email (may be empty)
    #[serde(default)]
    pub email: String,
    /// Relationship to the user (may be empty)
    #[serde(default)]
    pub relationship: String,
    /// Episode marker the last inactivity alert was sent for.
    /// `None` either means never notified or notified for an episode with
    /// no timestamp identity; `last_notified_at` disambiguates.
    #[serde(default)]
    pub last_notified_episode: Option<DateTime<Utc>>,
    /// When the last inactivity alert was sent
    #[serde(default)]
    pub last_notified_at: Option<DateTime<Utc>>,
    /// When the "you are an emergency contact" explanation SMS was sent
    #[serde(default)]
    pub explanation_sent_at: Option<DateTime<Utc>>,
    /// When the recipient was created
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}
