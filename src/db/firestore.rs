// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Activity records (per-user check-in history)
//! - Recipients (emergency contacts + notification bookkeeping)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{ActivityRecord, ActivitySample, Recipient, User};
use crate::services::stores::{ActivityStore, RecipientStore, UserDirectory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user profile.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Activity Record Operations ──────────────────────────────

    /// Get a user's activity record.
    pub async fn get_activity_record(
        &self,
        user_id: &str,
    ) -> Result<Option<ActivityRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_ACTIVITY)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Full scan of all activity records.
    pub async fn get_all_activity_records(&self) -> Result<Vec<ActivityRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_ACTIVITY)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a user's activity record.
    async fn set_activity_record(&self, record: &ActivityRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_ACTIVITY)
            .document_id(&record.user_id)
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Recipient Operations ────────────────────────────────────

    /// Get all recipients registered by a user.
    pub async fn get_recipients(&self, user_id: &str) -> Result<Vec<Recipient>, AppError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RECIPIENTS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a recipient by document ID.
    pub async fn get_recipient(&self, id: &str) -> Result<Option<Recipient>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RECIPIENTS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a recipient (create or overwrite).
    pub async fn set_recipient(&self, recipient: &Recipient) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::RECIPIENTS)
            .document_id(&recipient.id)
            .object(recipient)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a recipient.
    pub async fn delete_recipient(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::RECIPIENTS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Stamp a recipient's explanation-message bookkeeping.
    pub async fn mark_explanation_sent(
        &self,
        id: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<Recipient, AppError> {
        let mut recipient = self
            .get_recipient(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recipient {} not found", id)))?;

        recipient.explanation_sent_at = Some(sent_at);
        recipient.updated_at = sent_at;
        self.set_recipient(&recipient).await?;
        Ok(recipient)
    }
}

#[async_trait]
impl ActivityStore for FirestoreDb {
    async fn all_activity_records(&self) -> Result<Vec<ActivityRecord>, AppError> {
        self.get_all_activity_records().await
    }

    async fn activity_record(&self, user_id: &str) -> Result<Option<ActivityRecord>, AppError> {
        self.get_activity_record(user_id).await
    }

    async fn append_activity(
        &self,
        user_id: &str,
        sample: ActivitySample,
    ) -> Result<ActivityRecord, AppError> {
        let mut record = self
            .get_activity_record(user_id)
            .await?
            .unwrap_or_else(|| ActivityRecord::new(user_id));

        record.record_sample(sample);
        self.set_activity_record(&record).await?;
        Ok(record)
    }
}

#[async_trait]
impl RecipientStore for FirestoreDb {
    async fn recipients_for_user(&self, user_id: &str) -> Result<Vec<Recipient>, AppError> {
        self.get_recipients(user_id).await
    }

    async fn recipient(&self, id: &str) -> Result<Option<Recipient>, AppError> {
        self.get_recipient(id).await
    }

    async fn record_notification(
        &self,
        id: &str,
        episode: Option<DateTime<Utc>>,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut recipient = self
            .get_recipient(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recipient {} not found", id)))?;

        recipient.last_notified_episode = episode;
        recipient.last_notified_at = Some(sent_at);
        recipient.updated_at = sent_at;
        self.set_recipient(&recipient).await
    }
}

#[async_trait]
impl UserDirectory for FirestoreDb {
    /// Display name for notification messages. Falls back to "User" when
    /// the profile is missing or has an empty name.
    async fn display_name(&self, user_id: &str) -> Result<String, AppError> {
        let name = self
            .get_user(user_id)
            .await?
            .map(|user| user.display_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "User".to_string());
        Ok(name)
    }
}
