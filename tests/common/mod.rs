// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test fixtures: in-memory store fakes and a recording messenger.

use alive_tracker::config::Config;
use alive_tracker::db::FirestoreDb;
use alive_tracker::error::AppError;
use alive_tracker::models::{ActivityRecord, ActivitySample, Recipient};
use alive_tracker::routes::create_router;
use alive_tracker::services::{
    ActivityStore, InactivityChecker, MessagingProvider, RecipientStore, UserDirectory,
};
use alive_tracker::AppState;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// In-memory implementation of all three store traits, with failure knobs
/// so tests can simulate per-user lookup errors and store outages.
#[derive(Default)]
pub struct MemoryStore {
    pub records: Mutex<HashMap<String, ActivityRecord>>,
    pub recipients: Mutex<HashMap<String, Recipient>>,
    pub names: Mutex<HashMap<String, String>>,
    /// When set, the full scan fails (store unreachable)
    pub fail_scan: AtomicBool,
    /// User IDs whose display-name lookup fails
    pub fail_directory: Mutex<HashSet<String>>,
    /// User IDs whose recipient-list lookup fails
    pub fail_recipients: Mutex<HashSet<String>>,
}

impl MemoryStore {
    #[allow(dead_code)]
    pub fn add_record(&self, record: ActivityRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
    }

    #[allow(dead_code)]
    pub fn add_recipient(&self, recipient: Recipient) {
        self.recipients
            .lock()
            .unwrap()
            .insert(recipient.id.clone(), recipient);
    }

    #[allow(dead_code)]
    pub fn add_user(&self, user_id: &str, display_name: &str) {
        self.names
            .lock()
            .unwrap()
            .insert(user_id.to_string(), display_name.to_string());
    }

    #[allow(dead_code)]
    pub fn recipient_snapshot(&self, id: &str) -> Option<Recipient> {
        self.recipients.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn all_activity_records(&self) -> Result<Vec<ActivityRecord>, AppError> {
        if self.fail_scan.load(Ordering::SeqCst) {
            return Err(AppError::Database("store unreachable".to_string()));
        }
        Ok(self.records.lock().unwrap().values().cloned().collect())
    }

    async fn activity_record(&self, user_id: &str) -> Result<Option<ActivityRecord>, AppError> {
        Ok(self.records.lock().unwrap().get(user_id).cloned())
    }

    async fn append_activity(
        &self,
        user_id: &str,
        sample: ActivitySample,
    ) -> Result<ActivityRecord, AppError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(user_id.to_string())
            .or_insert_with(|| ActivityRecord::new(user_id));
        record.record_sample(sample);
        Ok(record.clone())
    }
}

#[async_trait]
impl RecipientStore for MemoryStore {
    async fn recipients_for_user(&self, user_id: &str) -> Result<Vec<Recipient>, AppError> {
        if self.fail_recipients.lock().unwrap().contains(user_id) {
            return Err(AppError::Database("recipient lookup failed".to_string()));
        }
        Ok(self
            .recipients
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn recipient(&self, id: &str) -> Result<Option<Recipient>, AppError> {
        Ok(self.recipients.lock().unwrap().get(id).cloned())
    }

    async fn record_notification(
        &self,
        id: &str,
        episode: Option<DateTime<Utc>>,
        sent_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut recipients = self.recipients.lock().unwrap();
        let recipient = recipients
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Recipient {} not found", id)))?;
        recipient.last_notified_episode = episode;
        recipient.last_notified_at = Some(sent_at);
        recipient.updated_at = sent_at;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn display_name(&self, user_id: &str) -> Result<String, AppError> {
        if self.fail_directory.lock().unwrap().contains(user_id) {
            return Err(AppError::Database("directory lookup failed".to_string()));
        }
        Ok(self
            .names
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| "User".to_string()))
    }
}

/// Recording messaging fake. Sends to numbers in `fail_numbers` fail.
#[derive(Default)]
pub struct MockMessenger {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_numbers: Mutex<HashSet<String>>,
}

impl MockMessenger {
    #[allow(dead_code)]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn fail_number(&self, number: &str) {
        self.fail_numbers.lock().unwrap().insert(number.to_string());
    }

    #[allow(dead_code)]
    pub fn clear_failures(&self) {
        self.fail_numbers.lock().unwrap().clear();
    }
}

#[async_trait]
impl MessagingProvider for MockMessenger {
    async fn send(&self, to_phone_number: &str, body: &str) -> Result<(), AppError> {
        if self.fail_numbers.lock().unwrap().contains(to_phone_number) {
            return Err(AppError::Messaging("simulated provider outage".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to_phone_number.to_string(), body.to_string()));
        Ok(())
    }
}

/// Build a checker wired to the given in-memory store and messenger.
#[allow(dead_code)]
pub fn test_checker(store: Arc<MemoryStore>, messenger: Arc<MockMessenger>) -> InactivityChecker {
    InactivityChecker::new(store.clone(), store.clone(), store, messenger)
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();

    let messenger: Arc<dyn MessagingProvider> = Arc::new(MockMessenger::default());
    let shared_db = Arc::new(db.clone());
    let checker = InactivityChecker::new(
        shared_db.clone(),
        shared_db.clone(),
        shared_db,
        messenger.clone(),
    );

    let state = Arc::new(AppState {
        config,
        db,
        messaging: messenger,
        checker,
    });

    (create_router(state.clone()), state)
}
