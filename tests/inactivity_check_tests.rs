// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Batch orchestrator tests against in-memory fakes.
//!
//! These cover the end-to-end check run: classification, fan-out,
//! per-episode deduplication across runs, and failure isolation.

use alive_tracker::models::{
    ActivityRecord, ActivitySample, MotionStatus, NotificationStatus, Recipient,
};
use chrono::{Duration, Utc};
use std::sync::Arc;

mod common;
use common::{test_checker, MemoryStore, MockMessenger};

fn threshold() -> Duration {
    Duration::hours(24)
}

fn stale_record(user_id: &str, age_hours: i64) -> ActivityRecord {
    let mut record = ActivityRecord::new(user_id);
    record.record_sample(ActivitySample {
        timestamp: Utc::now() - Duration::hours(age_hours),
        location: None,
        motion_status: MotionStatus::Walking,
    });
    record
}

fn recipient(id: &str, user_id: &str, phone: &str) -> Recipient {
    let now = Utc::now();
    Recipient {
        id: id.to_string(),
        user_id: user_id.to_string(),
        name: format!("Contact {}", id),
        phone_number: phone.to_string(),
        email: String::new(),
        relationship: String::new(),
        last_notified_episode: None,
        last_notified_at: None,
        explanation_sent_at: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_no_inactive_users() {
    let store = Arc::new(MemoryStore::default());
    store.add_record(stale_record("u1", 2)); // fresh, within threshold
    let messenger = Arc::new(MockMessenger::default());
    let checker = test_checker(store, messenger.clone());

    let report = checker.run_check(threshold()).await.unwrap();

    assert_eq!(report.message, "No inactive users found");
    assert!(report.results.is_empty());
    assert_eq!(messenger.sent_count(), 0);
}

#[tokio::test]
async fn test_inactive_user_notifies_all_recipients() {
    let store = Arc::new(MemoryStore::default());
    store.add_record(stale_record("u1", 30));
    store.add_user("u1", "Alex");
    store.add_recipient(recipient("r1", "u1", "+15550000001"));
    store.add_recipient(recipient("r2", "u1", "+15550000002"));
    let messenger = Arc::new(MockMessenger::default());
    let checker = test_checker(store, messenger.clone());

    let report = checker.run_check(threshold()).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.total_notifications, 2);
    assert_eq!(report.total_successful, 2);
    assert_eq!(messenger.sent_count(), 2);

    let result = &report.results[0];
    assert_eq!(result.user_name, "Alex");
    assert_eq!(result.success_count, 2);
    assert!(result.last_activity.is_some());

    // Both message bodies carry the user's name
    for (_, body) in messenger.sent.lock().unwrap().iter() {
        assert!(body.contains("Alex hasn't shown any activity"));
    }
}

#[tokio::test]
async fn test_second_run_skips_same_episode() {
    let store = Arc::new(MemoryStore::default());
    store.add_record(stale_record("u1", 30));
    store.add_user("u1", "Alex");
    store.add_recipient(recipient("r1", "u1", "+15550000001"));
    let messenger = Arc::new(MockMessenger::default());
    let checker = test_checker(store.clone(), messenger.clone());

    let first = checker.run_check(threshold()).await.unwrap();
    assert_eq!(first.total_successful, 1);

    // No intervening activity: the episode marker is unchanged
    let second = checker.run_check(threshold()).await.unwrap();
    assert_eq!(second.total_successful, 0);
    assert_eq!(
        second.results[0].notifications[0].status,
        NotificationStatus::Skipped
    );
    // No second SMS left the provider
    assert_eq!(messenger.sent_count(), 1);
}

#[tokio::test]
async fn test_new_active_sample_resets_episode() {
    let store = Arc::new(MemoryStore::default());
    store.add_record(stale_record("u1", 30));
    store.add_user("u1", "Alex");
    store.add_recipient(recipient("r1", "u1", "+15550000001"));
    let messenger = Arc::new(MockMessenger::default());
    let checker = test_checker(store.clone(), messenger.clone());

    checker.run_check(threshold()).await.unwrap();
    assert_eq!(messenger.sent_count(), 1);

    // The user briefly comes back (a new active sample, itself stale by
    // the next run), moving the episode marker
    {
        let mut records = store.records.lock().unwrap();
        let record = records.get_mut("u1").unwrap();
        record.record_sample(ActivitySample {
            timestamp: Utc::now() - Duration::hours(26),
            location: None,
            motion_status: MotionStatus::Running,
        });
    }

    let report = checker.run_check(threshold()).await.unwrap();
    assert_eq!(report.total_successful, 1);
    assert_eq!(messenger.sent_count(), 2);
}

#[tokio::test]
async fn test_never_checked_in_user_success_then_skipped() {
    let store = Arc::new(MemoryStore::default());
    store.add_record(ActivityRecord::new("u1")); // no samples at all
    store.add_user("u1", "Alex");
    store.add_recipient(recipient("r1", "u1", "+15550000001"));
    let messenger = Arc::new(MockMessenger::default());
    let checker = test_checker(store, messenger.clone());

    let first = checker.run_check(threshold()).await.unwrap();
    assert_eq!(first.results.len(), 1);
    assert!(first.results[0].last_activity.is_none());
    assert_eq!(
        first.results[0].notifications[0].status,
        NotificationStatus::Success
    );
    // Message falls back to the unknown-time wording
    assert!(messenger.sent.lock().unwrap()[0]
        .1
        .contains("recorded on an unknown time"));

    let second = checker.run_check(threshold()).await.unwrap();
    assert_eq!(
        second.results[0].notifications[0].status,
        NotificationStatus::Skipped
    );
    assert_eq!(messenger.sent_count(), 1);
}

#[tokio::test]
async fn test_zero_recipient_user_reported() {
    let store = Arc::new(MemoryStore::default());
    store.add_record(stale_record("u1", 30));
    store.add_user("u1", "Alex");
    let messenger = Arc::new(MockMessenger::default());
    let checker = test_checker(store, messenger.clone());

    let report = checker.run_check(threshold()).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].total_recipients, 0);
    assert!(report.results[0].notifications.is_empty());
    assert_eq!(report.total_notifications, 0);
    assert_eq!(messenger.sent_count(), 0);
}

#[tokio::test]
async fn test_recipient_failure_does_not_abort_siblings() {
    let store = Arc::new(MemoryStore::default());
    store.add_record(stale_record("u1", 30));
    store.add_user("u1", "Alex");
    store.add_recipient(recipient("r1", "u1", "+15550000001"));
    store.add_recipient(recipient("r2", "u1", "+15550000002"));
    let messenger = Arc::new(MockMessenger::default());
    messenger.fail_number("+15550000001");
    let checker = test_checker(store, messenger.clone());

    let report = checker.run_check(threshold()).await.unwrap();

    let result = &report.results[0];
    assert_eq!(result.total_recipients, 2);
    assert_eq!(result.success_count, 1);

    let failed = result
        .notifications
        .iter()
        .find(|n| n.status == NotificationStatus::Failed)
        .expect("one dispatch should fail");
    assert_eq!(failed.phone_number, "+15550000001");
    assert!(failed.error.as_deref().unwrap().contains("provider outage"));
}

#[tokio::test]
async fn test_failed_dispatch_retries_on_next_run() {
    let store = Arc::new(MemoryStore::default());
    store.add_record(stale_record("u1", 30));
    store.add_user("u1", "Alex");
    store.add_recipient(recipient("r1", "u1", "+15550000001"));
    let messenger = Arc::new(MockMessenger::default());
    messenger.fail_number("+15550000001");
    let checker = test_checker(store.clone(), messenger.clone());

    let first = checker.run_check(threshold()).await.unwrap();
    assert_eq!(
        first.results[0].notifications[0].status,
        NotificationStatus::Failed
    );
    // Bookkeeping untouched by the failure
    assert!(store
        .recipient_snapshot("r1")
        .unwrap()
        .last_notified_at
        .is_none());

    // Provider recovers; the same episode is still eligible
    messenger.clear_failures();
    let second = checker.run_check(threshold()).await.unwrap();
    assert_eq!(
        second.results[0].notifications[0].status,
        NotificationStatus::Success
    );
}

#[tokio::test]
async fn test_user_lookup_failure_is_isolated() {
    let store = Arc::new(MemoryStore::default());
    store.add_record(stale_record("u1", 30));
    store.add_record(stale_record("u2", 30));
    store.add_user("u1", "Alex");
    store.add_user("u2", "Blake");
    store.add_recipient(recipient("r1", "u1", "+15550000001"));
    store.add_recipient(recipient("r2", "u2", "+15550000002"));
    store
        .fail_recipients
        .lock()
        .unwrap()
        .insert("u1".to_string());
    let messenger = Arc::new(MockMessenger::default());
    let checker = test_checker(store, messenger.clone());

    let report = checker.run_check(threshold()).await.unwrap();

    assert_eq!(report.results.len(), 2);
    let degraded = report
        .results
        .iter()
        .find(|r| r.user_id == "u1")
        .expect("degraded entry for u1");
    assert!(degraded.error.is_some());
    assert_eq!(degraded.total_recipients, 0);

    // The other user's dispatch still happened
    let healthy = report.results.iter().find(|r| r.user_id == "u2").unwrap();
    assert_eq!(healthy.success_count, 1);
    assert_eq!(messenger.sent_count(), 1);
}

#[tokio::test]
async fn test_unreachable_store_fails_whole_run() {
    let store = Arc::new(MemoryStore::default());
    store
        .fail_scan
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let messenger = Arc::new(MockMessenger::default());
    let checker = test_checker(store, messenger);

    assert!(checker.run_check(threshold()).await.is_err());
}

#[tokio::test]
async fn test_stationary_user_with_old_active_state_is_alerted() {
    // Stationary readings keep arriving, but the active clock expired
    let store = Arc::new(MemoryStore::default());
    let mut record = ActivityRecord::new("u1");
    record.record_sample(ActivitySample {
        timestamp: Utc::now() - Duration::hours(30),
        location: None,
        motion_status: MotionStatus::Walking,
    });
    record.record_sample(ActivitySample {
        timestamp: Utc::now() - Duration::hours(1),
        location: None,
        motion_status: MotionStatus::Stationary,
    });
    store.add_record(record);
    store.add_user("u1", "Alex");
    store.add_recipient(recipient("r1", "u1", "+15550000001"));
    let messenger = Arc::new(MockMessenger::default());
    let checker = test_checker(store, messenger.clone());

    let report = checker.run_check(threshold()).await.unwrap();
    assert_eq!(report.total_successful, 1);
}
