// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity check-in models.
//!
//! A user's check-ins are stored as a single `ActivityRecord` document
//! holding the most recent samples plus the last sample that showed
//! active motion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Maximum number of samples retained per user (newest first).
pub const MAX_RECENT_SAMPLES: usize = 10;

/// Motion classification reported by the client at check-in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MotionStatus {
    Walking,
    Running,
    Moving,
    Stationary,
    Unknown,
    Active,
    Inactive,
}

impl MotionStatus {
    /// Whether this status counts as active motion.
    ///
    /// `Unknown` deliberately counts as active: a reading we cannot
    /// classify must not push a user toward an inactivity alert.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            MotionStatus::Walking
                | MotionStatus::Running
                | MotionStatus::Moving
                | MotionStatus::Unknown
                | MotionStatus::Active
        )
    }
}

/// Geographic coordinates attached to a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One recorded check-in. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitySample {
    /// When the check-in was recorded (server time)
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    /// Reported coordinates, if the client shared them
    pub location: Option<GeoPoint>,
    /// Motion classification at check-in time
    pub motion_status: MotionStatus,
}

/// Per-user activity document.
///
/// `activities` is newest-first and never longer than [`MAX_RECENT_SAMPLES`].
/// `last_active_state` is refreshed only by samples whose motion status is
/// active; a stationary reading never overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Owning user ID (also used as document ID)
    pub user_id: String,
    /// Recent samples, newest at index 0
    #[serde(default)]
    pub activities: Vec<ActivitySample>,
    /// Most recent sample with active motion, retained indefinitely
    #[serde(default)]
    pub last_active_state: Option<ActivitySample>,
}

impl ActivityRecord {
    /// Create an empty record for a user who has never checked in.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            activities: Vec::new(),
            last_active_state: None,
        }
    }

    /// Record a new check-in: prepend, trim to capacity, and refresh
    /// `last_active_state` when the sample shows active motion.
    pub fn record_sample(&mut self, sample: ActivitySample) {
        if sample.motion_status.is_active() {
            self.last_active_state = Some(sample.clone());
        }
        self.activities.insert(0, sample);
        self.activities.truncate(MAX_RECENT_SAMPLES);
    }

    /// The newest sample, if any.
    pub fn newest_sample(&self) -> Option<&ActivitySample> {
        self.activities.first()
    }
}
