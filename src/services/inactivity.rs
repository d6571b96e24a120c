// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Inactivity classification.
//!
//! Pure decision functions over a user's activity record. The preferred
//! signal is `last_active_state`: it is monotonic, so intervening
//! stationary readings do not reset the activity clock but a later active
//! reading does. Records written before `last_active_state` existed fall
//! back to the newest sample.

use crate::models::ActivityRecord;
use chrono::{DateTime, Duration, Utc};

/// How many of the newest samples the fallback rule inspects for active
/// motion when `last_active_state` is absent.
const RECENT_SAMPLE_GUARD: usize = 3;

/// Decide whether a user is inactive at `now` given the threshold.
///
/// Priority order:
/// 1. Never checked in (no samples, no `last_active_state`) -> inactive.
/// 2. `last_active_state` present -> inactive iff its age exceeds the
///    threshold. The boundary is exclusive: exactly-at-threshold is active.
/// 3. Otherwise judge by the newest sample; if it is stale, active motion
///    in any of the 3 newest samples still counts as active (the newest
///    sample may itself be a low-signal stationary read).
pub fn is_inactive(record: &ActivityRecord, now: DateTime<Utc>, threshold: Duration) -> bool {
    if let Some(last_active) = &record.last_active_state {
        return now - last_active.timestamp > threshold;
    }

    let Some(newest) = record.newest_sample() else {
        // Never checked in
        return true;
    };

    if now - newest.timestamp <= threshold {
        return false;
    }

    !record
        .activities
        .iter()
        .take(RECENT_SAMPLE_GUARD)
        .any(|sample| sample.motion_status.is_active())
}

/// The timestamp identifying the current inactivity episode.
///
/// Two observations of the same user belong to the same episode iff this
/// value is unchanged. Prefers `last_active_state`, falling back to the
/// newest sample; `None` for users who never checked in.
pub fn episode_marker(record: &ActivityRecord) -> Option<DateTime<Utc>> {
    record
        .last_active_state
        .as_ref()
        .map(|sample| sample.timestamp)
        .or_else(|| record.newest_sample().map(|sample| sample.timestamp))
}
