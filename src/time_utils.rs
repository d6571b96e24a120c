// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a timestamp for SMS bodies, e.g. "Sunday, March 1 at 9:05 AM".
pub fn format_message_timestamp(date: DateTime<Utc>) -> String {
    let hour = date.format("%I").to_string();
    let hour = hour.trim_start_matches('0');
    let day = date.format("%e").to_string();
    format!(
        "{}, {} {} at {}:{} {}",
        date.format("%A"),
        date.format("%B"),
        day.trim(),
        hour,
        date.format("%M"),
        date.format("%p"),
    )
}
