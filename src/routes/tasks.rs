// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task handler routes for scheduled inactivity checks.
//!
//! These endpoints are called by Cloud Scheduler, not directly by users.

use crate::config;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

/// Task handler routes (called by Cloud Scheduler).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/check-activity", post(check_activity))
}

/// Run one inactivity check over all users and report the results.
async fn check_activity(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Response {
    // Security Check: Ensure request comes from the scheduler queue.
    // Cloud Run strips this header from external requests, so its presence
    // guarantees internal origin.
    let queue_name_header = headers.get("x-cloudtasks-queuename");
    let is_valid_queue = queue_name_header
        .and_then(|h| h.to_str().ok())
        .map(|name| name == config::CHECK_QUEUE_NAME)
        .unwrap_or(false);

    if !is_valid_queue {
        tracing::warn!(
            header = ?queue_name_header,
            "Security Alert: Blocked unauthorized access to check_activity"
        );
        return StatusCode::FORBIDDEN.into_response();
    }

    let threshold = chrono::Duration::hours(state.config.inactivity_threshold_hours);
    tracing::info!(
        threshold_hours = state.config.inactivity_threshold_hours,
        "Running inactivity check from scheduler"
    );

    match state.checker.run_check(threshold).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Inactivity check failed");
            // Return 500 to trigger scheduler retry
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
