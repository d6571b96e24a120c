// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.
//!
//! Check-in recording and recipient management. These handlers are thin
//! persistence pass-throughs; the decision logic lives in `services`.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ActivitySample, GeoPoint, MotionStatus, Recipient};
use crate::services::notifier::format_explanation_message;
use crate::services::stores::{ActivityStore, UserDirectory};
use crate::services::twilio::MessagingProvider;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activity", post(record_activity).get(get_activity))
        .route("/api/recipients", get(get_recipients).post(create_recipient))
        .route(
            "/api/recipients/{id}",
            get(get_recipient).delete(delete_recipient),
        )
        .route(
            "/api/recipients/{id}/send-explanation",
            post(send_explanation),
        )
}

// ─── Activity Check-Ins ──────────────────────────────────────

/// Check-in request body. `location` uses the "lat,lng" wire format.
#[derive(Deserialize)]
struct CreateActivityRequest {
    location: String,
    motion_status: MotionStatus,
}

/// Parse a "lat,lng" location string into coordinates.
fn parse_location(raw: &str) -> Result<GeoPoint> {
    let invalid = || {
        AppError::BadRequest(
            "Invalid location format. Expected format: \"latitude,longitude\"".to_string(),
        )
    };

    let (lat, lng) = raw.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(invalid());
    }

    Ok(GeoPoint { lat, lng })
}

/// Record a check-in for the current user.
async fn record_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateActivityRequest>,
) -> Result<Json<ActivitySample>> {
    let location = parse_location(&payload.location)?;

    let sample = ActivitySample {
        timestamp: chrono::Utc::now(),
        location: Some(location),
        motion_status: payload.motion_status,
    };

    state.db.append_activity(&user.user_id, sample.clone()).await?;

    tracing::debug!(user_id = %user.user_id, "Check-in recorded");
    Ok(Json(sample))
}

/// Get the current user's recent check-ins (newest first).
async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ActivitySample>>> {
    let activities = state
        .db
        .activity_record(&user.user_id)
        .await?
        .map(|record| record.activities)
        .unwrap_or_default();

    Ok(Json(activities))
}

// ─── Recipients ──────────────────────────────────────────────

/// New recipient request body.
#[derive(Deserialize, Validate)]
struct CreateRecipientRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(length(min = 7, max = 20))]
    phone_number: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    email: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    relationship: String,
}

/// List the current user's recipients.
async fn get_recipients(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Recipient>>> {
    let recipients = state.db.get_recipients(&user.user_id).await?;
    Ok(Json(recipients))
}

/// Register a new recipient for the current user.
async fn create_recipient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateRecipientRequest>,
) -> Result<(StatusCode, Json<Recipient>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let now = chrono::Utc::now();
    let recipient = Recipient {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.user_id.clone(),
        name: payload.name,
        phone_number: payload.phone_number,
        email: payload.email,
        relationship: payload.relationship,
        last_notified_episode: None,
        last_notified_at: None,
        explanation_sent_at: None,
        created_at: now,
        updated_at: now,
    };

    state.db.set_recipient(&recipient).await?;

    tracing::info!(
        user_id = %user.user_id,
        recipient_id = %recipient.id,
        "Recipient created"
    );
    Ok((StatusCode::CREATED, Json(recipient)))
}

/// Load a recipient and verify it belongs to the current user.
async fn load_owned_recipient(
    state: &AppState,
    user: &AuthUser,
    recipient_id: &str,
) -> Result<Recipient> {
    let recipient = state
        .db
        .get_recipient(recipient_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipient not found".to_string()))?;

    if recipient.user_id != user.user_id {
        return Err(AppError::Forbidden(
            "Recipient belongs to another user".to_string(),
        ));
    }

    Ok(recipient)
}

/// Get a single recipient.
async fn get_recipient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(recipient_id): Path<String>,
) -> Result<Json<Recipient>> {
    let recipient = load_owned_recipient(&state, &user, &recipient_id).await?;
    Ok(Json(recipient))
}

/// Delete a recipient.
async fn delete_recipient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(recipient_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    load_owned_recipient(&state, &user, &recipient_id).await?;
    state.db.delete_recipient(&recipient_id).await?;

    tracing::info!(
        user_id = %user.user_id,
        recipient_id = %recipient_id,
        "Recipient deleted"
    );
    Ok(Json(serde_json::json!({
        "message": "Recipient deleted successfully"
    })))
}

/// Send the "you are an emergency contact" explanation SMS.
async fn send_explanation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(recipient_id): Path<String>,
) -> Result<Json<Recipient>> {
    let recipient = load_owned_recipient(&state, &user, &recipient_id).await?;

    let user_name = state.db.display_name(&user.user_id).await?;
    let message = format_explanation_message(&user_name, &recipient.name);

    state
        .messaging
        .send(&recipient.phone_number, &message)
        .await?;

    let updated = state
        .db
        .mark_explanation_sent(&recipient.id, chrono::Utc::now())
        .await?;

    tracing::info!(
        user_id = %user.user_id,
        recipient_id = %recipient.id,
        "Explanation message sent"
    );
    Ok(Json(updated))
}
