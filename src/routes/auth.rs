// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes.
//!
//! Identity verification itself lives with the upstream identity
//! provider; it signs a short-lived assertion with the shared session
//! key, and this endpoint exchanges it for a long-lived session token.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, Claims, SESSION_COOKIE};
use crate::AppState;
use axum::{
    extract::State,
    http::header,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/session", post(create_session))
}

/// Session creation response.
#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
}

/// Exchange a bearer identity assertion for a session token + cookie.
async fn create_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let assertion = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let token_data =
        decode::<Claims>(assertion, &key, &validation).map_err(|_| AppError::InvalidToken)?;

    let user_id = token_data.claims.sub;
    if user_id.is_empty() {
        return Err(AppError::InvalidToken);
    }

    let jwt = create_jwt(&user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = %user_id, "Session created");

    let cookie = Cookie::build((SESSION_COOKIE, jwt.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Json(SessionResponse { token: jwt })))
}
