// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Alive-Tracker: inactivity monitoring with emergency contact alerts
//!
//! This crate provides the backend API for recording activity check-ins
//! and notifying designated emergency contacts when a user goes quiet
//! for longer than the configured threshold.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{InactivityChecker, MessagingProvider};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub messaging: Arc<dyn MessagingProvider>,
    pub checker: InactivityChecker,
}
