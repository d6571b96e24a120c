//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID)
    pub user_id: String,
    /// Display name shown in notification messages
    pub display_name: String,
    /// Email address (may be None if not shared)
    pub email: Option<String>,
    /// When the user first signed up
    pub created_at: DateTime<Utc>,
}
