//! User profile domain type.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::UserId;

/// The backend's projection of the currently authenticated user.
///
/// Returned by `GET /user` when a valid API key is presented. Held only
/// in memory - the profile is never persisted, so a restart always
/// re-fetches it from the backend using the stored credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Backend user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Contact email address.
    pub email: String,
    /// Loyalty discount applied to this user's orders, in percent.
    pub discount_percent: i32,
    /// Lifetime number of completed orders.
    pub total_orders: i64,
    /// Stable public identifier.
    pub uuid: Uuid,
}
