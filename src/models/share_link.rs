use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Current state of a share link. Never stored: always derived from
/// `revoked` and `expires_at` at read time, so there is no sweep job to
/// race against a concurrent revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareLinkState {
    Active,
    Expired,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShareLink {
    pub id: Uuid,
    pub token: String,
    pub resume_id: Uuid,
    pub created_by: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl ShareLink {
    /// Revocation wins over expiry so a revoked link stays revoked even
    /// while its `expires_at` is still in the future.
    pub fn state_at(&self, now: DateTime<Utc>) -> ShareLinkState {
        if self.revoked {
            ShareLinkState::Revoked
        } else if now > self.expires_at {
            ShareLinkState::Expired
        } else {
            ShareLinkState::Active
        }
    }
}
