use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::share_link::ShareLinkState;

use super::user_dto::UserSummary;

/// Bounds on link lifetime: at least one minute, at most seven days.
/// Enforced in the share service, where the default is also applied.
pub const MIN_EXPIRES_MINUTES: i64 = 1;
pub const MAX_EXPIRES_MINUTES: i64 = 10_080;
pub const DEFAULT_EXPIRES_MINUTES: i64 = 1_440;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateShareLinkPayload {
    pub expires_in_minutes: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareLinkResponse {
    pub id: Uuid,
    pub token: String,
    pub url: String,
    pub state: ShareLinkState,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareLinkListResponse {
    pub share_links: Vec<ShareLinkResponse>,
}

/// Public-safe projection served to anonymous share-link viewers. No
/// storage key, no status, no assignment details.
#[derive(Debug, Clone, Serialize)]
pub struct SharedResumeView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub uploaded_by: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareLinkMeta {
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SharedResumeResponse {
    pub resume: SharedResumeView,
    pub file_url: String,
    pub share_link: ShareLinkMeta,
}
