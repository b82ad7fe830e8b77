use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "resume_status", rename_all = "lowercase")]
pub enum ResumeStatus {
    New,
    Reviewing,
    Assigned,
    Shortlisted,
    Rejected,
}

/// Candidate resume record. `uploaded_by` is fixed at creation; `assigned_to`
/// may change over the record's life. Status is not auto-synced when the
/// assignment changes, except that the assign operation sets `Assigned`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub file_key: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: ResumeStatus,
    pub uploaded_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
