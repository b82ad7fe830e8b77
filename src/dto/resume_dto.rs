use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::resume::{Resume, ResumeStatus};

use super::user_dto::UserSummary;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeListQuery {
    pub q: Option<String>,
    pub status: Option<ResumeStatus>,
    /// Username of the assignee to filter on.
    pub assigned_to: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateResumePayload {
    pub status: Option<ResumeStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignResumePayload {
    #[validate(length(min = 1))]
    pub username: String,
}

/// Resume as shown to authenticated staff. The raw storage key stays
/// internal; files are reached through the URL endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeDetail {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub status: ResumeStatus,
    pub uploaded_by: Option<UserSummary>,
    pub assigned_to: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

impl ResumeDetail {
    pub fn new(
        resume: Resume,
        uploaded_by: Option<UserSummary>,
        assigned_to: Option<UserSummary>,
    ) -> Self {
        Self {
            id: resume.id,
            name: resume.name,
            email: resume.email,
            phone: resume.phone,
            skills: resume.skills,
            notes: resume.notes,
            file_name: resume.file_name,
            file_size: resume.file_size,
            mime_type: resume.mime_type,
            status: resume.status,
            uploaded_by,
            assigned_to,
            created_at: resume.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeDetail>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileUrlResponse {
    pub url: String,
    pub file_name: String,
    pub mime_type: String,
}
