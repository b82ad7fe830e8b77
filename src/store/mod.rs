//! Persistence ports. Services depend on these traits rather than on a
//! pool so the whole API surface can run against [`memory::MemoryStore`]
//! in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::resume::{Resume, ResumeStatus};
use crate::models::share_link::ShareLink;
use crate::models::user::{Role, User};
use crate::policy::ListScope;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub q: Option<String>,
    pub role: Option<Role>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username is already taken.
    async fn insert(&self, user: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn update(&self, id: Uuid, update: UserProfileUpdate) -> Result<User>;
    async fn list(&self, filter: UserFilter) -> Result<Vec<User>>;
}

#[derive(Debug, Clone)]
pub struct NewResume {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub file_key: String,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_by: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct ResumeUpdate {
    pub status: Option<ResumeStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResumeFilter {
    pub q: Option<String>,
    pub status: Option<ResumeStatus>,
    pub assigned_to: Option<Uuid>,
    pub scope: ListScope,
}

#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn insert(&self, resume: NewResume) -> Result<Resume>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Resume>>;
    async fn update(&self, id: Uuid, update: ResumeUpdate) -> Result<Resume>;
    /// Sets the assignee and moves the status to `Assigned`. Concurrent
    /// assigns race with last-write-wins semantics.
    async fn assign(&self, id: Uuid, assignee: Uuid) -> Result<Resume>;
    /// Returns the requested page, newest first, plus the total match count.
    async fn list(&self, filter: &ResumeFilter, page: Page) -> Result<(Vec<Resume>, i64)>;
}

#[derive(Debug, Clone)]
pub struct NewShareLink {
    pub token: String,
    pub resume_id: Uuid,
    pub created_by: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait ShareLinkStore: Send + Sync {
    /// Fails with `Conflict` on a token collision; tokens carry 128 bits of
    /// entropy so callers treat that as effectively unreachable.
    async fn insert(&self, link: NewShareLink) -> Result<ShareLink>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShareLink>>;
    async fn find_by_token(&self, token: &str) -> Result<Option<ShareLink>>;
    /// Idempotent: revoking an already-revoked link returns it unchanged.
    async fn revoke(&self, id: Uuid) -> Result<ShareLink>;
    /// All links for the resume, newest-created first, regardless of state.
    async fn list_for_resume(&self, resume_id: Uuid) -> Result<Vec<ShareLink>>;
}
