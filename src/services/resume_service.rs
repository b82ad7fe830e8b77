use std::sync::Arc;

use bytes::Bytes;
use tracing::warn;
use uuid::Uuid;

use crate::dto::resume_dto::{
    FileUrlResponse, Pagination, ResumeDetail, ResumeListQuery, ResumeListResponse,
    UpdateResumePayload,
};
use crate::dto::user_dto::UserSummary;
use crate::error::{Error, Result};
use crate::models::resume::Resume;
use crate::models::user::User;
use crate::policy;
use crate::storage::StorageBackend;
use crate::store::{NewResume, Page, ResumeFilter, ResumeStore, ResumeUpdate, UserStore};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

#[derive(Clone)]
pub struct ResumeService {
    resumes: Arc<dyn ResumeStore>,
    users: Arc<dyn UserStore>,
    storage: Arc<dyn StorageBackend>,
}

impl ResumeService {
    pub fn new(
        resumes: Arc<dyn ResumeStore>,
        users: Arc<dyn UserStore>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            resumes,
            users,
            storage,
        }
    }

    pub async fn upload(&self, actor: &User, upload: ResumeUpload) -> Result<ResumeDetail> {
        let name = upload.name.trim().to_string();
        if name.len() < 2 {
            return Err(Error::BadRequest(
                "Candidate name is required (min 2 characters)".to_string(),
            ));
        }
        let file_key = self.storage.generate_key(&upload.file_name, Some(name.clone()));
        let file_size = upload.bytes.len() as i64;
        self.storage
            .save(&upload.bytes, &file_key, &upload.mime_type)
            .await?;
        // If the insert fails after the save, the file is orphaned on disk;
        // cleanup is a maintenance task, not a rollback here.
        let resume = self
            .resumes
            .insert(NewResume {
                name,
                email: upload.email.trim().to_string(),
                phone: upload.phone.filter(|p| !p.trim().is_empty()),
                skills: upload.skills,
                notes: upload.notes,
                file_key,
                file_name: upload.file_name,
                file_size,
                mime_type: upload.mime_type,
                uploaded_by: actor.id,
            })
            .await?;
        self.detail(resume).await
    }

    /// Existence is checked before permissions: unauthorized actors get the
    /// same NotFound as everyone else for absent ids, and Forbidden only
    /// once the resume is known to exist.
    pub async fn get(&self, actor: &User, id: Uuid) -> Result<ResumeDetail> {
        let resume = self.fetch(id).await?;
        if !policy::can_view(actor, &resume) {
            return Err(Error::Forbidden("Access denied".to_string()));
        }
        self.detail(resume).await
    }

    pub async fn list(&self, actor: &User, query: ResumeListQuery) -> Result<ResumeListResponse> {
        let assigned_to = match &query.assigned_to {
            // An unknown assignee username simply does not narrow the
            // listing, mirroring the lenient filter behavior of the UI.
            Some(username) => self
                .users
                .find_by_username(username)
                .await?
                .map(|u| u.id),
            None => None,
        };
        let filter = ResumeFilter {
            q: query.q.filter(|q| !q.trim().is_empty()),
            status: query.status,
            assigned_to,
            scope: policy::list_scope(actor),
        };
        let page = Page {
            page: query.page.unwrap_or(1).max(1),
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        };
        let (resumes, total) = self.resumes.list(&filter, page).await?;
        let mut details = Vec::with_capacity(resumes.len());
        for resume in resumes {
            details.push(self.detail(resume).await?);
        }
        Ok(ResumeListResponse {
            resumes: details,
            pagination: Pagination {
                page: page.page,
                limit: page.limit,
                total,
                total_pages: (total + page.limit - 1) / page.limit,
            },
        })
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateResumePayload,
    ) -> Result<ResumeDetail> {
        let resume = self.fetch(id).await?;
        if !policy::can_edit(actor, &resume) {
            return Err(Error::Forbidden(
                "You can only update resumes assigned to you".to_string(),
            ));
        }
        let updated = self
            .resumes
            .update(
                id,
                ResumeUpdate {
                    status: payload.status,
                    notes: payload.notes,
                },
            )
            .await?;
        self.detail(updated).await
    }

    pub async fn assign(&self, actor: &User, id: Uuid, username: &str) -> Result<ResumeDetail> {
        let resume = self.fetch(id).await?;
        if !policy::can_assign(actor, &resume) {
            return Err(Error::Forbidden("Admin access required".to_string()));
        }
        let assignee = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        let updated = self.resumes.assign(id, assignee.id).await?;
        self.detail(updated).await
    }

    pub async fn file_url(&self, actor: &User, id: Uuid) -> Result<FileUrlResponse> {
        let resume = self.fetch(id).await?;
        if !policy::can_view(actor, &resume) {
            return Err(Error::Forbidden("Access denied".to_string()));
        }
        let url = self.storage.resolve_url(&resume.file_key, None).await?;
        Ok(FileUrlResponse {
            url,
            file_name: resume.file_name,
            mime_type: resume.mime_type,
        })
    }

    async fn fetch(&self, id: Uuid) -> Result<Resume> {
        self.resumes
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Resume not found".to_string()))
    }

    async fn detail(&self, resume: Resume) -> Result<ResumeDetail> {
        let uploaded_by = self.summary(Some(resume.uploaded_by)).await?;
        let assigned_to = self.summary(resume.assigned_to).await?;
        Ok(ResumeDetail::new(resume, uploaded_by, assigned_to))
    }

    async fn summary(&self, id: Option<Uuid>) -> Result<Option<UserSummary>> {
        let Some(id) = id else {
            return Ok(None);
        };
        let user = self.users.find_by_id(id).await?;
        if user.is_none() {
            warn!(user_id = %id, "resume references a missing user");
        }
        Ok(user.as_ref().map(UserSummary::from))
    }
}
