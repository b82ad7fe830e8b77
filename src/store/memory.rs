//! In-memory store used as the test double for the persistence ports. It
//! mirrors the Postgres behavior that callers observe: unique constraints
//! surface as `Conflict`, missing rows as `NotFound`, listings come back
//! newest first.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::resume::{Resume, ResumeStatus};
use crate::models::share_link::ShareLink;
use crate::models::user::User;
use crate::policy::scope_matches;

use super::{
    NewResume, NewShareLink, NewUser, Page, ResumeFilter, ResumeStore, ResumeUpdate,
    ShareLinkStore, UserFilter, UserStore,
};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    resumes: Mutex<Vec<Resume>>,
    links: Mutex<Vec<ShareLink>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn newest_first<T, F: Fn(&T) -> chrono::DateTime<Utc>>(mut items: Vec<T>, created_at: F) -> Vec<T> {
    // Reverse before the stable sort so same-instant rows keep
    // insertion order, newest first.
    items.reverse();
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
    items
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(Error::Conflict("Username already exists".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update(&self, id: Uuid, update: super::UserProfileUpdate) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
        if let Some(full_name) = update.full_name {
            user.full_name = Some(full_name);
        }
        if let Some(phone) = update.phone {
            user.phone = Some(phone);
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        Ok(user.clone())
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>> {
        let users = self.users.lock().unwrap();
        let matches: Vec<User> = users
            .iter()
            .filter(|u| {
                if let Some(q) = &filter.q {
                    let hit = contains_ci(&u.username, q)
                        || u.full_name.as_deref().is_some_and(|n| contains_ci(n, q))
                        || u.phone.as_deref().is_some_and(|p| contains_ci(p, q));
                    if !hit {
                        return false;
                    }
                }
                filter.role.map_or(true, |r| u.role == r)
            })
            .cloned()
            .collect();
        Ok(newest_first(matches, |u| u.created_at))
    }
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn insert(&self, resume: NewResume) -> Result<Resume> {
        let mut resumes = self.resumes.lock().unwrap();
        if resumes.iter().any(|r| r.file_key == resume.file_key) {
            return Err(Error::Conflict("File key already exists".to_string()));
        }
        let resume = Resume {
            id: Uuid::new_v4(),
            name: resume.name,
            email: resume.email,
            phone: resume.phone,
            skills: resume.skills,
            notes: resume.notes,
            file_key: resume.file_key,
            file_name: resume.file_name,
            file_size: resume.file_size,
            mime_type: resume.mime_type,
            status: ResumeStatus::New,
            uploaded_by: resume.uploaded_by,
            assigned_to: None,
            created_at: Utc::now(),
        };
        resumes.push(resume.clone());
        Ok(resume)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Resume>> {
        Ok(self
            .resumes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update(&self, id: Uuid, update: ResumeUpdate) -> Result<Resume> {
        let mut resumes = self.resumes.lock().unwrap();
        let resume = resumes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound("Resume not found".to_string()))?;
        if let Some(status) = update.status {
            resume.status = status;
        }
        if let Some(notes) = update.notes {
            resume.notes = Some(notes);
        }
        Ok(resume.clone())
    }

    async fn assign(&self, id: Uuid, assignee: Uuid) -> Result<Resume> {
        let mut resumes = self.resumes.lock().unwrap();
        let resume = resumes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound("Resume not found".to_string()))?;
        resume.assigned_to = Some(assignee);
        resume.status = ResumeStatus::Assigned;
        Ok(resume.clone())
    }

    async fn list(&self, filter: &ResumeFilter, page: Page) -> Result<(Vec<Resume>, i64)> {
        let resumes = self.resumes.lock().unwrap();
        let matches: Vec<Resume> = resumes
            .iter()
            .filter(|r| {
                if let Some(q) = &filter.q {
                    let hit = contains_ci(&r.name, q)
                        || contains_ci(&r.email, q)
                        || r.notes.as_deref().is_some_and(|n| contains_ci(n, q));
                    if !hit {
                        return false;
                    }
                }
                if filter.status.is_some_and(|s| r.status != s) {
                    return false;
                }
                if filter.assigned_to.is_some_and(|a| r.assigned_to != Some(a)) {
                    return false;
                }
                scope_matches(filter.scope, r)
            })
            .cloned()
            .collect();
        let total = matches.len() as i64;
        let sorted = newest_first(matches, |r| r.created_at);
        let start = (page.offset().max(0) as usize).min(sorted.len());
        let end = (start + page.limit.max(0) as usize).min(sorted.len());
        Ok((sorted[start..end].to_vec(), total))
    }
}

#[async_trait]
impl ShareLinkStore for MemoryStore {
    async fn insert(&self, link: NewShareLink) -> Result<ShareLink> {
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.token == link.token) {
            return Err(Error::Conflict("Share token already exists".to_string()));
        }
        let link = ShareLink {
            id: Uuid::new_v4(),
            token: link.token,
            resume_id: link.resume_id,
            created_by: link.created_by,
            expires_at: link.expires_at,
            revoked: false,
            created_at: Utc::now(),
        };
        links.push(link.clone());
        Ok(link)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShareLink>> {
        Ok(self.links.lock().unwrap().iter().find(|l| l.id == id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ShareLink>> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.token == token)
            .cloned())
    }

    async fn revoke(&self, id: Uuid) -> Result<ShareLink> {
        let mut links = self.links.lock().unwrap();
        let link = links
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| Error::NotFound("Share link not found".to_string()))?;
        link.revoked = true;
        Ok(link.clone())
    }

    async fn list_for_resume(&self, resume_id: Uuid) -> Result<Vec<ShareLink>> {
        let links = self.links.lock().unwrap();
        let matches: Vec<ShareLink> = links
            .iter()
            .filter(|l| l.resume_id == resume_id)
            .cloned()
            .collect();
        Ok(newest_first(matches, |l| l.created_at))
    }
}
