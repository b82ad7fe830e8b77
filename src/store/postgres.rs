use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::error::Result;
use crate::models::resume::Resume;
use crate::models::share_link::ShareLink;
use crate::models::user::User;
use crate::policy::ListScope;

use super::{
    NewResume, NewShareLink, NewUser, Page, ResumeFilter, ResumeStore, ResumeUpdate,
    ShareLinkStore, UserFilter, UserProfileUpdate, UserStore,
};

const USER_COLUMNS: &str = "id, username, full_name, phone, role, password_hash, created_at";
const RESUME_COLUMNS: &str = "id, name, email, phone, skills, notes, file_key, file_name, \
                              file_size, mime_type, status, uploaded_by, assigned_to, created_at";
const SHARE_LINK_COLUMNS: &str = "id, token, resume_id, created_by, expires_at, revoked, created_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (username, full_name, phone, role, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user.username)
            .bind(user.full_name)
            .bind(user.phone)
            .bind(user.role)
            .bind(user.password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update(&self, id: Uuid, update: UserProfileUpdate) -> Result<User> {
        let sql = format!(
            "UPDATE users
             SET full_name = COALESCE($1, full_name),
                 phone = COALESCE($2, phone),
                 role = COALESCE($3, role)
             WHERE id = $4
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(update.full_name)
            .bind(update.phone)
            .bind(update.role)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE TRUE"));
        if let Some(q) = filter.q {
            let pattern = format!("%{}%", q);
            qb.push(" AND (username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR phone ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(role) = filter.role {
            qb.push(" AND role = ").push_bind(role);
        }
        qb.push(" ORDER BY created_at DESC");
        let users = qb.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }
}

#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_resume_filter(qb: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &ResumeFilter) {
    if let Some(q) = &filter.q {
        let pattern = format!("%{}%", q);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR notes ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(assigned_to) = filter.assigned_to {
        qb.push(" AND assigned_to = ").push_bind(assigned_to);
    }
    match filter.scope {
        ListScope::All => {}
        ListScope::Recruiter(id) => {
            qb.push(" AND (assigned_to = ")
                .push_bind(id)
                .push(" OR (uploaded_by = ")
                .push_bind(id)
                .push(" AND assigned_to IS NULL))");
        }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert(&self, resume: NewResume) -> Result<Resume> {
        let sql = format!(
            "INSERT INTO resumes
                 (name, email, phone, skills, notes, file_key, file_name,
                  file_size, mime_type, uploaded_by, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'new')
             RETURNING {RESUME_COLUMNS}"
        );
        let resume = sqlx::query_as::<_, Resume>(&sql)
            .bind(resume.name)
            .bind(resume.email)
            .bind(resume.phone)
            .bind(resume.skills)
            .bind(resume.notes)
            .bind(resume.file_key)
            .bind(resume.file_name)
            .bind(resume.file_size)
            .bind(resume.mime_type)
            .bind(resume.uploaded_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(resume)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Resume>> {
        let sql = format!("SELECT {RESUME_COLUMNS} FROM resumes WHERE id = $1");
        let resume = sqlx::query_as::<_, Resume>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(resume)
    }

    async fn update(&self, id: Uuid, update: ResumeUpdate) -> Result<Resume> {
        let sql = format!(
            "UPDATE resumes
             SET status = COALESCE($1, status),
                 notes = COALESCE($2, notes)
             WHERE id = $3
             RETURNING {RESUME_COLUMNS}"
        );
        let resume = sqlx::query_as::<_, Resume>(&sql)
            .bind(update.status)
            .bind(update.notes)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(resume)
    }

    async fn assign(&self, id: Uuid, assignee: Uuid) -> Result<Resume> {
        let sql = format!(
            "UPDATE resumes
             SET assigned_to = $1, status = 'assigned'
             WHERE id = $2
             RETURNING {RESUME_COLUMNS}"
        );
        let resume = sqlx::query_as::<_, Resume>(&sql)
            .bind(assignee)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(resume)
    }

    async fn list(&self, filter: &ResumeFilter, page: Page) -> Result<(Vec<Resume>, i64)> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {RESUME_COLUMNS} FROM resumes WHERE TRUE"));
        push_resume_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let resumes = qb.build_query_as::<Resume>().fetch_all(&self.pool).await?;

        let mut count_qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM resumes WHERE TRUE");
        push_resume_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((resumes, total))
    }
}

#[derive(Clone)]
pub struct PgShareLinkStore {
    pool: PgPool,
}

impl PgShareLinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareLinkStore for PgShareLinkStore {
    async fn insert(&self, link: NewShareLink) -> Result<ShareLink> {
        let sql = format!(
            "INSERT INTO share_links (token, resume_id, created_by, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {SHARE_LINK_COLUMNS}"
        );
        let link = sqlx::query_as::<_, ShareLink>(&sql)
            .bind(link.token)
            .bind(link.resume_id)
            .bind(link.created_by)
            .bind(link.expires_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(link)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ShareLink>> {
        let sql = format!("SELECT {SHARE_LINK_COLUMNS} FROM share_links WHERE id = $1");
        let link = sqlx::query_as::<_, ShareLink>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(link)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<ShareLink>> {
        let sql = format!("SELECT {SHARE_LINK_COLUMNS} FROM share_links WHERE token = $1");
        let link = sqlx::query_as::<_, ShareLink>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(link)
    }

    async fn revoke(&self, id: Uuid) -> Result<ShareLink> {
        // revoked only ever moves false -> true, so a repeat is a no-op.
        let sql = format!(
            "UPDATE share_links SET revoked = TRUE WHERE id = $1 RETURNING {SHARE_LINK_COLUMNS}"
        );
        let link = sqlx::query_as::<_, ShareLink>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(link)
    }

    async fn list_for_resume(&self, resume_id: Uuid) -> Result<Vec<ShareLink>> {
        let sql = format!(
            "SELECT {SHARE_LINK_COLUMNS} FROM share_links
             WHERE resume_id = $1
             ORDER BY created_at DESC"
        );
        let links = sqlx::query_as::<_, ShareLink>(&sql)
            .bind(resume_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(links)
    }
}
