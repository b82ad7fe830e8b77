use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::dto::share_dto::{
    CreateShareLinkPayload, ShareLinkListResponse, ShareLinkMeta, ShareLinkResponse,
    SharedResumeResponse, SharedResumeView, DEFAULT_EXPIRES_MINUTES, MAX_EXPIRES_MINUTES,
    MIN_EXPIRES_MINUTES,
};
use crate::dto::user_dto::UserSummary;
use crate::error::{Error, Result};
use crate::models::resume::Resume;
use crate::models::share_link::{ShareLink, ShareLinkState};
use crate::models::user::User;
use crate::policy;
use crate::storage::StorageBackend;
use crate::store::{NewShareLink, ResumeStore, ShareLinkStore, UserStore};
use crate::utils::token::generate_share_token;

#[derive(Clone)]
pub struct ShareLinkService {
    links: Arc<dyn ShareLinkStore>,
    resumes: Arc<dyn ResumeStore>,
    users: Arc<dyn UserStore>,
    storage: Arc<dyn StorageBackend>,
}

impl ShareLinkService {
    pub fn new(
        links: Arc<dyn ShareLinkStore>,
        resumes: Arc<dyn ResumeStore>,
        users: Arc<dyn UserStore>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            links,
            resumes,
            users,
            storage,
        }
    }

    pub async fn create(
        &self,
        actor: &User,
        resume_id: Uuid,
        payload: CreateShareLinkPayload,
    ) -> Result<ShareLinkResponse> {
        let resume = self.fetch_resume(resume_id).await?;
        if !policy::can_share(actor, &resume) {
            return Err(Error::Forbidden(
                "You can only share resumes assigned to you".to_string(),
            ));
        }
        let minutes = payload.expires_in_minutes.unwrap_or(DEFAULT_EXPIRES_MINUTES);
        if !(MIN_EXPIRES_MINUTES..=MAX_EXPIRES_MINUTES).contains(&minutes) {
            return Err(Error::BadRequest(format!(
                "expires_in_minutes must be between {} and {}",
                MIN_EXPIRES_MINUTES, MAX_EXPIRES_MINUTES
            )));
        }
        let link = self
            .links
            .insert(NewShareLink {
                token: generate_share_token(),
                resume_id,
                created_by: actor.id,
                expires_at: Utc::now() + Duration::minutes(minutes),
            })
            .await?;
        info!(resume_id = %resume_id, share_link_id = %link.id, "share link created");
        Ok(self.link_response(link, Some(UserSummary::from(actor))))
    }

    /// Public entry point: no authenticated actor, only the token. Unknown
    /// tokens are NotFound; revoked links are Gone before expiry is even
    /// looked at; expired links are Gone.
    pub async fn resolve(&self, token: &str) -> Result<SharedResumeResponse> {
        let link = self
            .links
            .find_by_token(token)
            .await?
            .ok_or_else(|| Error::NotFound("Share link not found".to_string()))?;
        match link.state_at(Utc::now()) {
            ShareLinkState::Revoked => {
                return Err(Error::Gone("Share link has been revoked".to_string()))
            }
            ShareLinkState::Expired => {
                return Err(Error::Gone("Share link has expired".to_string()))
            }
            ShareLinkState::Active => {}
        }
        let resume = self.fetch_resume(link.resume_id).await?;
        let uploaded_by = self
            .users
            .find_by_id(resume.uploaded_by)
            .await?
            .as_ref()
            .map(UserSummary::from);
        // A fresh retrievable URL each time; nothing is cached on the link.
        let file_url = self
            .storage
            .resolve_url(&resume.file_key, Some(crate::storage::DEFAULT_URL_TTL_SECONDS))
            .await?;
        Ok(SharedResumeResponse {
            resume: public_view(resume, uploaded_by),
            file_url,
            share_link: ShareLinkMeta {
                expires_at: link.expires_at,
                created_at: link.created_at,
            },
        })
    }

    /// Idempotent: a second revoke returns the same terminal state.
    pub async fn revoke(&self, actor: &User, link_id: Uuid) -> Result<ShareLinkResponse> {
        let link = self
            .links
            .find_by_id(link_id)
            .await?
            .ok_or_else(|| Error::NotFound("Share link not found".to_string()))?;
        let resume = self.fetch_resume(link.resume_id).await?;
        if !policy::can_revoke_share(actor, &link, &resume) {
            return Err(Error::Forbidden("Access denied".to_string()));
        }
        let revoked = self.links.revoke(link_id).await?;
        info!(share_link_id = %link_id, "share link revoked");
        let created_by = self.creator_summary(&revoked).await?;
        Ok(self.link_response(revoked, created_by))
    }

    /// Viewing a resume's links takes the same right as creating one.
    pub async fn list(&self, actor: &User, resume_id: Uuid) -> Result<ShareLinkListResponse> {
        let resume = self.fetch_resume(resume_id).await?;
        if !policy::can_share(actor, &resume) {
            return Err(Error::Forbidden("Access denied".to_string()));
        }
        let links = self.links.list_for_resume(resume_id).await?;
        let mut share_links = Vec::with_capacity(links.len());
        for link in links {
            let created_by = self.creator_summary(&link).await?;
            share_links.push(self.link_response(link, created_by));
        }
        Ok(ShareLinkListResponse { share_links })
    }

    async fn fetch_resume(&self, id: Uuid) -> Result<Resume> {
        self.resumes
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("Resume not found".to_string()))
    }

    async fn creator_summary(&self, link: &ShareLink) -> Result<Option<UserSummary>> {
        Ok(self
            .users
            .find_by_id(link.created_by)
            .await?
            .as_ref()
            .map(UserSummary::from))
    }

    fn link_response(&self, link: ShareLink, created_by: Option<UserSummary>) -> ShareLinkResponse {
        let config = crate::config::get_config();
        let url = format!(
            "{}/s/{}",
            config.app_base_url.trim_end_matches('/'),
            link.token
        );
        let state = link.state_at(Utc::now());
        ShareLinkResponse {
            id: link.id,
            token: link.token,
            url,
            state,
            expires_at: link.expires_at,
            revoked: link.revoked,
            created_at: link.created_at,
            created_by,
        }
    }
}

fn public_view(resume: Resume, uploaded_by: Option<UserSummary>) -> SharedResumeView {
    SharedResumeView {
        id: resume.id,
        name: resume.name,
        email: resume.email,
        phone: resume.phone,
        skills: resume.skills,
        notes: resume.notes,
        file_name: resume.file_name,
        file_size: resume.file_size,
        mime_type: resume.mime_type,
        created_at: resume.created_at,
        uploaded_by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::storage::MockStorageBackend;
    use crate::store::memory::MemoryStore;
    use crate::store::{NewResume, NewUser};

    fn init_test_config() {
        std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        std::env::set_var("DATABASE_URL", "postgres://unused/unused");
        std::env::set_var("JWT_SECRET", "test_secret_key");
        std::env::set_var("APP_BASE_URL", "http://localhost:8080");
        std::env::set_var("FILE_URL_SECRET", "file_secret");
        std::env::set_var("API_RPS", "100");
        std::env::set_var("PUBLIC_RPS", "100");
        let _ = crate::config::init_config();
    }

    struct Fixture {
        service: ShareLinkService,
        store: Arc<MemoryStore>,
        admin: User,
        recruiter: User,
        resume_id: Uuid,
    }

    async fn fixture(storage: MockStorageBackend) -> Fixture {
        init_test_config();
        let store = Arc::new(MemoryStore::new());
        let admin = UserStore::insert(
            store.as_ref(),
            NewUser {
                username: "admin".into(),
                full_name: Some("Admin".into()),
                phone: None,
                role: Role::Admin,
                password_hash: String::new(),
            },
        )
        .await
        .unwrap();
        let recruiter = UserStore::insert(
            store.as_ref(),
            NewUser {
                username: "rec".into(),
                full_name: None,
                phone: None,
                role: Role::Recruiter,
                password_hash: String::new(),
            },
        )
        .await
        .unwrap();
        let resume = ResumeStore::insert(
            store.as_ref(),
            NewResume {
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                phone: None,
                skills: vec!["rust".into()],
                notes: None,
                file_key: "resumes/JANE_DOE_1_aa.pdf".into(),
                file_name: "cv.pdf".into(),
                file_size: 12,
                mime_type: "application/pdf".into(),
                uploaded_by: admin.id,
            },
        )
        .await
        .unwrap();
        let service = ShareLinkService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(storage),
        );
        Fixture {
            service,
            store,
            admin,
            recruiter,
            resume_id: resume.id,
        }
    }

    fn expires(minutes: i64) -> CreateShareLinkPayload {
        CreateShareLinkPayload {
            expires_in_minutes: Some(minutes),
        }
    }

    #[tokio::test]
    async fn create_defaults_to_24_hours() {
        let f = fixture(MockStorageBackend::new()).await;
        let link = f
            .service
            .create(&f.admin, f.resume_id, CreateShareLinkPayload::default())
            .await
            .unwrap();
        let minutes = (link.expires_at - Utc::now()).num_minutes();
        assert!((1438..=1440).contains(&minutes));
        assert_eq!(link.state, ShareLinkState::Active);
        assert!(link.url.ends_with(&format!("/s/{}", link.token)));
    }

    #[tokio::test]
    async fn create_accepts_boundary_expiries() {
        let f = fixture(MockStorageBackend::new()).await;
        for minutes in [MIN_EXPIRES_MINUTES, MAX_EXPIRES_MINUTES] {
            let link = f
                .service
                .create(&f.admin, f.resume_id, expires(minutes))
                .await
                .unwrap();
            assert_eq!(link.state, ShareLinkState::Active);
        }
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_expiry() {
        let f = fixture(MockStorageBackend::new()).await;
        for minutes in [0, -5, MAX_EXPIRES_MINUTES + 1] {
            let err = f
                .service
                .create(&f.admin, f.resume_id, expires(minutes))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::BadRequest(_)), "minutes={}", minutes);
        }
    }

    #[tokio::test]
    async fn unrelated_recruiter_cannot_share_but_gets_not_found_for_absent_resume() {
        let f = fixture(MockStorageBackend::new()).await;
        let err = f
            .service
            .create(&f.recruiter, f.resume_id, expires(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        // Nonexistent resume: NotFound without ever reaching the permission check.
        let err = f
            .service
            .create(&f.recruiter, Uuid::new_v4(), expires(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_links_are_independent() {
        let mut storage = MockStorageBackend::new();
        storage
            .expect_resolve_url()
            .returning(|key, _| Ok(format!("http://files.test/{}", key)));
        let f = fixture(storage).await;
        let a = f.service.create(&f.admin, f.resume_id, expires(60)).await.unwrap();
        let b = f.service.create(&f.admin, f.resume_id, expires(60)).await.unwrap();
        assert_ne!(a.token, b.token);
        assert!(f.service.resolve(&a.token).await.is_ok());
        assert!(f.service.resolve(&b.token).await.is_ok());
        // Revoking one leaves the other resolvable.
        f.service.revoke(&f.admin, a.id).await.unwrap();
        assert!(matches!(
            f.service.resolve(&a.token).await.unwrap_err(),
            Error::Gone(_)
        ));
        assert!(f.service.resolve(&b.token).await.is_ok());
    }

    #[tokio::test]
    async fn resolve_generates_a_fresh_file_url_every_time() {
        let mut storage = MockStorageBackend::new();
        storage
            .expect_resolve_url()
            .times(2)
            .returning(|key, _| Ok(format!("http://files.test/{}", key)));
        let f = fixture(storage).await;
        let link = f.service.create(&f.admin, f.resume_id, expires(60)).await.unwrap();
        f.service.resolve(&link.token).await.unwrap();
        f.service.resolve(&link.token).await.unwrap();
    }

    #[tokio::test]
    async fn resolve_excludes_internal_fields() {
        let mut storage = MockStorageBackend::new();
        storage
            .expect_resolve_url()
            .returning(|_, _| Ok("http://files.test/x".to_string()));
        let f = fixture(storage).await;
        let link = f.service.create(&f.admin, f.resume_id, expires(60)).await.unwrap();
        let shared = f.service.resolve(&link.token).await.unwrap();
        let json = serde_json::to_value(&shared).unwrap();
        assert!(json["resume"].get("file_key").is_none());
        assert!(json["resume"].get("status").is_none());
        assert!(json["resume"].get("assigned_to").is_none());
        assert_eq!(json["resume"]["name"], "Jane Doe");
        assert_eq!(json["file_url"], "http://files.test/x");
    }

    #[tokio::test]
    async fn revoke_is_idempotent_and_creator_scoped() {
        let f = fixture(MockStorageBackend::new()).await;
        let link = f.service.create(&f.admin, f.resume_id, expires(60)).await.unwrap();
        let first = f.service.revoke(&f.admin, link.id).await.unwrap();
        let second = f.service.revoke(&f.admin, link.id).await.unwrap();
        assert!(first.revoked && second.revoked);
        assert_eq!(second.state, ShareLinkState::Revoked);
        // A recruiter with no relation to resume or link cannot revoke.
        let err = f.service.revoke(&f.recruiter, link.id).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn expired_link_is_gone_without_revocation() {
        let f = fixture(MockStorageBackend::new()).await;
        let link = ShareLinkStore::insert(
            f.store.as_ref(),
            NewShareLink {
                token: generate_share_token(),
                resume_id: f.resume_id,
                created_by: f.admin.id,
                expires_at: Utc::now() - Duration::minutes(1),
            },
        )
        .await
        .unwrap();
        let err = f.service.resolve(&link.token).await.unwrap_err();
        assert!(matches!(err, Error::Gone(_)));
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let f = fixture(MockStorageBackend::new()).await;
        let err = f.service.resolve("feedfacefeedfacefeedfacefeedface").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn list_orders_newest_first_with_computed_states() {
        let f = fixture(MockStorageBackend::new()).await;
        let older = f.service.create(&f.admin, f.resume_id, expires(60)).await.unwrap();
        let revoked = f.service.create(&f.admin, f.resume_id, expires(60)).await.unwrap();
        f.service.revoke(&f.admin, revoked.id).await.unwrap();
        let newest = f.service.create(&f.admin, f.resume_id, expires(60)).await.unwrap();

        let listing = f.service.list(&f.admin, f.resume_id).await.unwrap();
        let ids: Vec<Uuid> = listing.share_links.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![newest.id, revoked.id, older.id]);
        assert_eq!(listing.share_links[1].state, ShareLinkState::Revoked);
        assert_eq!(listing.share_links[0].state, ShareLinkState::Active);
        // Listing requires share rights.
        let err = f.service.list(&f.recruiter, f.resume_id).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }
}
