pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod storage;
pub mod store;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::{
    resume_service::ResumeService, share_service::ShareLinkService, user_service::UserService,
};
use crate::storage::local::LocalStorage;
use crate::storage::StorageBackend;
use crate::store::postgres::{PgResumeStore, PgShareLinkStore, PgUserStore};
use crate::store::{ResumeStore, ShareLinkStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub resume_service: ResumeService,
    pub share_service: ShareLinkService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
        let resumes: Arc<dyn ResumeStore> = Arc::new(PgResumeStore::new(pool.clone()));
        let links: Arc<dyn ShareLinkStore> = Arc::new(PgShareLinkStore::new(pool));
        let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
            config.uploads_dir.clone(),
            config.app_base_url.clone(),
            config.file_url_secret.clone(),
        ));
        Self::with_parts(users, resumes, links, storage)
    }

    /// Wires the services against arbitrary store and storage implementations.
    /// Production uses Postgres-backed stores; tests pass in-memory doubles.
    pub fn with_parts(
        users: Arc<dyn UserStore>,
        resumes: Arc<dyn ResumeStore>,
        links: Arc<dyn ShareLinkStore>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        Self {
            user_service: UserService::new(users.clone()),
            resume_service: ResumeService::new(resumes.clone(), users.clone(), storage.clone()),
            share_service: ShareLinkService::new(links, resumes, users, storage),
        }
    }
}
