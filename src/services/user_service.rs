use std::sync::Arc;

use uuid::Uuid;

use crate::dto::user_dto::{CreateUserPayload, UpdateUserPayload, UserListQuery};
use crate::error::{Error, Result};
use crate::models::user::{Role, User};
use crate::store::{NewUser, UserFilter, UserProfileUpdate, UserStore};
use crate::utils::crypto;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.users.find_by_id(id).await
    }

    /// The same error for unknown username and wrong password, so login
    /// probing cannot tell the two apart.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let invalid = || Error::Unauthorized("Invalid credentials".to_string());
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(invalid)?;
        if !crypto::verify_password(password, &user.password_hash) {
            return Err(invalid());
        }
        Ok(user)
    }

    /// First-run bootstrap: when no accounts exist at all, creates the
    /// configured admin so the instance can be logged into. A populated
    /// store makes this a no-op.
    pub async fn ensure_seed_admin(&self, username: &str, password: &str) -> Result<Option<User>> {
        if !self.users.list(UserFilter::default()).await?.is_empty() {
            return Ok(None);
        }
        let password_hash = crypto::hash_password(password)?;
        let admin = self
            .users
            .insert(NewUser {
                username: username.to_string(),
                full_name: Some("Administrator".to_string()),
                phone: None,
                role: Role::Admin,
                password_hash,
            })
            .await?;
        Ok(Some(admin))
    }

    pub async fn create(&self, actor: &User, payload: CreateUserPayload) -> Result<User> {
        if !actor.role.is_admin() {
            return Err(Error::Forbidden("Admin access required".to_string()));
        }
        let password_hash = crypto::hash_password(&payload.password)?;
        self.users
            .insert(NewUser {
                username: payload.username,
                full_name: payload.full_name,
                phone: payload.phone,
                role: payload.role,
                password_hash,
            })
            .await
    }

    pub async fn update(&self, actor: &User, id: Uuid, payload: UpdateUserPayload) -> Result<User> {
        if !actor.role.is_admin() {
            return Err(Error::Forbidden("Admin access required".to_string()));
        }
        self.users
            .update(
                id,
                UserProfileUpdate {
                    full_name: payload.full_name,
                    phone: payload.phone,
                    role: payload.role,
                },
            )
            .await
    }

    pub async fn list(&self, actor: &User, query: UserListQuery) -> Result<Vec<User>> {
        if !actor.role.is_admin() {
            return Err(Error::Forbidden("Admin access required".to_string()));
        }
        self.users
            .list(UserFilter {
                q: query.q,
                role: query.role,
            })
            .await
    }
}
