use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{Role, User};

/// Minimal user reference embedded in resume and share-link payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(length(max = 120))]
    pub full_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    #[validate(length(min = 6))]
    pub password: String,
}

fn default_role() -> Role {
    Role::Recruiter
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(length(max = 120))]
    pub full_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListQuery {
    pub q: Option<String>,
    pub role: Option<Role>,
}
