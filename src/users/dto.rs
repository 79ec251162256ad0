use serde::{Deserialize, Serialize};

use crate::users::repo_types::{UserId, UserRecord};

/// Request body for `POST /user`.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

/// Request body for `PATCH /user/{id}`; absent fields are left untouched.
#[derive(Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub admin: Option<bool>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.admin.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedUserResponse {
    pub id: UserId,
}

/// User as shown to API callers, without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub admin: bool,
}

impl From<&UserRecord> for PublicUser {
    fn from(r: &UserRecord) -> Self {
        Self {
            id: r.id,
            email: r.email.clone(),
            username: r.username.clone(),
            admin: r.admin,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserPage {
    pub users: Vec<PublicUser>,
    pub page_number: usize,
    pub limit: usize,
    pub pages_amount: usize,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_limit() -> usize {
    30
}

fn default_page() -> usize {
    1
}
