use std::sync::Arc;

use axum::http::HeaderMap;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::auth::password::SaltedHasher;
use crate::auth::services::{authorize, AuthError, Principal};
use crate::config::AdminConfig;
use crate::users::dto::{CreateUserRequest, PublicUser, UpdateUserRequest, UserPage};
use crate::users::repo::{StoreError, UserStore};
use crate::users::repo_types::{UserChanges, UserId, UserRecord};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

fn invalid(msg: &str) -> ProfileError {
    ProfileError::Validation(msg.to_string())
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(raw: &str) -> Result<String, ProfileError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(invalid("email must not be empty"));
    }
    if !is_valid_email(&email) {
        return Err(invalid("invalid email address"));
    }
    Ok(email)
}

fn check_username(raw: &str) -> Result<String, ProfileError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(invalid("username must not be empty"));
    }
    // Basic auth splits on the first colon, such a name could never log in.
    if username.contains(':') {
        return Err(invalid("username must not contain ':'"));
    }
    Ok(username.to_string())
}

fn check_password(password: &str) -> Result<(), ProfileError> {
    if password.is_empty() {
        return Err(invalid("password must not be empty"));
    }
    Ok(())
}

/// User-profile operations on top of the store.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<UserStore>,
    hasher: Arc<SaltedHasher>,
}

impl ProfileService {
    /// Builds a store seeded with the configured administrator.
    pub fn bootstrap(admin: &AdminConfig, hasher: Arc<SaltedHasher>) -> Result<Self, ProfileError> {
        let username = check_username(&admin.username)?;
        let email = normalize_email(&admin.email)?;
        check_password(&admin.password)?;

        let record = UserRecord {
            id: UserId::new(),
            email,
            username,
            password_hash: hash(&hasher, &admin.password)?,
            admin: true,
        };
        info!(user_id = %record.id, username = %record.username, "administrator seeded");

        Ok(Self {
            store: Arc::new(UserStore::new(record)),
            hasher,
        })
    }

    /// Authenticates the Basic credentials carried in `headers`.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        authorize(&self.store, &self.hasher, headers)
    }

    pub fn add_user(&self, input: CreateUserRequest) -> Result<UserId, ProfileError> {
        let username = check_username(&input.username)?;
        check_password(&input.password)?;
        let email = normalize_email(&input.email)?;

        let record = UserRecord {
            id: UserId::new(),
            email,
            username,
            password_hash: hash(&self.hasher, &input.password)?,
            admin: input.admin,
        };
        let id = record.id;
        self.store.add(record)?;

        info!(user_id = %id, admin = input.admin, "user created");
        Ok(id)
    }

    /// One page of users in creation order.
    ///
    /// A page number past the end is clamped to the last page.
    pub fn list_users(&self, limit: usize, page: usize) -> Result<UserPage, ProfileError> {
        if limit == 0 {
            return Err(invalid("limit must be greater than 0"));
        }
        if page == 0 {
            return Err(invalid("page number must be greater than 0"));
        }

        let view = self.store.view();
        let pages_amount = view.count().div_ceil(limit);
        let page = page.min(pages_amount.max(1));
        let offset = (page - 1).saturating_mul(limit);

        let users = view
            .list(offset, limit)
            .iter()
            .map(PublicUser::from)
            .collect();

        Ok(UserPage {
            users,
            page_number: page,
            limit,
            pages_amount,
        })
    }

    pub fn get_user(&self, id: UserId) -> Result<PublicUser, ProfileError> {
        let record = self.store.get_by_id(id)?;
        Ok(PublicUser::from(&record))
    }

    pub fn update_user(&self, id: UserId, patch: UpdateUserRequest) -> Result<(), ProfileError> {
        if patch.is_empty() {
            return Err(invalid("no changes submitted"));
        }

        let email = patch.email.as_deref().map(normalize_email).transpose()?;
        let username = patch.username.as_deref().map(check_username).transpose()?;
        let password_hash = match patch.password.as_deref() {
            Some(password) => {
                check_password(password)?;
                Some(hash(&self.hasher, password)?)
            }
            None => None,
        };

        let changes = UserChanges {
            email,
            username,
            password_hash,
            admin: patch.admin,
        };
        self.store.update(id, changes)?;

        info!(user_id = %id, "user updated");
        Ok(())
    }

    pub fn delete_user(&self, id: UserId) -> Result<(), ProfileError> {
        self.store.delete(id)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

fn hash(hasher: &SaltedHasher, password: &str) -> Result<String, ProfileError> {
    hasher
        .hash(password)
        .map_err(|e| ProfileError::Hashing(e.to_string()))
}
