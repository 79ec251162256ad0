use axum::http::{header::AUTHORIZATION, HeaderMap};
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::basic::parse_basic_auth;
use crate::auth::password::SaltedHasher;
use crate::users::repo::UserStore;
use crate::users::repo_types::{UserId, UserRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("authorization required")]
    MissingCredentials,
    /// Wrong password, wrong username and unknown username all end up here.
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("user is not admin")]
    Forbidden,
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    pub admin: bool,
}

impl From<&UserRecord> for Principal {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            admin: record.admin,
        }
    }
}

/// Checks a claimed username/password pair against a stored record.
///
/// Both the hash and the username are always checked, and either failure
/// gives the same error.
pub fn validate_credentials(
    hasher: &SaltedHasher,
    username: &str,
    password: &str,
    record: &UserRecord,
) -> Result<(), AuthError> {
    let password_ok = match hasher.verify(password, &record.password_hash) {
        Ok(ok) => ok,
        Err(e) => {
            warn!(error = %e, user_id = %record.id, "stored password hash is unreadable");
            false
        }
    };
    let username_ok = username == record.username;

    if password_ok && username_ok {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

/// Resolves the Basic credentials in `headers` to a known user.
pub fn authorize(
    store: &UserStore,
    hasher: &SaltedHasher,
    headers: &HeaderMap,
) -> Result<Principal, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;
    let creds = parse_basic_auth(header)?;

    // Unknown names pay for a hash too, so timing does not reveal which names exist.
    let record = store.get_by_username(&creds.username).map_err(|_| {
        hasher.verify_absent(&creds.password);
        warn!(username = %creds.username, "login attempt for unknown username");
        AuthError::InvalidCredentials
    })?;

    validate_credentials(hasher, &creds.username, &creds.password, &record).map_err(|e| {
        warn!(username = %creds.username, "login attempt with wrong password");
        e
    })?;

    debug!(user_id = %record.id, admin = record.admin, "caller authenticated");
    Ok(Principal::from(&record))
}
