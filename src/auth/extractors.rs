use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::services::{AuthError, Principal};
use crate::error::ApiError;
use crate::users::services::ProfileService;

/// Any caller with valid Basic credentials.
#[derive(Debug)]
pub struct AuthUser(pub Principal);

/// A caller with valid Basic credentials and the admin flag set.
#[derive(Debug)]
pub struct AdminUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    ProfileService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let profiles = ProfileService::from_ref(state);
        let principal = profiles.authorize(&parts.headers)?;
        Ok(AuthUser(principal))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    ProfileService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        if !principal.admin {
            warn!(
                user_id = %principal.id,
                username = %principal.username,
                method = %parts.method,
                uri = %parts.uri,
                "admin required"
            );
            return Err(AuthError::Forbidden.into());
        }
        Ok(AdminUser(principal))
    }
}
