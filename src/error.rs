use axum::{
    extract::rejection::JsonRejection,
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::auth::services::AuthError;
use crate::users::repo::StoreError;
use crate::users::services::ProfileError;

/// Every failure a handler can return, mapped onto an HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("malformed user id: {0}")]
    MalformedIdentifier(String),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Profile(ProfileError::Store(e))
    }
}

// Undecodable, mistyped or incomplete bodies are validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Profile(ProfileError::Validation(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::MissingCredentials | AuthError::InvalidCredentials) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::MalformedIdentifier(_) => StatusCode::BAD_REQUEST,
            ApiError::Profile(ProfileError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Profile(ProfileError::Store(StoreError::NotFound)) => StatusCode::NOT_FOUND,
            ApiError::Profile(ProfileError::Store(
                StoreError::DuplicateId | StoreError::DuplicateUsername,
            )) => StatusCode::CONFLICT,
            ApiError::Profile(ProfileError::Hashing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
            return (status, "internal error".to_string()).into_response();
        }

        let message = self.to_string();
        if status == StatusCode::UNAUTHORIZED {
            return (
                status,
                [(WWW_AUTHENTICATE, r#"Basic realm="profiles""#)],
                message,
            )
                .into_response();
        }
        (status, message).into_response()
    }
}
