use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::OnceLock;

static EXPOSE_INTERNAL: OnceLock<bool> = OnceLock::new();

/// Wired from `AppConfig::expose_internal_errors` at startup. Development
/// mode includes the underlying message in 500 responses.
pub fn set_expose_internal(value: bool) {
    let _ = EXPOSE_INTERNAL.set(value);
}

fn expose_internal() -> bool {
    EXPOSE_INTERNAL.get().copied().unwrap_or(false)
}

/// Error taxonomy surfaced to clients. Business failures map to stable
/// kinds and status codes; anything unexpected collapses into `Internal`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    AlreadyExists(&'static str),
    #[error("invalid or expired verification token")]
    InvalidOrExpiredToken,
    #[error("this account has already been verified")]
    AlreadyVerified,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{0}")]
    Unauthenticated(&'static str),
    #[error("please verify your email address to access this resource")]
    VerificationRequired,
    #[error("this account has been deactivated")]
    AccountDeactivated,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("account cannot be restored as it has been deactivated for more than the restore window")]
    RestoreWindowExpired,
    #[error("account was permanently deleted")]
    PermanentlyDeleted,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::VerificationRequired => "VERIFICATION_REQUIRED",
            Self::AccountDeactivated => "ACCOUNT_DEACTIVATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::RestoreWindowExpired => "RESTORE_WINDOW_EXPIRED",
            Self::PermanentlyDeleted => "PERMANENTLY_DELETED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::AlreadyExists(_)
            | Self::InvalidOrExpiredToken
            | Self::AlreadyVerified
            | Self::RestoreWindowExpired => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthenticated(_) | Self::AccountDeactivated => {
                StatusCode::UNAUTHORIZED
            }
            Self::VerificationRequired | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PermanentlyDeleted => StatusCode::GONE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
                if expose_internal() {
                    e.to_string()
                } else {
                    self.to_string()
                }
            }
            _ => self.to_string(),
        };
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(anyhow::Error::new(e).context("database error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn assert_error(error: ApiError, expected_status: StatusCode, expected_kind: &str) {
        let resp = error.into_response();
        assert_eq!(resp.status(), expected_status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], expected_kind);
        assert!(json["message"].as_str().is_some());
    }

    #[tokio::test]
    async fn already_exists_is_bad_request() {
        assert_error(
            ApiError::AlreadyExists("user with this email or username already exists"),
            StatusCode::BAD_REQUEST,
            "ALREADY_EXISTS",
        )
        .await;
    }

    #[tokio::test]
    async fn invalid_credentials_is_unauthorized() {
        assert_error(
            ApiError::InvalidCredentials,
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
        )
        .await;
    }

    #[tokio::test]
    async fn verification_required_is_forbidden() {
        assert_error(
            ApiError::VerificationRequired,
            StatusCode::FORBIDDEN,
            "VERIFICATION_REQUIRED",
        )
        .await;
    }

    #[tokio::test]
    async fn account_deactivated_is_unauthorized() {
        assert_error(
            ApiError::AccountDeactivated,
            StatusCode::UNAUTHORIZED,
            "ACCOUNT_DEACTIVATED",
        )
        .await;
    }

    #[tokio::test]
    async fn restore_window_expired_is_bad_request() {
        assert_error(
            ApiError::RestoreWindowExpired,
            StatusCode::BAD_REQUEST,
            "RESTORE_WINDOW_EXPIRED",
        )
        .await;
    }

    #[tokio::test]
    async fn permanently_deleted_is_gone() {
        assert_error(
            ApiError::PermanentlyDeleted,
            StatusCode::GONE,
            "PERMANENTLY_DELETED",
        )
        .await;
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let resp = ApiError::Internal(anyhow::anyhow!("db exploded")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], "INTERNAL");
        assert_eq!(json["message"], "internal error");
    }
}
