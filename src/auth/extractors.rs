use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo_types::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Bearer token from the Authorization header, falling back to a `token`
/// cookie for browser clients.
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(auth) = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
        {
            return Some(token.to_string());
        }
    }

    parts
        .headers
        .get(axum::http::header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == "token").then(|| value.to_string())
            })
        })
}

/// Validates the session token, loads the referenced user, and enforces the
/// deactivated / unverified gates. Handlers receive the resolved user.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)
            .ok_or(ApiError::Unauthenticated("not authorized to access this route"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(&token).map_err(|_| {
            warn!("invalid or expired session token");
            ApiError::Unauthenticated("invalid or expired token")
        })?;

        // Deleted rows are loaded on purpose so a deactivated account gets
        // its own response instead of a generic auth failure.
        let user = User::find_by_id(&state.db, claims.sub, true)
            .await?
            .ok_or(ApiError::Unauthenticated("user not found"))?;

        if user.is_deleted {
            return Err(ApiError::AccountDeactivated);
        }
        if !user.is_verified {
            return Err(ApiError::VerificationRequired);
        }

        Ok(AuthUser(user))
    }
}

/// Role guard layered on top of `AuthUser`.
pub struct RequireAdmin(pub User);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden("admin role required"));
        }
        Ok(RequireAdmin(user))
    }
}

/// Ownership guard: the resource owner, or an admin, may proceed.
pub fn ensure_owner_or_admin(owner_id: Uuid, user: &User) -> Result<(), ApiError> {
    if owner_id == user.id || user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("not authorized to access this resource"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::UserRole;
    use time::OffsetDateTime;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            username: "bob".into(),
            email: "bob@x.com".into(),
            password_hash: "$argon2id$fake".into(),
            role,
            is_verified: true,
            verification_token_hash: None,
            verification_expires_at: None,
            is_deleted: false,
            deleted_at: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn owner_passes_ownership_check() {
        let user = user_with_role(UserRole::User);
        assert!(ensure_owner_or_admin(user.id, &user).is_ok());
    }

    #[test]
    fn stranger_fails_ownership_check() {
        let user = user_with_role(UserRole::User);
        let err = ensure_owner_or_admin(Uuid::new_v4(), &user).unwrap_err();
        assert_eq!(err.kind(), "FORBIDDEN");
    }

    #[test]
    fn admin_overrides_ownership_check() {
        let admin = user_with_role(UserRole::Admin);
        assert!(ensure_owner_or_admin(Uuid::new_v4(), &admin).is_ok());
    }
}
