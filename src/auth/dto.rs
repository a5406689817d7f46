use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{User, UserRole};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

/// Restoring a deactivated account requires full re-authentication, not
/// just knowledge of the email address.
#[derive(Debug, Deserialize)]
pub struct RestoreAccountRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after login or restore.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Sanitized user returned to clients: no password hash, no verification
/// token material, no soft-delete bookkeeping.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_verified: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "$argon2id$fake".into(),
            role: UserRole::User,
            is_verified: true,
            verification_token_hash: Some("deadbeef".into()),
            verification_expires_at: Some(OffsetDateTime::now_utc()),
            is_deleted: false,
            deleted_at: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn public_user_omits_secret_fields() {
        let json = serde_json::to_value(PublicUser::from(sample_user())).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["is_verified"], true);
        assert!(json.get("password_hash").is_none());
        assert!(json.get("verification_token_hash").is_none());
        assert!(json.get("verification_expires_at").is_none());
        assert!(json.get("is_deleted").is_none());
        assert!(json.get("deleted_at").is_none());
    }

    #[test]
    fn user_row_serialization_skips_secrets_too() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("verification_token_hash").is_none());
    }
}
