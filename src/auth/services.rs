use lazy_static::lazy_static;
use regex::Regex;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::auth::dto::RegisterRequest;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::User;
use crate::auth::tokens::{digest_token, issue_verification_token};
use crate::email;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::FromRef;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let len = req.username.chars().count();
    if !(3..=30).contains(&len) {
        return Err(ApiError::Validation(
            "username must be between 3 and 30 characters".into(),
        ));
    }
    if !is_valid_email(&req.email) {
        return Err(ApiError::Validation("invalid email address".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Register a new account: unverified, not deleted, role `user`. The raw
/// verification token leaves the process only inside the email.
pub async fn register(state: &AppState, mut req: RegisterRequest) -> Result<User, ApiError> {
    req.username = req.username.trim().to_string();
    req.email = req.email.trim().to_lowercase();
    validate_registration(&req)?;

    if User::username_or_email_taken(&state.db, &req.username, &req.email).await? {
        warn!(email = %req.email, "registration for taken username/email");
        return Err(ApiError::AlreadyExists(
            "user with this email or username already exists",
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let token = issue_verification_token(state.config.verification_ttl_hours);

    let user = User::create(
        &state.db,
        &req.username,
        &req.email,
        &password_hash,
        &token.digest,
        token.expires_at,
    )
    .await
    .map_err(|e| {
        // The unique index is the arbiter when two registrations race past
        // the pre-check.
        if is_unique_violation(&e) {
            ApiError::AlreadyExists("user with this email or username already exists")
        } else {
            e.into()
        }
    })?;

    email::dispatch_verification(state, &user.email, &user.username, &token.raw);
    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Redeem a verification token. Replays and expired tokens both land on the
/// same failure: after redemption the hash is gone, so the conditional
/// update matches nothing.
pub async fn verify_email(state: &AppState, raw_token: &str) -> Result<User, ApiError> {
    let digest = digest_token(raw_token);
    let user =
        User::redeem_verification_token(&state.db, &digest, OffsetDateTime::now_utc()).await?;
    match user {
        Some(user) => {
            info!(user_id = %user.id, "email verified");
            Ok(user)
        }
        None => Err(ApiError::InvalidOrExpiredToken),
    }
}

pub async fn resend_verification(state: &AppState, email_addr: &str) -> Result<(), ApiError> {
    let user = User::find_by_email(&state.db, email_addr.trim(), false)
        .await?
        .ok_or(ApiError::NotFound("no account found with this email address"))?;

    if user.is_verified {
        return Err(ApiError::AlreadyVerified);
    }

    let token = issue_verification_token(state.config.verification_ttl_hours);
    let user = User::set_verification_token(&state.db, user.id, &token.digest, token.expires_at)
        .await?
        .ok_or(ApiError::NotFound("no account found with this email address"))?;

    email::dispatch_verification(state, &user.email, &user.username, &token.raw);
    info!(user_id = %user.id, "verification email reissued");
    Ok(())
}

/// Unknown email and wrong password produce the same error so responses do
/// not reveal which accounts exist. Deactivated and unverified accounts are
/// distinct outcomes the client must branch on.
pub async fn login(state: &AppState, email_addr: &str, password: &str) -> Result<(String, User), ApiError> {
    let email_addr = email_addr.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &email_addr, true).await? {
        Some(u) => u,
        None => {
            warn!(email = %email_addr, "login for unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if user.is_deleted {
        warn!(user_id = %user.id, "login for deactivated account");
        return Err(ApiError::AccountDeactivated);
    }

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if !user.is_verified {
        return Err(ApiError::VerificationRequired);
    }

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id, user.role)?;
    info!(user_id = %user.id, "user logged in");
    Ok((token, user))
}

pub async fn delete_account(state: &AppState, user: &User) -> Result<(), ApiError> {
    let deleted = User::soft_delete(&state.db, user.id)
        .await?
        .ok_or(ApiError::NotFound("user not found"))?;

    email::dispatch_account_deactivated(state, &deleted.email, &deleted.username);
    info!(user_id = %deleted.id, "account soft-deleted");
    Ok(())
}

/// Inclusive at the boundary: an account deleted exactly `window_days` ago
/// is still restorable.
pub fn restore_window_open(
    deleted_at: OffsetDateTime,
    now: OffsetDateTime,
    window_days: i64,
) -> bool {
    now - deleted_at <= Duration::days(window_days)
}

pub async fn restore_account(
    state: &AppState,
    email_addr: &str,
    password: &str,
) -> Result<(String, User), ApiError> {
    let email_addr = email_addr.trim().to_lowercase();

    let user = User::find_deleted_by_email(&state.db, &email_addr)
        .await?
        .ok_or(ApiError::NotFound(
            "no deactivated account found with this email address",
        ))?;

    // Re-authentication: knowing a deleted account's email must not be
    // enough to take it over.
    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "restore with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let deleted_at = user
        .deleted_at
        .ok_or_else(|| anyhow::anyhow!("deleted account {} has no deleted_at", user.id))?;

    if !restore_window_open(
        deleted_at,
        OffsetDateTime::now_utc(),
        state.config.restore_window_days,
    ) {
        return Err(ApiError::RestoreWindowExpired);
    }

    let user = User::restore(&state.db, user.id)
        .await?
        .ok_or(ApiError::NotFound(
            "no deactivated account found with this email address",
        ))?;

    let keys = JwtKeys::from_ref(state);
    let token = keys.sign(user.id, user.role)?;
    info!(user_id = %user.id, "account restored");
    Ok((token, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::dto::RegisterRequest;

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("alice@x.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("alice @x.com"));
        assert!(!is_valid_email("alice@x"));
    }

    fn req(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn registration_validation_rules() {
        assert!(validate_registration(&req("alice", "alice@x.com", "secret123")).is_ok());
        assert!(validate_registration(&req("al", "alice@x.com", "secret123")).is_err());
        assert!(validate_registration(&req(&"x".repeat(31), "alice@x.com", "secret123")).is_err());
        assert!(validate_registration(&req("alice", "not-an-email", "secret123")).is_err());
        assert!(validate_registration(&req("alice", "alice@x.com", "short")).is_err());
    }

    #[test]
    fn restore_window_is_inclusive_at_the_boundary() {
        let now = OffsetDateTime::now_utc();
        // Exactly 30 days ago: still restorable.
        assert!(restore_window_open(now - Duration::days(30), now, 30));
        // One second past the window: closed.
        assert!(!restore_window_open(
            now - Duration::days(30) - Duration::seconds(1),
            now,
            30
        ));
        assert!(restore_window_open(now - Duration::days(1), now, 30));
        assert!(!restore_window_open(now - Duration::days(31), now, 30));
    }
}
