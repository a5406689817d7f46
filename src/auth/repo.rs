use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;

// Every read takes an explicit include_deleted flag; there is no implicit
// filtering layer hiding soft-deleted rows.

impl User {
    pub async fn find_by_id(
        db: &PgPool,
        id: Uuid,
        include_deleted: bool,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, is_verified,
                   verification_token_hash, verification_expires_at,
                   is_deleted, deleted_at, created_at, updated_at
            FROM users
            WHERE id = $1 AND (is_deleted = FALSE OR $2)
            "#,
        )
        .bind(id)
        .bind(include_deleted)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_email(
        db: &PgPool,
        email: &str,
        include_deleted: bool,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, is_verified,
                   verification_token_hash, verification_expires_at,
                   is_deleted, deleted_at, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1) AND (is_deleted = FALSE OR $2)
            "#,
        )
        .bind(email)
        .bind(include_deleted)
        .fetch_optional(db)
        .await
    }

    /// Restore path only: matches soft-deleted rows.
    pub async fn find_deleted_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, is_verified,
                   verification_token_hash, verification_expires_at,
                   is_deleted, deleted_at, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1) AND is_deleted = TRUE
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Pre-check for registration. Advisory only: concurrent registrations
    /// are arbitrated by the unique indexes, not by this query.
    pub async fn username_or_email_taken(
        db: &PgPool,
        username: &str,
        email: &str,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($2)
            )
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_one(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        verification_token_hash: &str,
        verification_expires_at: OffsetDateTime,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash,
                               verification_token_hash, verification_expires_at)
            VALUES ($1, LOWER($2), $3, $4, $5)
            RETURNING id, username, email, password_hash, role, is_verified,
                      verification_token_hash, verification_expires_at,
                      is_deleted, deleted_at, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(verification_token_hash)
        .bind(verification_expires_at)
        .fetch_one(db)
        .await
    }

    /// Single conditional UPDATE so redemption is atomic: a replayed token
    /// finds no matching row once the hash is cleared.
    pub async fn redeem_verification_token(
        db: &PgPool,
        token_hash: &str,
        now: OffsetDateTime,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_verified = TRUE,
                verification_token_hash = NULL,
                verification_expires_at = NULL,
                updated_at = now()
            WHERE verification_token_hash = $1
              AND verification_expires_at > $2
              AND is_deleted = FALSE
            RETURNING id, username, email, password_hash, role, is_verified,
                      verification_token_hash, verification_expires_at,
                      is_deleted, deleted_at, created_at, updated_at
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(db)
        .await
    }

    /// Reissue for resend: overwrites any previous hash and expiry, which
    /// invalidates the previously emailed raw token.
    pub async fn set_verification_token(
        db: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET verification_token_hash = $2,
                verification_expires_at = $3,
                updated_at = now()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING id, username, email, password_hash, role, is_verified,
                      verification_token_hash, verification_expires_at,
                      is_deleted, deleted_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_optional(db)
        .await
    }

    pub async fn soft_delete(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_deleted = TRUE, deleted_at = now(), updated_at = now()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING id, username, email, password_hash, role, is_verified,
                      verification_token_hash, verification_expires_at,
                      is_deleted, deleted_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn restore(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_deleted = FALSE, deleted_at = NULL, updated_at = now()
            WHERE id = $1 AND is_deleted = TRUE
            RETURNING id, username, email, password_hash, role, is_verified,
                      verification_token_hash, verification_expires_at,
                      is_deleted, deleted_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }
}
