use sqlx::PgPool;
use uuid::Uuid;

use crate::books::dto::{BookQuery, CreateBookRequest, UpdateBookRequest};
use crate::books::repo_types::Book;

impl Book {
    pub async fn list_by_user(db: &PgPool, user_id: Uuid, q: &BookQuery) -> sqlx::Result<Vec<Book>> {
        let search = q.search.as_ref().map(|s| format!("%{}%", s.trim()));
        sqlx::query_as::<_, Book>(
            r#"
            SELECT id, user_id, title, author, description, cover_image,
                   is_favorite, category_id, created_at, updated_at
            FROM books
            WHERE user_id = $1
              AND ($2::boolean IS NULL OR is_favorite = $2)
              AND ($3::uuid IS NULL OR category_id = $3)
              AND ($4::text IS NULL OR title ILIKE $4 OR author ILIKE $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(user_id)
        .bind(q.favorite)
        .bind(q.category)
        .bind(search)
        .bind(q.limit)
        .bind(q.offset)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Book>> {
        sqlx::query_as::<_, Book>(
            r#"
            SELECT id, user_id, title, author, description, cover_image,
                   is_favorite, category_id, created_at, updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(db: &PgPool, user_id: Uuid, req: &CreateBookRequest) -> sqlx::Result<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (user_id, title, author, description, cover_image, category_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, author, description, cover_image,
                      is_favorite, category_id, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(req.title.trim())
        .bind(req.author.trim())
        .bind(req.description.as_deref())
        .bind(req.cover_image.as_deref())
        .bind(req.category_id)
        .fetch_one(db)
        .await
    }

    pub async fn update(db: &PgPool, id: Uuid, req: &UpdateBookRequest) -> sqlx::Result<Option<Book>> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                description = COALESCE($4, description),
                cover_image = COALESCE($5, cover_image),
                category_id = COALESCE($6, category_id),
                updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, title, author, description, cover_image,
                      is_favorite, category_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(req.title.as_deref().map(str::trim))
        .bind(req.author.as_deref().map(str::trim))
        .bind(req.description.as_deref())
        .bind(req.cover_image.as_deref())
        .bind(req.category_id)
        .fetch_optional(db)
        .await
    }

    pub async fn set_favorite(db: &PgPool, id: Uuid, is_favorite: bool) -> sqlx::Result<Option<Book>> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET is_favorite = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, title, author, description, cover_image,
                      is_favorite, category_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(is_favorite)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
