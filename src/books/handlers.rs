use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::{ensure_owner_or_admin, AuthUser};
use crate::books::dto::{BookQuery, CreateBookRequest, FavoriteRequest, UpdateBookRequest};
use crate::books::repo_types::Book;
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).patch(update_book).delete(delete_book),
        )
        .route("/books/:id/favorite", patch(set_favorite))
}

#[instrument(skip(state, user))]
async fn list_books(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<BookQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let books = Book::list_by_user(&state.db, user.id, &q).await?;
    Ok(Json(books))
}

/// Load a book and apply the ownership guard in one place.
async fn load_owned(state: &AppState, id: Uuid, user: &crate::auth::User) -> Result<Book, ApiError> {
    let book = Book::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("book not found"))?;
    ensure_owner_or_admin(book.user_id, user)?;
    Ok(book)
}

#[instrument(skip(state, user))]
async fn get_book(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, ApiError> {
    let book = load_owned(&state, id, &user).await?;
    Ok(Json(book))
}

#[instrument(skip(state, user, payload))]
async fn create_book(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateBookRequest>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    if payload.author.trim().is_empty() {
        return Err(ApiError::Validation("author is required".into()));
    }

    let book = Book::create(&state.db, user.id, &payload).await?;
    info!(book_id = %book.id, user_id = %user.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

#[instrument(skip(state, user, payload))]
async fn update_book(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookRequest>,
) -> Result<Json<Book>, ApiError> {
    load_owned(&state, id, &user).await?;

    let book = Book::update(&state.db, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("book not found"))?;
    info!(book_id = %book.id, user_id = %user.id, "book updated");
    Ok(Json(book))
}

#[instrument(skip(state, user, payload))]
async fn set_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FavoriteRequest>,
) -> Result<Json<Book>, ApiError> {
    load_owned(&state, id, &user).await?;

    let book = Book::set_favorite(&state.db, id, payload.is_favorite)
        .await?
        .ok_or(ApiError::NotFound("book not found"))?;
    Ok(Json(book))
}

#[instrument(skip(state, user))]
async fn delete_book(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    load_owned(&state, id, &user).await?;

    if !Book::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("book not found"));
    }
    info!(book_id = %id, user_id = %user.id, "book deleted");
    Ok(Json(serde_json::json!({
        "message": "Book deleted successfully"
    })))
}
