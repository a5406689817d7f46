use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::{AuthUser, RequireAdmin};
use crate::categories::dto::{
    validate_description, validate_name, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::categories::repo_types::{slugify, Category};
use crate::error::ApiError;
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/categories/:id", get(get_category))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", post(create_category))
        .route(
            "/categories/:id",
            patch(update_category).delete(delete_category),
        )
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[instrument(skip(state))]
async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = Category::list(&state.db).await?;
    Ok(Json(categories))
}

#[instrument(skip(state))]
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    let category = Category::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("category not found"))?;
    Ok(Json(category))
}

fn validate(name: Option<&str>, description: Option<&str>) -> Result<(), ApiError> {
    if let Some(name) = name {
        if !validate_name(name) {
            return Err(ApiError::Validation(
                "name must be between 2 and 50 characters".into(),
            ));
        }
    }
    if let Some(description) = description {
        if !validate_description(description) {
            return Err(ApiError::Validation(
                "description cannot be longer than 500 characters".into(),
            ));
        }
    }
    Ok(())
}

#[instrument(skip(state, user, payload))]
async fn create_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let name = payload.name.trim().to_string();
    validate(Some(&name), payload.description.as_deref())?;

    let slug = slugify(&name);
    let category = Category::create(&state.db, &name, &slug, payload.description.as_deref())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::AlreadyExists("a category with this name already exists")
            } else {
                e.into()
            }
        })?;

    info!(category_id = %category.id, user_id = %user.id, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, user, payload))]
async fn update_category(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let name = payload.name.as_deref().map(str::trim);
    validate(name, payload.description.as_deref())?;

    // Renaming regenerates the slug, same as on creation.
    let slug = name.map(slugify);
    let category = Category::update(
        &state.db,
        id,
        name,
        slug.as_deref(),
        payload.description.as_deref(),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::AlreadyExists("a category with this name already exists")
        } else {
            e.into()
        }
    })?
    .ok_or(ApiError::NotFound("category not found"))?;

    info!(category_id = %category.id, user_id = %user.id, "category updated");
    Ok(Json(category))
}

#[instrument(skip(state, admin))]
async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !Category::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("category not found"));
    }
    info!(category_id = %id, user_id = %admin.id, "category deleted");
    Ok(Json(serde_json::json!({
        "message": "Category deleted successfully"
    })))
}
