use crate::state::AppState;
use axum::Router;

pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
mod repo_types;
pub mod services;
pub mod tokens;

pub use repo_types::{User, UserRole};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
