mod dto;
pub mod handlers;
mod repo;
mod repo_types;

pub use repo_types::Book;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
