use crate::state::AppState;
use axum::Router;

pub mod handlers;
mod templates;

pub fn router() -> Router<AppState> {
    handlers::page_routes()
}
