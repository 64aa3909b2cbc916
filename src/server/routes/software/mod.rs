use crate::server::router::AppState;
use axum::{
    Router,
    routing::{get, put},
};

pub mod handlers;
mod icons;
pub mod payload;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/software",
            get(handlers::list_software).post(handlers::create_software),
        )
        .route(
            "/api/software/{id}",
            put(handlers::update_software).delete(handlers::delete_software),
        )
        .route(
            "/api/software/{id}/secret/{secret_id}",
            get(handlers::reveal_secret),
        )
        .route(
            "/api/software/category/{category}",
            get(handlers::list_by_category),
        )
        .route(
            "/api/software/search/{query}",
            get(handlers::search_software),
        )
}
