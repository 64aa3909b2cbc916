use crate::server::router::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/comparison/groups",
            get(handlers::list_groups).post(handlers::create_group),
        )
        .route(
            "/api/comparison/groups/{group_id}/software",
            get(handlers::list_group_software),
        )
        .route(
            "/api/comparison/groups/{group_id}/software/{software_id}",
            post(handlers::add_to_group).delete(handlers::remove_from_group),
        )
        .route(
            "/api/comparison/groups/{group_id}/analysis",
            get(handlers::get_analysis)
                .post(handlers::save_analysis)
                .put(handlers::save_analysis),
        )
        .route(
            "/api/comparison/software/{software_id}/groups",
            get(handlers::list_related_software),
        )
}
