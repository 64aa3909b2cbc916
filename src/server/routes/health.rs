use crate::error::CatalogError;
use crate::server::router::AppState;
use axum::{Json, Router, extract::State, routing::get};
use softshelf_schema::{HealthData, HealthResponse};

/// GET /api/test
///
/// Round-trips the database actor and reports the database clock.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, CatalogError> {
    let current_time = state.db.ping().await?;
    Ok(Json(HealthResponse {
        success: true,
        message: "数据库连接成功".to_string(),
        data: HealthData { current_time },
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/test", get(health_check))
}
