use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;
use tracing::info;

use crate::ai::SoftwareBrief;
use crate::error::CatalogError;
use crate::server::extract::ApiJson;
use crate::server::guards::auth::RequireUser;
use crate::server::guards::rate_limit::{AiScope, Throttled};
use crate::server::router::AppState;
use crate::utils::logging::elapsed_ms;

const MISSING_INFO: &str = "缺少必要信息";

/// Non-object entries read as an empty brief.
fn brief_of(value: Value) -> SoftwareBrief {
    serde_json::from_value(value).unwrap_or_default()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeBody {
    pub software: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompareBody {
    pub softwares: Value,
}

/// POST /api/ai/analyze
///
/// Returns the provider's chat-completion JSON as is; the SPA parses the message content.
pub async fn analyze(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<AiScope>,
    ApiJson(body): ApiJson<AnalyzeBody>,
) -> Result<Json<Value>, CatalogError> {
    let software = brief_of(body.software);
    if software.name.is_empty() {
        return Err(CatalogError::validation(MISSING_INFO, "软件名称不能为空"));
    }

    let started = Instant::now();
    let result = state.ai.analyze(&software).await;
    info!(
        user = %user,
        duration_ms = elapsed_ms(started),
        model = state.ai.model(),
        ok = result.is_ok(),
        "ai analyze finished"
    );
    result.map(Json).map_err(CatalogError::analyze)
}

/// POST /api/ai/compare
pub async fn compare(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<AiScope>,
    ApiJson(body): ApiJson<CompareBody>,
) -> Result<Json<Value>, CatalogError> {
    let softwares: Vec<SoftwareBrief> = match body.softwares {
        Value::Array(items) if items.len() >= 2 => items.into_iter().map(brief_of).collect(),
        _ => {
            return Err(CatalogError::validation(
                MISSING_INFO,
                "至少需要两个软件才能进行对比",
            ));
        }
    };

    let started = Instant::now();
    let result = state.ai.compare(&softwares).await;
    info!(
        user = %user,
        count = softwares.len(),
        duration_ms = elapsed_ms(started),
        model = state.ai.model(),
        ok = result.is_ok(),
        "ai compare finished"
    );
    result.map(Json).map_err(CatalogError::compare)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ai/analyze", post(analyze))
        .route("/api/ai/compare", post(compare))
}
