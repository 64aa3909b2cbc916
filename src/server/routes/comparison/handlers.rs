use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::Value;
use softshelf_schema::{
    ApiMessage, ApiSuccess, ComparisonAnalysisView, ComparisonGroupView, RelatedSoftwareView,
    SoftwareView,
};
use tracing::info;

use crate::db::DbSoftware;
use crate::error::CatalogError;
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::guards::auth::RequireUser;
use crate::server::guards::rate_limit::{Throttled, WriteScope};
use crate::server::router::AppState;
use crate::utils::serde_ext::lax_text;

const MISSING_INFO: &str = "缺少必要信息";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateGroupBody {
    #[serde(deserialize_with = "lax_text")]
    pub name: String,
    #[serde(deserialize_with = "lax_text")]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisBody {
    /// Markdown; stored untrimmed.
    pub content: Value,
}

impl AnalysisBody {
    fn into_content(self) -> Result<String, CatalogError> {
        let content = match self.content {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };
        if content.trim().is_empty() {
            return Err(CatalogError::validation(MISSING_INFO, "分析内容是必填项"));
        }
        Ok(content)
    }
}

/// GET /api/comparison/groups
pub async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Vec<ComparisonGroupView>>>, CatalogError> {
    let groups = state.db.list_groups().await?;
    Ok(Json(ApiSuccess::new(
        groups.into_iter().map(Into::into).collect(),
    )))
}

/// POST /api/comparison/groups
pub async fn create_group(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<WriteScope>,
    ApiJson(body): ApiJson<CreateGroupBody>,
) -> Result<Json<ApiSuccess<ComparisonGroupView>>, CatalogError> {
    if body.name.is_empty() {
        return Err(CatalogError::validation(MISSING_INFO, "比较组名称是必填项"));
    }
    let group = state.db.create_group(body.name, body.description).await?;
    info!(user = %user, group_id = group.id, "comparison group created");
    Ok(Json(ApiSuccess::new(group.into())))
}

/// GET /api/comparison/groups/{group_id}/software
pub async fn list_group_software(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> Result<Json<ApiSuccess<Vec<SoftwareView>>>, CatalogError> {
    let rows = state.db.list_group_software(group_id).await?;
    Ok(Json(ApiSuccess::new(
        rows.into_iter().map(DbSoftware::into_view).collect(),
    )))
}

/// POST /api/comparison/groups/{group_id}/software/{software_id}
pub async fn add_to_group(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<WriteScope>,
    ApiPath((group_id, software_id)): ApiPath<(i64, i64)>,
) -> Result<Json<ApiMessage>, CatalogError> {
    state.db.add_software_to_group(group_id, software_id).await?;
    info!(user = %user, group_id, software_id, "software added to group");
    Ok(Json(ApiMessage::new("软件已添加到比较组")))
}

/// DELETE /api/comparison/groups/{group_id}/software/{software_id}
pub async fn remove_from_group(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<WriteScope>,
    ApiPath((group_id, software_id)): ApiPath<(i64, i64)>,
) -> Result<Json<ApiMessage>, CatalogError> {
    if !state
        .db
        .remove_software_from_group(group_id, software_id)
        .await?
    {
        return Err(CatalogError::NotFound("关联关系不存在"));
    }
    info!(user = %user, group_id, software_id, "software removed from group");
    Ok(Json(ApiMessage::new("软件已从比较组移除")))
}

/// GET /api/comparison/software/{software_id}/groups
///
/// Software sharing a group with `software_id`, one entry per shared group.
pub async fn list_related_software(
    State(state): State<AppState>,
    ApiPath(software_id): ApiPath<i64>,
) -> Result<Json<ApiSuccess<Vec<RelatedSoftwareView>>>, CatalogError> {
    let rows = state.db.list_related_software(software_id).await?;
    Ok(Json(ApiSuccess::new(
        rows.into_iter().map(Into::into).collect(),
    )))
}

/// POST | PUT /api/comparison/groups/{group_id}/analysis
///
/// Both verbs upsert.
pub async fn save_analysis(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<WriteScope>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(body): ApiJson<AnalysisBody>,
) -> Result<Json<ApiSuccess<ComparisonAnalysisView>>, CatalogError> {
    let content = body.into_content()?;
    let analysis = state.db.save_analysis(group_id, content).await?;
    info!(user = %user, group_id, "comparison analysis saved");
    Ok(Json(ApiSuccess::new(analysis.into())))
}

/// GET /api/comparison/groups/{group_id}/analysis
pub async fn get_analysis(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> Result<Json<ApiSuccess<Option<ComparisonAnalysisView>>>, CatalogError> {
    let analysis = state.db.get_analysis(group_id).await?;
    Ok(Json(ApiSuccess::new(analysis.map(Into::into))))
}
