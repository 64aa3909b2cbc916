use axum::{Json, extract::State};
use serde_json::{Map, Value};
use softshelf_schema::{ApiMessage, ApiSecretValue, ApiSuccess, SoftwareView};
use tracing::info;

use super::icons::{icon_for_create, reconcile_on_update};
use super::payload::{CreateSoftwareBody, UpdateSoftwareBody};
use crate::db::DbSoftware;
use crate::error::CatalogError;
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::guards::auth::RequireUser;
use crate::server::guards::rate_limit::{AllowlistedIp, SecretScope, Throttled, WriteScope};
use crate::server::router::AppState;

const SOFTWARE_NOT_FOUND: &str = "软件不存在";

type SoftwareList = Json<ApiSuccess<Vec<SoftwareView>>>;

fn masked(rows: Vec<DbSoftware>) -> SoftwareList {
    Json(ApiSuccess::new(
        rows.into_iter().map(DbSoftware::into_view).collect(),
    ))
}

/// GET /api/software
pub async fn list_software(State(state): State<AppState>) -> Result<SoftwareList, CatalogError> {
    Ok(masked(state.db.list_software().await?))
}

/// GET /api/software/category/{category}
pub async fn list_by_category(
    State(state): State<AppState>,
    ApiPath(category): ApiPath<String>,
) -> Result<SoftwareList, CatalogError> {
    Ok(masked(state.db.list_software_by_category(category).await?))
}

/// GET /api/software/search/{query}
pub async fn search_software(
    State(state): State<AppState>,
    ApiPath(query): ApiPath<String>,
) -> Result<SoftwareList, CatalogError> {
    Ok(masked(state.db.search_software(query).await?))
}

/// POST /api/software
pub async fn create_software(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<WriteScope>,
    ApiJson(body): ApiJson<CreateSoftwareBody>,
) -> Result<Json<ApiSuccess<SoftwareView>>, CatalogError> {
    let mut create = body.into_create()?;
    create.icon = icon_for_create(&state.icons, &create.name, &create.icon).await?;

    let row = state.db.create_software(create).await?;
    info!(user = %user, software_id = row.id, name = %row.name, "software created");
    Ok(Json(ApiSuccess::new(row.into_view())))
}

/// PUT /api/software/{id}
///
/// Partial update. An icon that changed or was cleared is removed from storage only
/// after the row has been saved.
pub async fn update_software(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<WriteScope>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<ApiSuccess<SoftwareView>>, CatalogError> {
    let existing = state
        .db
        .get_software(id)
        .await?
        .ok_or(CatalogError::NotFound(SOFTWARE_NOT_FOUND))?;

    let UpdateSoftwareBody { mut patch, icon } = UpdateSoftwareBody::parse(&body)?;

    let name = patch.name.as_deref().unwrap_or(&existing.name);
    let change = reconcile_on_update(&state.icons, name, &existing.icon, icon).await?;
    patch.icon = change.next;

    let row = state
        .db
        .update_software(id, patch)
        .await?
        .ok_or(CatalogError::NotFound(SOFTWARE_NOT_FOUND))?;

    if let Some(stale) = change.stale {
        state.icons.discard(&stale).await;
    }
    info!(user = %user, software_id = id, "software updated");
    Ok(Json(ApiSuccess::new(row.into_view())))
}

/// DELETE /api/software/{id}
pub async fn delete_software(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<WriteScope>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiMessage>, CatalogError> {
    let row = state
        .db
        .delete_software(id)
        .await?
        .ok_or(CatalogError::NotFound(SOFTWARE_NOT_FOUND))?;

    if !row.icon.is_empty() {
        state.icons.discard(&row.icon).await;
    }
    info!(user = %user, software_id = id, name = %row.name, "software deleted");
    Ok(Json(ApiMessage::new("软件删除成功")))
}

/// GET /api/software/{id}/secret/{secret_id}
///
/// The only route that returns secret plaintext. IP rate limited, optionally allowlisted,
/// and every reveal is logged.
pub async fn reveal_secret(
    State(state): State<AppState>,
    _throttle: Throttled<SecretScope>,
    AllowlistedIp(ip): AllowlistedIp,
    ApiPath((id, secret_id)): ApiPath<(i64, String)>,
) -> Result<Json<ApiSecretValue>, CatalogError> {
    let row = state
        .db
        .get_software(id)
        .await?
        .ok_or(CatalogError::NotFound(SOFTWARE_NOT_FOUND))?;

    let cipher_text = row
        .find_secret(&secret_id)
        .and_then(|secret| secret.cipher.as_deref())
        .filter(|c| !c.is_empty())
        .ok_or(CatalogError::NotFound("密钥不存在"))?;

    let value = state.cipher.decrypt(cipher_text)?;
    info!(ip = %ip, software_id = id, secret_id = %secret_id, "secret revealed");
    Ok(Json(ApiSecretValue::new(value)))
}
