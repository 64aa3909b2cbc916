use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::{MultipartError, MultipartRejection},
    },
    routing::post,
};
use softshelf_schema::ApiUploadedIcon;
use std::time::Instant;
use tracing::info;

use crate::error::CatalogError;
use crate::server::guards::auth::RequireUser;
use crate::server::guards::rate_limit::{Throttled, UploadScope};
use crate::server::router::AppState;
use crate::storage::naming::{MAX_ICON_BYTES, is_allowed_mime};
use crate::utils::logging::elapsed_ms;

/// Body cap for the upload route: the icon limit plus multipart framing.
const UPLOAD_BODY_LIMIT: usize = 6 * 1024 * 1024;

const ICON_FIELD: &str = "icon";

fn upload_failed(message: impl Into<String>) -> CatalogError {
    CatalogError::validation("上传失败", message)
}

fn missing_file() -> CatalogError {
    CatalogError::validation("缺少文件", "请上传图片文件")
}

fn multipart_failed(err: &MultipartError) -> CatalogError {
    upload_failed(err.body_text())
}

/// POST /api/upload/icon
///
/// Multipart field `icon`. Stored under a temporary name until a software entry
/// claims it.
pub async fn upload_icon(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    _throttle: Throttled<UploadScope>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiUploadedIcon>, CatalogError> {
    let started = Instant::now();
    let mut multipart = multipart.map_err(|_| missing_file())?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_failed(&e))?
    {
        if field.name() != Some(ICON_FIELD) {
            continue;
        }
        let mime = field.content_type().unwrap_or_default().to_string();
        if !is_allowed_mime(&mime) {
            return Err(upload_failed("仅支持上传 PNG/JPEG/WebP/SVG/ICO 格式的图片"));
        }
        let bytes = field.bytes().await.map_err(|e| multipart_failed(&e))?;
        if bytes.is_empty() {
            return Err(missing_file());
        }
        if bytes.len() > MAX_ICON_BYTES {
            return Err(upload_failed("图片大小不能超过 5MB"));
        }

        let size = bytes.len();
        let uploaded = state.icons.upload(bytes, &mime).await;
        info!(
            user = %user,
            mime = %mime,
            size,
            duration_ms = elapsed_ms(started),
            ok = uploaded.is_ok(),
            "icon upload"
        );
        let uploaded = uploaded?;
        return Ok(Json(ApiUploadedIcon {
            success: true,
            path: uploaded.url,
            filename: uploaded.filename,
        }));
    }

    Err(missing_file())
}

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/upload/icon",
        post(upload_icon).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
    )
}
