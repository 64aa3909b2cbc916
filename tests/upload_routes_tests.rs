mod common;

use axum::http::StatusCode;
use common::{USER, multipart_request, spawn_app};

#[tokio::test]
async fn png_upload_is_stored_under_a_temporary_name() {
    let app = spawn_app(|_| {}).await;

    let resp = app.upload_icon(Some(USER), "image/png", b"png-bytes").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["success"], true);

    let filename = resp.body["filename"].as_str().expect("filename");
    assert!(filename.starts_with("icon_"));
    assert!(filename.ends_with(".png"));
    assert_eq!(
        std::fs::read(app.icon_path(&format!("AppArchive/{filename}"))).expect("stored"),
        b"png-bytes"
    );
}

#[tokio::test]
async fn svg_keeps_its_extension() {
    let app = spawn_app(|_| {}).await;

    let resp = app
        .upload_icon(Some(USER), "image/svg+xml", b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>")
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(
        resp.body["filename"]
            .as_str()
            .is_some_and(|f| f.ends_with(".svg"))
    );
}

#[tokio::test]
async fn unsupported_mime_is_rejected() {
    let app = spawn_app(|_| {}).await;

    let resp = app.upload_icon(Some(USER), "image/gif", b"GIF89a").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "上传失败");
    assert_eq!(
        resp.body["message"],
        "仅支持上传 PNG/JPEG/WebP/SVG/ICO 格式的图片"
    );
}

#[tokio::test]
async fn missing_icon_field_is_rejected() {
    let app = spawn_app(|_| {}).await;

    let resp = app
        .send(multipart_request(Some(USER), "avatar", "image/png", b"png"))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "缺少文件");

    let resp = app.upload_icon(Some(USER), "image/png", b"").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "缺少文件");
}

#[tokio::test]
async fn upload_requires_a_user() {
    let app = spawn_app(|_| {}).await;

    let resp = app.upload_icon(None, "image/png", b"png-bytes").await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversized_icon_is_rejected() {
    let app = spawn_app(|_| {}).await;

    let bytes = vec![0u8; 5 * 1024 * 1024 + 1];
    let resp = app.upload_icon(Some(USER), "image/png", &bytes).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "图片大小不能超过 5MB");
}
