mod common;

use axum::http::StatusCode;
use common::{TestApp, USER, spawn_app};
use serde_json::{Value, json};

async fn create_group(app: &TestApp, name: &str) -> i64 {
    let resp = app
        .json(
            "POST",
            "/api/comparison/groups",
            Some(USER),
            &json!({ "name": name, "description": format!("{name} tools") }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    resp.body["data"]["id"].as_i64().expect("group id")
}

async fn create_software(app: &TestApp, name: &str) -> i64 {
    app.create_software(&json!({ "name": name, "category": "editor" }))
        .await["id"]
        .as_i64()
        .expect("software id")
}

async fn link(app: &TestApp, group: i64, software: i64) -> common::TestResponse {
    app.json(
        "POST",
        &format!("/api/comparison/groups/{group}/software/{software}"),
        Some(USER),
        &Value::Null,
    )
    .await
}

fn names(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .expect("list")
        .iter()
        .filter_map(|s| s["name"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn group_creation_requires_a_name() {
    let app = spawn_app(|_| {}).await;

    let resp = app
        .json("POST", "/api/comparison/groups", Some(USER), &json!({ "name": " " }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "比较组名称是必填项");

    let id = create_group(&app, "Editors").await;
    let resp = app.get("/api/comparison/groups").await;
    assert_eq!(resp.body["data"][0]["id"], id);
    assert_eq!(resp.body["data"][0]["description"], "Editors tools");
}

#[tokio::test]
async fn membership_is_idempotent_and_removable() {
    let app = spawn_app(|_| {}).await;
    let group = create_group(&app, "Editors").await;
    let zed = create_software(&app, "Zed").await;
    let vim = create_software(&app, "Vim").await;

    for software in [zed, vim, zed] {
        let resp = link(&app, group, software).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.body["message"], "软件已添加到比较组");
    }

    let resp = app
        .get(&format!("/api/comparison/groups/{group}/software"))
        .await;
    assert_eq!(names(&resp.body), vec!["Vim", "Zed"]);

    let uri = format!("/api/comparison/groups/{group}/software/{zed}");
    let resp = app.delete(&uri, Some(USER)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["message"], "软件已从比较组移除");

    let resp = app.delete(&uri, Some(USER)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "关联关系不存在");
}

#[tokio::test]
async fn linking_unknown_rows_is_not_found() {
    let app = spawn_app(|_| {}).await;
    let group = create_group(&app, "Editors").await;
    let zed = create_software(&app, "Zed").await;

    let resp = link(&app, group + 50, zed).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = link(&app, group, zed + 50).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn related_software_lists_one_entry_per_shared_group() {
    let app = spawn_app(|_| {}).await;
    let editors = create_group(&app, "Editors").await;
    let terminals = create_group(&app, "Terminal apps").await;
    let vim = create_software(&app, "Vim").await;
    let zed = create_software(&app, "Zed").await;
    let helix = create_software(&app, "Helix").await;

    for (group, software) in [(editors, vim), (editors, zed), (terminals, vim), (terminals, helix), (terminals, zed)] {
        assert_eq!(link(&app, group, software).await.status, StatusCode::OK);
    }

    let resp = app
        .get(&format!("/api/comparison/software/{vim}/groups"))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let rows = resp.body["data"].as_array().expect("list");
    let pairs: Vec<(String, i64)> = rows
        .iter()
        .map(|r| {
            (
                r["name"].as_str().unwrap_or_default().to_string(),
                r["groupInfo"]["id"].as_i64().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Helix".to_string(), terminals),
            ("Zed".to_string(), editors),
            ("Zed".to_string(), terminals),
        ]
    );
    assert_eq!(rows[0]["groupInfo"]["name"], "Terminal apps");
    assert!(rows[0].get("secrets").is_none());

    let resp = app
        .get(&format!("/api/comparison/software/{}/groups", helix + 10))
        .await;
    assert_eq!(resp.body["data"], json!([]));
}

#[tokio::test]
async fn deleting_software_drops_its_memberships() {
    let app = spawn_app(|_| {}).await;
    let group = create_group(&app, "Editors").await;
    let zed = create_software(&app, "Zed").await;
    link(&app, group, zed).await;

    let resp = app
        .delete(&format!("/api/software/{zed}"), Some(USER))
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app
        .get(&format!("/api/comparison/groups/{group}/software"))
        .await;
    assert_eq!(resp.body["data"], json!([]));
}

#[tokio::test]
async fn analysis_is_upserted_per_group() {
    let app = spawn_app(|_| {}).await;
    let group = create_group(&app, "Editors").await;
    let uri = format!("/api/comparison/groups/{group}/analysis");

    let resp = app.get(&uri).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"], Value::Null);

    let resp = app
        .json("POST", &uri, Some(USER), &json!({ "content": "" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "分析内容是必填项");

    let resp = app
        .json("POST", &uri, Some(USER), &json!({ "content": "# v1" }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let first_id = resp.body["data"]["id"].clone();
    assert_eq!(resp.body["data"]["group_id"], group);

    let resp = app
        .json("PUT", &uri, Some(USER), &json!({ "content": "# v2\n" }))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["id"], first_id);

    let resp = app.get(&uri).await;
    assert_eq!(resp.body["data"]["content"], "# v2\n");

    let resp = app
        .json(
            "PUT",
            &format!("/api/comparison/groups/{}/analysis", group + 1),
            Some(USER),
            &json!({ "content": "orphan" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn group_mutations_require_a_user() {
    let app = spawn_app(|_| {}).await;

    let resp = app
        .json("POST", "/api/comparison/groups", None, &json!({ "name": "x" }))
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let resp = app
        .json(
            "PUT",
            "/api/comparison/groups/1/analysis",
            None,
            &json!({ "content": "x" }),
        )
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}
