mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use common::{USER, spawn_app};
use serde_json::json;
use std::net::IpAddr;

#[tokio::test]
async fn write_quota_answers_429_with_retry_after() {
    let app = spawn_app(|cfg| cfg.limits.write.max = 1).await;
    let body = json!({ "name": "Vim", "category": "editor" });

    let resp = app.json("POST", "/api/software", Some(USER), &body).await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app.json("POST", "/api/software", Some(USER), &body).await;
    assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp.headers["retry-after"]
        .to_str()
        .expect("ascii")
        .parse()
        .expect("seconds");
    assert!(retry_after >= 1);

    // Quotas are per user.
    let resp = app.json("POST", "/api/software", Some("someone-else"), &body).await;
    assert_eq!(resp.status, StatusCode::OK);

    // Reads are not throttled.
    assert_eq!(app.get("/api/software").await.status, StatusCode::OK);
}

#[tokio::test]
async fn zero_max_disables_a_limiter() {
    let app = spawn_app(|cfg| cfg.limits.write.max = 0).await;
    for _ in 0..5 {
        let resp = app
            .json("POST", "/api/comparison/groups", Some(USER), &json!({ "name": "g" }))
            .await;
        assert_eq!(resp.status, StatusCode::OK);
    }
}

fn reveal_from(ip: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .expect("failed to build request")
}

#[tokio::test]
async fn secret_reveal_honours_the_ip_allowlist() {
    let allowed: IpAddr = "203.0.113.7".parse().expect("ip");
    let app = spawn_app(move |cfg| cfg.limits.ip_whitelist = vec![allowed]).await;
    let row = app
        .create_software(&json!({
            "name": "Vault",
            "category": "security",
            "secrets": [{ "label": "root", "value": "s.abcdef" }]
        }))
        .await;
    let uri = format!(
        "/api/software/{}/secret/{}",
        row["id"],
        row["secrets"][0]["id"].as_str().expect("secret id")
    );

    let resp = app.send(reveal_from("198.51.100.1", &uri)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app.get(&uri).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app.send(reveal_from("203.0.113.7, 10.0.0.1", &uri)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["value"], "s.abcdef");
}

#[tokio::test]
async fn secret_quota_is_keyed_by_ip() {
    let app = spawn_app(|cfg| cfg.limits.secret.max = 2).await;
    let row = app
        .create_software(&json!({
            "name": "Vault",
            "category": "security",
            "secrets": [{ "label": "root", "value": "s.abcdef" }]
        }))
        .await;
    let uri = format!(
        "/api/software/{}/secret/{}",
        row["id"],
        row["secrets"][0]["id"].as_str().expect("secret id")
    );

    for _ in 0..2 {
        let resp = app.send(reveal_from("198.51.100.1", &uri)).await;
        assert_eq!(resp.status, StatusCode::OK);
    }
    let resp = app.send(reveal_from("198.51.100.1", &uri)).await;
    assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers.contains_key("retry-after"));

    let resp = app.send(reveal_from("198.51.100.2", &uri)).await;
    assert_eq!(resp.status, StatusCode::OK);
}
