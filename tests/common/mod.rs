#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use serde_json::Value;
use softshelf::ai::AiClient;
use softshelf::config::{Config, StorageBackend};
use softshelf::db::DbActorHandle;
use softshelf::secrets::SecretCipher;
use softshelf::server::{AppState, catalog_router};
use softshelf::storage::IconManager;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

pub const USER: &str = "user_test_1";

pub fn unique_temp_path(prefix: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "softshelf-{prefix}-{}-{nanos}-{}.{ext}",
        std::process::id(),
        uuid::Uuid::new_v4().simple()
    ))
}

pub fn sqlite_url(prefix: &str) -> String {
    format!("sqlite:{}", unique_temp_path(prefix, "sqlite").display())
}

pub async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{addr}")).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

pub struct TestApp {
    pub app: Router,
    pub db: DbActorHandle,
    pub cfg: Config,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Router over a fresh SQLite file and icon directory. `configure` runs before anything
/// is built.
pub async fn spawn_app(configure: impl FnOnce(&mut Config)) -> TestApp {
    let mut cfg = Config::default();
    cfg.basic.static_dir = None;
    cfg.basic.secret_key = "integration-test-key".to_string();
    cfg.basic.database_url = sqlite_url("routes");
    cfg.storage.backend = StorageBackend::Local;
    cfg.storage.local.dir = unique_temp_path("icons", "d");
    configure(&mut cfg);

    std::fs::create_dir_all(&cfg.storage.local.dir).expect("create icon dir");

    let cipher = SecretCipher::from_key_material(&cfg.basic.secret_key);
    let db = softshelf::db::spawn(&cfg.basic.database_url, cipher.clone()).await;
    let icons = IconManager::from_config(&cfg.storage).expect("icon store");
    let ai = AiClient::from_config(&cfg.ai).expect("ai client");
    let state = AppState::new(db.clone(), icons, ai, cipher, &cfg.limits);
    let app = catalog_router(state, &cfg);

    TestApp { app, db, cfg }
}

impl TestApp {
    pub fn icon_path(&self, key: &str) -> PathBuf {
        self.cfg.storage.local.dir.join(key)
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let resp = self
            .app
            .clone()
            .oneshot(req)
            .await
            .expect("request failed");
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
    }

    /// JSON request, signed in as `user` when given.
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: &Value,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        self.send(
            builder
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
        )
        .await
    }

    pub async fn delete(&self, uri: &str, user: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        self.send(builder.body(Body::empty()).expect("failed to build request"))
            .await
    }

    /// Multipart upload of one `icon` field.
    pub async fn upload_icon(&self, user: Option<&str>, mime: &str, bytes: &[u8]) -> TestResponse {
        self.send(multipart_request(user, "icon", mime, bytes)).await
    }

    /// Create a software entry and return its JSON row.
    pub async fn create_software(&self, body: &Value) -> Value {
        let resp = self.json("POST", "/api/software", Some(USER), body).await;
        assert_eq!(resp.status, StatusCode::OK, "create failed: {}", resp.body);
        resp.body["data"].clone()
    }
}

pub const BOUNDARY: &str = "softshelf-test-boundary";

pub fn multipart_request(
    user: Option<&str>,
    field: &str,
    mime: &str,
    bytes: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload.bin\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/upload/icon")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    builder
        .body(Body::from(body))
        .expect("failed to build request")
}
