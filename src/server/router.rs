use crate::ai::AiClient;
use crate::config::{Config, LimitsConfig, StorageBackend};
use crate::db::DbActorHandle;
use crate::error::CatalogError;
use crate::secrets::SecretCipher;
use crate::server::guards::rate_limit::{IpAllowlist, RateLimiters};
use crate::server::routes::{ai, comparison, health, software, upload};
use crate::storage::IconManager;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef, Request},
    http::{
        HeaderName, HeaderValue, StatusCode, Version,
        header::{REFERRER_POLICY, USER_AGENT, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
    },
    middleware::{self, Next},
    response::Response,
    routing::any,
};
use base64::Engine as _;
use rand::RngCore;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
};
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DbActorHandle,
    pub icons: IconManager,
    pub ai: AiClient,
    pub cipher: SecretCipher,
    pub limiters: Arc<RateLimiters>,
    pub ip_allowlist: IpAllowlist,
}

impl AppState {
    pub fn new(
        db: DbActorHandle,
        icons: IconManager,
        ai: AiClient,
        cipher: SecretCipher,
        limits: &LimitsConfig,
    ) -> Self {
        Self {
            db,
            icons,
            ai,
            cipher,
            limiters: Arc::new(RateLimiters::from_config(limits)),
            ip_allowlist: IpAllowlist(Arc::from(limits.ip_whitelist.clone())),
        }
    }
}

impl FromRef<AppState> for Arc<RateLimiters> {
    fn from_ref(state: &AppState) -> Self {
        state.limiters.clone()
    }
}

impl FromRef<AppState> for IpAllowlist {
    fn from_ref(state: &AppState) -> Self {
        state.ip_allowlist.clone()
    }
}

async fn api_not_found() -> CatalogError {
    CatalogError::NotFound("接口不存在")
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(generate_request_id, str::to_string);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = crate::utils::logging::elapsed_ms(start);
    let path = uri.path();
    let protocol = format_http_version(version);

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

pub fn catalog_router(state: AppState, cfg: &Config) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(software::router())
        .merge(comparison::router())
        .merge(upload::router())
        .merge(ai::router())
        .route("/api/{*rest}", any(api_not_found));

    // Local icons are served from disk under their public prefix.
    let icons_prefix = cfg.storage.local.public_base.trim_end_matches('/');
    if cfg.storage.backend == StorageBackend::Local
        && icons_prefix.starts_with('/')
        && icons_prefix.len() > 1
    {
        app = app.nest_service(icons_prefix, ServeDir::new(&cfg.storage.local.dir));
    }

    // SPA build output, with client-side routes falling back to index.html.
    app = match cfg.basic.static_dir.as_deref() {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "serving SPA assets");
            app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))))
        }
        _ => app.fallback(not_found_handler),
    };

    app.with_state(state)
        .layer(DefaultBodyLimit::max(cfg.basic.json_limit))
        .layer(SetResponseHeaderLayer::if_not_present(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors_layer(&cfg.basic.cors_origins))
        .layer(middleware::from_fn(access_log))
}
