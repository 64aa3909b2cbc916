use mimalloc::MiMalloc;
use softshelf::ai::AiClient;
use softshelf::config::{CONFIG, StorageBackend};
use softshelf::secrets::SecretCipher;
use softshelf::server::{AppState, catalog_router};
use softshelf::storage::IconManager;
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = &*CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        storage_backend = ?cfg.storage.backend,
        ai_model = %cfg.ai.model,
        ai_key_configured = cfg.ai.api_key.as_deref().is_some_and(|k| !k.trim().is_empty()),
        web_search = cfg.ai.enable_web_search,
    );

    if cfg.uses_dev_secret_key() {
        warn!("basic.secret_key is the development default; secrets are not protected");
    }

    let cipher = SecretCipher::from_key_material(&cfg.basic.secret_key);
    let db = softshelf::db::spawn(&cfg.basic.database_url, cipher.clone()).await;
    match db.ping().await {
        Ok(now) => info!(database_time = %now, "database ready"),
        Err(e) => warn!(error = %e, "database ping failed"),
    }

    if cfg.storage.backend == StorageBackend::Local {
        tokio::fs::create_dir_all(&cfg.storage.local.dir).await?;
    }
    let icons = IconManager::from_config(&cfg.storage)?;
    let ai = AiClient::from_config(&cfg.ai)?;

    let state = AppState::new(db, icons, ai, cipher, &cfg.limits);
    let app = catalog_router(state, cfg);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
