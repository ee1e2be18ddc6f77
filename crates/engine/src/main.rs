//! Gangbook Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::HeaderName;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gangbook_domain::EffectType;
use gangbook_engine::api;
use gangbook_engine::app::{App, Collaborators, Repositories};
use gangbook_engine::infrastructure::{
    cache::SnapshotCache,
    clock::SystemClock,
    config::{AppConfig, StoreKind},
    correlation::CORRELATION_ID_HEADER,
    image_storage::FsImageStorage,
    memory::{InMemoryAuditLog, InMemoryStore},
    ports::AuditLogPort,
    side_effects::ChannelSideEffects,
    sqlite::SqliteStore,
};
use gangbook_shared::USER_ID_HEADER;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gangbook_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gangbook Engine");

    let config = AppConfig::from_env()?;

    let (repositories, audit): (Repositories, Arc<dyn AuditLogPort>) = match config.store {
        StoreKind::Sqlite => {
            tracing::info!("Connecting to SQLite at {}", config.database_url);
            let store = SqliteStore::connect(&config.database_url).await?;
            store
                .effects()
                .insert_effect_types(&EffectType::default_catalogue())
                .await?;
            (Repositories::sqlite(&store), Arc::new(store.audit_log()))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            let store = Arc::new(InMemoryStore::with_default_catalogue().await);
            (Repositories::memory(store), Arc::new(InMemoryAuditLog::new()))
        }
    };

    let snapshots = Arc::new(SnapshotCache::new(config.snapshot_ttl));
    let (side_effects, worker) = ChannelSideEffects::new(audit, snapshots.clone());
    worker.spawn();

    let app = Arc::new(App::new(
        repositories,
        Collaborators {
            images: Arc::new(FsImageStorage::new(config.image_root.clone())),
            clock: Arc::new(SystemClock),
            side_effects: Arc::new(side_effects),
        },
        snapshots.clone(),
    ));

    // Evict expired snapshots
    let ttl = config.snapshot_ttl;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ttl.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            let removed = snapshots.cleanup_expired().await;
            if removed > 0 {
                tracing::debug!(removed, "Expired fighter snapshots evicted");
            }
        }
    });

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = config
        .cors_allowed_origins
        .as_deref()
        .and_then(build_cors_layer)
    {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: &str) -> Option<CorsLayer> {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        // The client sends the acting user and a correlation id on every mutation
        .allow_headers([
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(CORRELATION_ID_HEADER),
            axum::http::header::CONTENT_TYPE,
        ])
        .expose_headers([HeaderName::from_static(CORRELATION_ID_HEADER)]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
