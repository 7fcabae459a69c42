use anyhow::{Context, Result};
use axum::Router;
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::{fs, net::TcpListener};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;

use services::{
    asset_service::AssetService, object_client::BucketClient, storage_service::StorageService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!(
        host = %cfg.host,
        port = cfg.port,
        bucket = %cfg.bucket,
        root = %cfg.root_prefix,
        storage_dir = %cfg.storage_dir,
        database_url = %cfg.database_url,
        admin_token_configured = cfg.admin_token.is_some(),
        "starting config-store"
    );

    // --- Ensure storage directory exists ---
    if !Path::new(&cfg.storage_dir).exists() {
        fs::create_dir_all(&cfg.storage_dir).await?;
        tracing::info!("Created storage directory at {}", cfg.storage_dir);
    }

    // --- Initialize SQLite connection + schema ---
    let db = Arc::new(db::connect(&cfg.database_url).await?);
    db::run_migrations(&db)
        .await
        .context("applying database migrations")?;

    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize core services ---
    let storage = StorageService::new(db.clone(), cfg.storage_dir.clone());
    storage
        .ensure_bucket(&cfg.bucket)
        .await
        .with_context(|| format!("preparing bucket `{}`", cfg.bucket))?;

    let assets = AssetService::new(
        BucketClient::new(storage.clone(), cfg.bucket.clone()),
        cfg.root_prefix.clone(),
        cfg.store_timeout,
        cfg.list_page_size,
    );

    if cfg.admin_token.is_none() {
        tracing::warn!("no admin token configured; every admin request will be rejected");
    }
    let sessions = auth::SessionValidator::new(cfg.admin_token.clone());

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state::AppState::new(
        storage,
        cfg.bucket.clone(),
        assets,
        sessions,
    ));

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
