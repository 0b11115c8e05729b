use anyhow::Result;
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use user_bucket_api::{
    AppState, app,
    config::AppConfig,
    logging,
    services::{object_storage::S3ObjectStorage, user_store::SqliteUserStore},
};

const MAX_DB_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    // --- Logging setup ---
    logging::init(cfg.log_format);

    tracing::info!("Starting user-bucket-api with config: {:?}", cfg);

    // --- Ensure the database directory exists ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    tracing::debug!("Interpreted SQLite path => {}", db_path);

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    // --- Initialize the document store ---
    let users = SqliteUserStore::connect(&cfg.database_url, MAX_DB_CONNECTIONS).await?;
    let applied = users.migrate().await?;
    tracing::info!("Applied {} schema statements.", applied);

    // --- Handle migration mode ---
    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize the object-storage client ---
    let objects = S3ObjectStorage::connect(cfg.s3_settings()).await;

    // --- Build router ---
    let state = AppState::new(Arc::new(users), Arc::new(objects));
    let router = app(state);

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
    axum::serve(listener, router).await?;

    Ok(())
}
