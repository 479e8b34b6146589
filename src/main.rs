use anyhow::Result;
use product_catalog::{
    config::AppConfig, db, repositories::product_repository::ProductRepository, routes,
    services::file_store::FileStore, state::AppState,
};
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting product-catalog with config: {:?}", cfg);

    // --- Ensure image directory exists ---
    let images = FileStore::new(cfg.images_dir());
    images.ensure_root().await?;
    tracing::info!("Storing images under {}", images.root.display());

    // --- Initialize SQLite connection ---
    let pool = db::connect(&cfg.database_url).await?;

    // --- Schema (idempotent) ---
    db::run_migrations(&pool).await?;
    if migrate {
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Build router ---
    let state = AppState::new(ProductRepository::new(pool), images);
    let app = routes::routes::app(state, cfg.max_upload_bytes);

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
