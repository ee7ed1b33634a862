use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use tally_storage::CategoryStore;

mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally_server=info,tower_http=info".into()),
        )
        .init();

    let data_dir = match std::env::var_os("TALLY_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => directories::ProjectDirs::from("com", "tally", "Tally")
            .context("Failed to resolve app data directory")?
            .data_dir()
            .to_path_buf(),
    };
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let store = CategoryStore::open(data_dir.join("categories.json"))
        .context("Failed to load category file")?;
    tracing::info!(
        "Category dictionary: {} ({} categories)",
        store.path().display(),
        store.categories().len()
    );

    let state = Arc::new(Mutex::new(AppState::new(store)));
    let app = routes::router(state);

    let addr = std::env::var("TALLY_ADDR").unwrap_or_else(|_| "127.0.0.1:8750".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Dashboard API listening on http://{addr}");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
