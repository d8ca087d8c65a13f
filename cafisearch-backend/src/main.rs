use cafisearch_backend::config::BackendConfig;
use cafisearch_backend::dataset::Dataset;
use cafisearch_backend::routes::{self, AppState};
use cafisearch_backend::search::SearchOrchestrator;
use cafisearch_backend::store::{SqliteStore, StoreClient};

use anyhow::Result;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = BackendConfig::load("config.toml")?;

    // Initialize logging
    let _logging_guard = cafisearch_backend::logging::init_logging(
        "logs",
        "cafisearch-backend",
        &config.log_level,
    )?;

    tracing::info!("Cafisearch backend starting...");
    tracing::info!(
        "External sources: google_places={}, osm={}",
        config.use_google_places,
        config.use_osm
    );

    let dataset = Arc::new(Dataset::load(&config.seed_path, &config.imported_path).await?);

    // The store is optional; failing to open it means offline file mode
    let store: Option<Arc<dyn StoreClient>> = match &config.database_path {
        Some(path) => match SqliteStore::open(path) {
            Ok(store) => {
                tracing::info!("Connected to database at {}", path.display());
                Some(Arc::new(store) as Arc<dyn StoreClient>)
            }
            Err(e) => {
                tracing::error!("Database connection error (running in offline file mode): {}", e);
                None
            }
        },
        None => {
            tracing::info!("No DATABASE_PATH configured, store search disabled");
            None
        }
    };

    let orchestrator = SearchOrchestrator::from_config(&config, dataset, store)?;
    tracing::info!("Search chain: {}", orchestrator.strategy_names().join(" -> "));

    let app = routes::router(AppState::new(orchestrator));

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received.");
        })
        .await?;

    Ok(())
}
