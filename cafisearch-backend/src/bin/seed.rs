//! Replace the database contents with the seed dataset.

use anyhow::Context;
use cafisearch_backend::config::BackendConfig;
use cafisearch_backend::dataset::Dataset;
use cafisearch_backend::store::SqliteStore;

const DEFAULT_DATABASE_PATH: &str = "data/cafisearch.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BackendConfig::load("config.toml")?;
    let _logging_guard =
        cafisearch_backend::logging::init_logging("logs", "cafisearch-seed", &config.log_level)?;

    let database_path = match &config.database_path {
        Some(path) => path.clone(),
        None => {
            tracing::info!("DATABASE_PATH not set, assuming {}", DEFAULT_DATABASE_PATH);
            DEFAULT_DATABASE_PATH.into()
        }
    };

    let dataset = Dataset::load(&config.seed_path, &config.imported_path).await?;
    let store = SqliteStore::open(&database_path)
        .context(format!("Failed to open database {}", database_path.display()))?;
    tracing::info!("Database opened at {}", database_path.display());

    let count = store
        .replace_all(dataset.seed())
        .context("Failed to seed cafes")?;
    tracing::info!("Seeded {} cafes", count);

    Ok(())
}
