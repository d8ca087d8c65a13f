//! Import the scraper's CSV export into the imported café dataset.
//!
//! Usage: `cafisearch-import [CSV_PATH] [JSON_PATH]`

use cafisearch_backend::config::BackendConfig;
use cafisearch_backend::import::import_csv;

const DEFAULT_CSV_PATH: &str = "results.csv";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BackendConfig::load("config.toml")?;
    let _logging_guard =
        cafisearch_backend::logging::init_logging("logs", "cafisearch-import", &config.log_level)?;

    let mut args = std::env::args().skip(1);
    let csv_path = args.next().unwrap_or_else(|| DEFAULT_CSV_PATH.to_string());
    let json_path = args
        .next()
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| config.imported_path.clone());

    match import_csv(&csv_path, &json_path).await {
        Ok(report) => {
            tracing::info!(
                "Import finished: {} written, {} skipped",
                report.written,
                report.skipped
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Import error: {:#}", e);
            Err(e)
        }
    }
}
