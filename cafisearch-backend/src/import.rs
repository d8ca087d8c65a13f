///! CSV → JSON import of scraped café listings
///!
///! Reads the scraper's CSV export once and writes the imported dataset the
///! backend serves with highest priority.

use anyhow::{Context, Result};
use cafisearch_common::Place;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

/// One CSV row; every column is optional text
#[derive(Debug, Default, Deserialize)]
pub struct CsvRow {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default)]
    pub review_rating: Option<String>,
    #[serde(default)]
    pub data_id: Option<String>,
    #[serde(default)]
    pub input_id: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Option<String>,
    #[serde(default)]
    pub open_hours: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub written: usize,
    pub skipped: usize,
}

/// Trimmed cell value, `None` when empty
fn cell(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `[{"image": "..."}, ...]` → image URLs, empties dropped; malformed → empty
pub fn parse_images(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| s.starts_with('[')) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<Value>>(raw) {
        Ok(entries) => entries
            .iter()
            .filter_map(|entry| entry.get("image").and_then(Value::as_str))
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => {
            debug!("Ignoring malformed images cell: {}", e);
            Vec::new()
        }
    }
}

/// JSON object cell → map; anything else → empty map
pub fn parse_open_hours(raw: Option<&str>) -> Map<String, Value> {
    let Some(raw) = raw.map(str::trim).filter(|s| s.starts_with('{')) else {
        return Map::new();
    };
    match serde_json::from_str::<Map<String, Value>>(raw) {
        Ok(map) => map,
        Err(e) => {
            debug!("Ignoring malformed open_hours cell: {}", e);
            Map::new()
        }
    }
}

fn parse_coordinate(raw: &Option<String>) -> Option<f64> {
    cell(raw)?.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Random identifier for rows without a scraper id
fn random_token() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}

impl CsvRow {
    /// Normalize the row into a place; `None` when it lacks a name, an
    /// address or usable coordinates.
    pub fn into_place(self) -> Option<Place> {
        let name = cell(&self.title)?;
        let address = cell(&self.address)?;
        let lat = parse_coordinate(&self.latitude)?;
        let lng = parse_coordinate(&self.longitude)?;

        let place_id = cell(&self.data_id)
            .or_else(|| cell(&self.input_id))
            .unwrap_or_else(random_token);
        let rating = cell(&self.review_rating)
            .and_then(|r| r.parse::<f64>().ok())
            .filter(|r| r.is_finite())
            .unwrap_or(0.0);

        Some(Place {
            id: place_id.clone(),
            place_id,
            name,
            address,
            lat,
            lng,
            rating,
            category: cell(&self.category),
            phone: cell(&self.phone),
            website: cell(&self.website),
            thumbnail: cell(&self.thumbnail),
            images: parse_images(self.images.as_deref()),
            open_hours: parse_open_hours(self.open_hours.as_deref()),
        })
    }
}

/// Parse raw CSV bytes into places.
///
/// Rows that fail to decode (including invalid UTF-8) are skipped and
/// counted; they never abort the import.
pub fn parse_csv(content: &[u8]) -> (Vec<Place>, ImportReport) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let mut places = Vec::new();
    let mut report = ImportReport::default();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row_number = index + 1;
        match result {
            Ok(row) => match row.into_place() {
                Some(place) => places.push(place),
                None => {
                    report.skipped += 1;
                    warn!("Skipping CSV row {}: missing name, address or coordinates", row_number);
                }
            },
            Err(e) => {
                report.skipped += 1;
                warn!("Error parsing CSV row {}: {}", row_number, e);
            }
        }
    }

    report.written = places.len();
    (places, report)
}

/// Import `csv_path` into `json_path`.
///
/// The output is written to a sibling temp file and renamed into place so
/// readers never observe a partial file.
pub async fn import_csv(csv_path: impl AsRef<Path>, json_path: impl AsRef<Path>) -> Result<ImportReport> {
    let csv_path = csv_path.as_ref();
    let json_path = json_path.as_ref();

    if !tokio::fs::try_exists(csv_path).await.unwrap_or(false) {
        anyhow::bail!("CSV file not found at: {}", csv_path.display());
    }

    let content = tokio::fs::read(csv_path)
        .await
        .context(format!("Failed to read CSV file: {}", csv_path.display()))?;

    let (places, report) = parse_csv(&content);
    info!("Parsed {} records ({} skipped)", report.written, report.skipped);

    let json = serde_json::to_string_pretty(&places).context("Failed to serialize imported cafes")?;

    if let Some(parent) = json_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .context("Failed to create output directory")?;
    }
    let tmp_path = json_path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json)
        .await
        .context("Failed to write temporary output file")?;
    tokio::fs::rename(&tmp_path, json_path)
        .await
        .context(format!("Failed to move output into {}", json_path.display()))?;

    info!("Saved to {}", json_path.display());
    Ok(report)
}
