///! In-memory café datasets, loaded once at startup
///!
///! - Seed: checked-in fallback list, required
///! - Imported: CSV-derived list written by `cafisearch-import`, optional

use anyhow::{Context, Result};
use cafisearch_common::Place;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

/// Immutable pair of café lists shared by every request
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    seed: Vec<Place>,
    imported: Vec<Place>,
}

impl Dataset {
    pub fn new(seed: Vec<Place>, imported: Option<Vec<Place>>) -> Self {
        Self {
            seed: normalize_records(seed),
            imported: imported.map(normalize_records).unwrap_or_default(),
        }
    }

    /// Load the seed file (must exist) and the imported file (may be absent)
    pub async fn load(seed_path: impl AsRef<Path>, imported_path: impl AsRef<Path>) -> Result<Self> {
        let seed_path = seed_path.as_ref();
        let seed = read_places(seed_path)
            .await
            .context(format!("Failed to load seed dataset {}", seed_path.display()))?;

        let imported = load_optional(imported_path.as_ref()).await?;

        let dataset = Self::new(seed, imported);
        info!(
            "Loaded datasets: {} seed, {} imported",
            dataset.seed.len(),
            dataset.imported.len()
        );
        Ok(dataset)
    }

    pub fn seed(&self) -> &[Place] {
        &self.seed
    }

    pub fn imported(&self) -> &[Place] {
        &self.imported
    }
}

/// Read the imported dataset; a missing file is the documented "no import
/// yet" state, anything else is an error.
async fn load_optional(path: &Path) -> Result<Option<Vec<Place>>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        info!("No imported dataset at {}, serving seed data only", path.display());
        return Ok(None);
    }

    let places = read_places(path)
        .await
        .context(format!("Failed to load imported dataset {}", path.display()))?;
    Ok(Some(places))
}

/// Dataset entry as found on disk.
///
/// Files written by older importers carry `null` for unparsable
/// coordinates, so every field is optional here and validated afterwards.
#[derive(Debug, Default, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lng: Option<f64>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    place_id: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default)]
    open_hours: Option<Map<String, Value>>,
}

impl RawRecord {
    /// `None` when the record lacks a name, an address or coordinates
    fn into_place(self) -> Option<Place> {
        Some(Place {
            id: self.id.unwrap_or_default(),
            name: self.name?,
            address: self.address?,
            lat: self.lat?,
            lng: self.lng?,
            rating: self.rating.unwrap_or(0.0),
            place_id: self.place_id.unwrap_or_default(),
            category: self.category,
            phone: self.phone,
            website: self.website,
            thumbnail: self.thumbnail,
            images: self.images.unwrap_or_default(),
            open_hours: self.open_hours.unwrap_or_default(),
        })
    }
}

async fn read_places(path: &Path) -> Result<Vec<Place>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .context("Failed to read dataset file")?;
    let records: Vec<RawRecord> = serde_json::from_str(&content).context("Failed to parse dataset file")?;

    let total = records.len();
    let places: Vec<Place> = records.into_iter().filter_map(RawRecord::into_place).collect();
    if places.len() < total {
        warn!(
            "Dropped {} records without name, address or coordinates from {}",
            total - places.len(),
            path.display()
        );
    }
    Ok(places)
}

/// Fill missing ids from `place_id` and drop records that cannot be shown
fn normalize_records(places: Vec<Place>) -> Vec<Place> {
    let total = places.len();
    let kept: Vec<Place> = places
        .into_iter()
        .enumerate()
        .filter_map(|(index, mut place)| {
            if !place.is_displayable() {
                return None;
            }
            if place.id.is_empty() {
                place.id = if place.place_id.is_empty() {
                    index.to_string()
                } else {
                    place.place_id.clone()
                };
            }
            Some(place)
        })
        .collect();

    if kept.len() < total {
        warn!("Dropped {} dataset records without name, address or coordinates", total - kept.len());
    }
    kept
}
