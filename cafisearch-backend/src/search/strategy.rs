///! Search strategies, evaluated in order by the orchestrator
///!
///! Each strategy either answers (`Ok(Some(results))`), has no opinion
///! (`Ok(None)`) or fails the request (`Err`).

use async_trait::async_trait;
use cafisearch_common::Place;
use std::sync::Arc;

use super::matcher::{MatchFields, QueryMatcher};
use crate::dataset::Dataset;
use crate::error::SearchError;
use crate::geocode::{GooglePlacesClient, NominatimClient};
use crate::store::{StoreClient, StoreFilter};

/// Entries returned for an empty query
pub const BROWSE_LIMIT: usize = 50;
/// Matches returned from the imported dataset
pub const IMPORTED_LIMIT: usize = 20;
/// Matches returned from the store
pub const STORE_LIMIT: usize = 10;
/// Matches returned from the seed dataset
pub const SEED_LIMIT: usize = 10;

pub type StrategyOutcome = Result<Option<Vec<Place>>, SearchError>;

#[async_trait]
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str) -> StrategyOutcome;
}

/// Empty query: browse the imported dataset, or reject the request
pub struct EmptyQuery {
    dataset: Arc<Dataset>,
}

impl EmptyQuery {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl SearchStrategy for EmptyQuery {
    fn name(&self) -> &'static str {
        "empty-query"
    }

    async fn search(&self, query: &str) -> StrategyOutcome {
        if !query.is_empty() {
            return Ok(None);
        }
        let imported = self.dataset.imported();
        if imported.is_empty() {
            return Err(SearchError::MissingParameter);
        }
        Ok(Some(imported.iter().take(BROWSE_LIMIT).cloned().collect()))
    }
}

/// Substring match over the imported dataset; wins whenever it has a hit
pub struct ImportedMatch {
    dataset: Arc<Dataset>,
}

impl ImportedMatch {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl SearchStrategy for ImportedMatch {
    fn name(&self) -> &'static str {
        "imported"
    }

    async fn search(&self, query: &str) -> StrategyOutcome {
        let matcher = QueryMatcher::new(query, MatchFields::NameAddressCategory);
        let results = matcher.filter(self.dataset.imported(), IMPORTED_LIMIT);
        if results.is_empty() {
            Ok(None)
        } else {
            Ok(Some(results))
        }
    }
}

/// Google Places text search; `None` client means the source is disabled
pub struct GooglePlaces {
    client: Option<GooglePlacesClient>,
}

impl GooglePlaces {
    pub fn new(client: Option<GooglePlacesClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchStrategy for GooglePlaces {
    fn name(&self) -> &'static str {
        "google-places"
    }

    async fn search(&self, query: &str) -> StrategyOutcome {
        match &self.client {
            Some(client) => client.text_search(query).await.map(Some),
            None => Ok(None),
        }
    }
}

/// OpenStreetMap Nominatim search; `None` client means the source is disabled
pub struct Nominatim {
    client: Option<NominatimClient>,
}

impl Nominatim {
    pub fn new(client: Option<NominatimClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchStrategy for Nominatim {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn search(&self, query: &str) -> StrategyOutcome {
        match &self.client {
            Some(client) => client.search(query).await.map(Some),
            None => Ok(None),
        }
    }
}

/// Pattern match in the persistent store.
///
/// The query is used as a case-insensitive regular expression. Store
/// failures, including invalid patterns, are logged and yield no opinion so
/// the seed file can answer instead.
pub struct StoreMatch {
    store: Option<Arc<dyn StoreClient>>,
}

impl StoreMatch {
    pub fn new(store: Option<Arc<dyn StoreClient>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SearchStrategy for StoreMatch {
    fn name(&self) -> &'static str {
        "store"
    }

    async fn search(&self, query: &str) -> StrategyOutcome {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        if !store.is_connected() {
            tracing::debug!("Store not connected, skipping");
            return Ok(None);
        }

        let filter = StoreFilter {
            pattern: query.to_string(),
            limit: STORE_LIMIT,
        };
        match store.query(&filter).await {
            Ok(mut places) => {
                places.truncate(STORE_LIMIT);
                places.retain(Place::is_displayable);
                Ok(Some(places))
            }
            Err(e) => {
                tracing::warn!("Database query error, falling back to seed file: {}", e);
                Ok(None)
            }
        }
    }
}

/// Substring match over the seed dataset; always answers
pub struct SeedFile {
    dataset: Arc<Dataset>,
}

impl SeedFile {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl SearchStrategy for SeedFile {
    fn name(&self) -> &'static str {
        "seed-file"
    }

    async fn search(&self, query: &str) -> StrategyOutcome {
        let matcher = QueryMatcher::new(query, MatchFields::NameAddress);
        Ok(Some(matcher.filter(self.dataset.seed(), SEED_LIMIT)))
    }
}
