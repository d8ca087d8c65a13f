///! Search orchestration
///!
///! A query runs through an ordered chain of strategies; the first one that
///! answers wins:
///! 1. Empty query → imported browse set (or `MissingParameter`)
///! 2. Imported dataset substring match
///! 3. Google Places (when enabled)
///! 4. Nominatim (when enabled and Google is not)
///! 5. Persistent store (when no external source is enabled)
///! 6. Seed dataset substring match

mod matcher;
pub use matcher::{MatchFields, QueryMatcher};

mod strategy;
pub use strategy::{
    BROWSE_LIMIT, EmptyQuery, GooglePlaces, IMPORTED_LIMIT, ImportedMatch, Nominatim, SEED_LIMIT,
    STORE_LIMIT, SearchStrategy, SeedFile, StoreMatch, StrategyOutcome,
};

use anyhow::Context;
use cafisearch_common::Place;
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::dataset::Dataset;
use crate::error::SearchError;
use crate::geocode::{GooglePlacesClient, NominatimClient};
use crate::store::StoreClient;

pub struct SearchOrchestrator {
    strategies: Vec<Box<dyn SearchStrategy>>,
}

impl SearchOrchestrator {
    /// Build from an explicit chain, evaluated front to back
    pub fn new(strategies: Vec<Box<dyn SearchStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn builder(dataset: Arc<Dataset>) -> OrchestratorBuilder {
        OrchestratorBuilder {
            dataset,
            google: None,
            osm: None,
            store: None,
        }
    }

    /// Wire the chain from configuration flags.
    ///
    /// Google takes precedence when both external sources are enabled; the
    /// store only takes part when neither is.
    pub fn from_config(
        config: &BackendConfig,
        dataset: Arc<Dataset>,
        store: Option<Arc<dyn StoreClient>>,
    ) -> anyhow::Result<Self> {
        let mut builder = Self::builder(dataset);

        if config.use_google_places {
            if config.use_osm {
                tracing::warn!("Both USE_GOOGLE_PLACES and USE_OSM are set, using Google Places");
            }
            let client = GooglePlacesClient::new(
                config.google_places_url.clone(),
                config.google_maps_api_key.clone(),
                config.request_timeout(),
            )
            .context("Failed to build Google Places client")?;
            builder = builder.google(client);
        } else if config.use_osm {
            let client = NominatimClient::new(config.nominatim_url.clone(), config.request_timeout())
                .context("Failed to build Nominatim client")?;
            builder = builder.osm(client);
        } else if let Some(store) = store {
            builder = builder.store(store);
        }

        Ok(builder.build())
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Place>, SearchError> {
        for strategy in &self.strategies {
            if let Some(results) = strategy.search(query).await? {
                tracing::debug!(
                    "Query '{}' answered by {} with {} results",
                    query,
                    strategy.name(),
                    results.len()
                );
                return Ok(results);
            }
        }
        tracing::debug!("Query '{}' matched no strategy", query);
        Ok(Vec::new())
    }
}

/// Assembles the standard six-step chain
pub struct OrchestratorBuilder {
    dataset: Arc<Dataset>,
    google: Option<GooglePlacesClient>,
    osm: Option<NominatimClient>,
    store: Option<Arc<dyn StoreClient>>,
}

impl OrchestratorBuilder {
    pub fn google(mut self, client: GooglePlacesClient) -> Self {
        self.google = Some(client);
        self
    }

    pub fn osm(mut self, client: NominatimClient) -> Self {
        self.osm = Some(client);
        self
    }

    pub fn store(mut self, store: Arc<dyn StoreClient>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> SearchOrchestrator {
        // Exactly one external source may be active, Google first
        let osm = if self.google.is_some() { None } else { self.osm };
        let store = if self.google.is_some() || osm.is_some() {
            None
        } else {
            self.store
        };

        SearchOrchestrator::new(vec![
            Box::new(EmptyQuery::new(self.dataset.clone())),
            Box::new(ImportedMatch::new(self.dataset.clone())),
            Box::new(GooglePlaces::new(self.google)),
            Box::new(Nominatim::new(osm)),
            Box::new(StoreMatch::new(store)),
            Box::new(SeedFile::new(self.dataset)),
        ])
    }
}
