///! Google Places Text Search client

use cafisearch_common::Place;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{USER_AGENT, scope_to_city};
use crate::error::SearchError;

const TEXT_SEARCH_PATH: &str = "/maps/api/place/textsearch/json";
/// Bias towards the city centre, "lat,lng"
const LOCATION_BIAS: &str = "35.6892,51.3890";
const SEARCH_RADIUS_METERS: &str = "50000";
const SERVICE_NAME: &str = "Google Places";

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<RawPlace>,
}

impl TextSearchResponse {
    fn is_ok(&self) -> bool {
        self.status == "OK" || self.status == "ZERO_RESULTS"
    }
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    place_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    formatted_address: String,
    geometry: Geometry,
    #[serde(default)]
    rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<RawPlace> for Place {
    fn from(raw: RawPlace) -> Self {
        Place::new(
            raw.place_id,
            raw.name,
            raw.formatted_address,
            raw.geometry.location.lat,
            raw.geometry.location.lng,
        )
        .with_rating(raw.rating.unwrap_or(0.0))
    }
}

pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GooglePlacesClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Run a text search scoped to the city.
    ///
    /// Fails with `Config` when no API key is set and with `Upstream` when
    /// Google reports anything but `OK` or `ZERO_RESULTS`.
    pub async fn text_search(&self, query: &str) -> Result<Vec<Place>, SearchError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(SearchError::Config(SERVICE_NAME));
        };

        let search_query = scope_to_city(query);
        let url = format!("{}{}", self.base_url, TEXT_SEARCH_PATH);

        tracing::debug!("Google Places text search: {}", search_query);

        let response: TextSearchResponse = self
            .client
            .get(&url)
            .query(&[
                ("query", search_query.as_str()),
                ("key", api_key),
                ("location", LOCATION_BIAS),
                ("radius", SEARCH_RADIUS_METERS),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.is_ok() {
            return Err(SearchError::Upstream {
                service: SERVICE_NAME,
                status: response.status,
                message: response.error_message,
            });
        }

        let total = response.results.len();
        let places: Vec<Place> = response
            .results
            .into_iter()
            .map(Place::from)
            .filter(Place::is_displayable)
            .collect();
        if places.len() < total {
            tracing::debug!("Dropped {} Google results without name or address", total - places.len());
        }

        Ok(places)
    }
}
