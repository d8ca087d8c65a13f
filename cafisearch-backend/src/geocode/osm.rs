///! OpenStreetMap Nominatim search client
///!
///! Nominatim has no ratings, so every result carries a constant placeholder.

use cafisearch_common::Place;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{USER_AGENT, scope_to_city};
use crate::error::SearchError;

const SEARCH_PATH: &str = "/search";
/// Bounding box around the city: "min_lon,min_lat,max_lon,max_lat"
const CITY_VIEWBOX: &str = "51.0,35.5,51.7,35.9";
const RESULT_LIMIT: usize = 10;
const PLACEHOLDER_RATING: f64 = 4.5;
const RESULT_LANGUAGE: &str = "fa";

#[derive(Debug, Deserialize)]
struct RawPlace {
    place_id: u64,
    #[serde(default)]
    name: Option<String>,
    display_name: String,
    lat: String,
    lon: String,
}

impl RawPlace {
    /// Explicit name, or the first comma-delimited segment of the display name
    fn display_title(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .display_name
                .split(',')
                .next()
                .unwrap_or_default()
                .trim()
                .to_string(),
        }
    }

    fn into_place(self) -> Option<Place> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lon.trim().parse::<f64>().ok()?;
        let name = self.display_title();
        let place = Place::new(self.place_id.to_string(), name, self.display_name, lat, lng)
            .with_rating(PLACEHOLDER_RATING);
        Some(place)
    }
}

pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        // Nominatim's usage policy requires an identifying User-Agent
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Search within the city bounding box, Persian results, at most 10
    pub async fn search(&self, query: &str) -> Result<Vec<Place>, SearchError> {
        let search_query = scope_to_city(query);
        let limit = RESULT_LIMIT.to_string();
        let url = format!("{}{}", self.base_url, SEARCH_PATH);

        tracing::debug!("Nominatim search: {}", search_query);

        let raw: Vec<RawPlace> = self
            .client
            .get(&url)
            .query(&[
                ("q", search_query.as_str()),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
                ("viewbox", CITY_VIEWBOX),
                ("bounded", "1"),
                ("accept-language", RESULT_LANGUAGE),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let places: Vec<Place> = raw
            .into_iter()
            .filter_map(RawPlace::into_place)
            .filter(Place::is_displayable)
            .take(RESULT_LIMIT)
            .collect();

        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> NominatimClient {
        NominatimClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    fn raw(place_id: u64, name: Option<&str>, display_name: &str) -> serde_json::Value {
        json!({
            "place_id": place_id,
            "name": name,
            "display_name": display_name,
            "lat": "35.7001",
            "lon": "51.4002"
        })
    }

    #[test]
    fn test_display_title_fallback() {
        let place: RawPlace =
            serde_json::from_value(raw(1, None, "کافه نادری, خیابان جمهوری, تهران")).unwrap();
        assert_eq!(place.display_title(), "کافه نادری");

        let place: RawPlace = serde_json::from_value(raw(2, Some(""), "Cafe Naderi, Jomhouri St")).unwrap();
        assert_eq!(place.display_title(), "Cafe Naderi");

        let place: RawPlace = serde_json::from_value(raw(3, Some("Naderi"), "Cafe Naderi, Jomhouri St")).unwrap();
        assert_eq!(place.display_title(), "Naderi");
    }

    #[tokio::test]
    async fn test_search_sends_bounded_persian_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .and(query_param("q", "naderi in Tehran"))
            .and(query_param("format", "json"))
            .and(query_param("addressdetails", "1"))
            .and(query_param("limit", "10"))
            .and(query_param("viewbox", "51.0,35.5,51.7,35.9"))
            .and(query_param("bounded", "1"))
            .and(query_param("accept-language", "fa"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([raw(42, None, "Cafe Naderi, Jomhouri St, Tehran")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let places = client(&server).search("naderi").await.unwrap();
        assert_eq!(places.len(), 1);
        let place = &places[0];
        assert_eq!(place.id, "42");
        assert_eq!(place.place_id, "42");
        assert_eq!(place.name, "Cafe Naderi");
        assert_eq!(place.address, "Cafe Naderi, Jomhouri St, Tehran");
        assert_eq!(place.rating, 4.5);
        assert!((place.lat - 35.7001).abs() < 1e-9);
        assert!((place.lng - 51.4002).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_search_caps_results_and_skips_bad_coordinates() {
        let server = MockServer::start().await;
        let mut body: Vec<serde_json::Value> = (1..=12)
            .map(|i| raw(i, Some("Cafe"), &format!("Cafe {i}, Tehran")))
            .collect();
        body[0]["lat"] = json!("not-a-number");
        Mock::given(method("GET"))
            .and(path(SEARCH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(body)))
            .mount(&server)
            .await;

        let places = client(&server).search("cafe tehran").await.unwrap();
        assert_eq!(places.len(), 10);
        assert_eq!(places[0].id, "2");
    }
}
