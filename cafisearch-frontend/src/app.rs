///! Ties the search box and the map to the API client

use cafisearch_common::Place;

use crate::client::ApiClient;
use crate::map::MapView;
use crate::search_box::{Key, SearchBox};

pub struct App {
    client: ApiClient,
    pub search_box: SearchBox,
    pub map: MapView,
}

impl App {
    pub fn new(client: ApiClient, reduced_motion: bool) -> Self {
        Self {
            client,
            search_box: SearchBox::new(),
            map: MapView::new(reduced_motion),
        }
    }

    /// Show the browse set on the map
    pub async fn load_initial(&mut self) {
        let places = self.client.search_cafes("").await;
        tracing::info!("Loaded {} places for browsing", places.len());
        self.map.set_places(&places);
    }

    pub fn input(&mut self, value: &str) {
        self.search_box.input(value);
    }

    /// Run the search for a debounced value
    pub async fn settle(&mut self, value: &str) {
        let Some(query) = self.search_box.settle(value) else {
            return;
        };
        let results = self.client.search_cafes(&query).await;
        if self.search_box.set_results(&query, results.clone()) {
            self.map.clear_selection();
            self.map.set_places(&results);
        }
    }

    /// Navigation key; a picked place is focused on the map
    pub fn key(&mut self, key: Key) -> Option<Place> {
        let place = self.search_box.handle_key(key)?;
        self.map.select(&place);
        Some(place)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cafe(id: &str, name: &str, lat: f64) -> serde_json::Value {
        json!({"id": id, "name": name, "address": "Tehran", "lat": lat, "lng": 51.4})
    }

    async fn backend() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("query", ""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [cafe("b1", "Browse One", 35.70), cafe("b2", "Browse Two", 35.72)]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("query", "lamiz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [cafe("l1", "Cafe Lamiz", 35.75), cafe("l2", "Lamiz Tajrish", 35.80)]
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_startup_loads_browse_set() {
        let server = backend().await;
        let mut app = App::new(ApiClient::new(server.uri()).unwrap(), false);
        app.load_initial().await;
        assert_eq!(app.map.markers().len(), 2);
        assert!(app.search_box.visible_results().is_empty());
    }

    #[tokio::test]
    async fn test_search_then_pick() {
        let server = backend().await;
        let mut app = App::new(ApiClient::new(server.uri()).unwrap(), false);
        app.load_initial().await;

        app.input("lamiz");
        app.settle("lamiz").await;
        assert_eq!(app.search_box.visible_results().len(), 2);
        assert_eq!(app.map.markers()[0].id, "l1");

        app.key(Key::Down);
        app.key(Key::Down);
        let picked = app.key(Key::Enter).unwrap();
        assert_eq!(picked.id, "l2");
        assert_eq!(app.search_box.query(), "Lamiz Tajrish");
        assert_eq!(app.map.selected().unwrap().id, "l2");
        assert_eq!(app.map.camera().zoom, 17.0);
    }

    #[tokio::test]
    async fn test_backend_down_renders_nothing() {
        let mut app = App::new(ApiClient::new("http://127.0.0.1:1/api").unwrap(), false);
        app.load_initial().await;
        app.input("lamiz");
        app.settle("lamiz").await;
        assert!(app.map.markers().is_empty());
        assert!(app.search_box.visible_results().is_empty());
        assert!(!app.search_box.is_loading());
    }
}
