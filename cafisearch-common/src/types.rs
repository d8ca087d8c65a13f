use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A café or location as returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Source-unique identifier (filled from `place_id` when a record has none)
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub rating: f64,
    /// Stable external identifier
    #[serde(default)]
    pub place_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    /// Opening hours, shape depends on the source
    #[serde(default)]
    pub open_hours: Map<String, Value>,
}

impl Place {
    /// Create a place with only the required fields set
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Self {
        let id = id.into();
        Self {
            place_id: id.clone(),
            id,
            name: name.into(),
            address: address.into(),
            lat,
            lng,
            rating: 0.0,
            category: None,
            phone: None,
            website: None,
            thumbnail: None,
            images: Vec::new(),
            open_hours: Map::new(),
        }
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Whether the record can be shown on a map: finite coordinates and
    /// non-empty name and address.
    pub fn is_displayable(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && !self.name.trim().is_empty()
            && !self.address.trim().is_empty()
    }
}

/// Body of a successful `GET /api/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Place>,
}

/// Body of a failed `GET /api/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
