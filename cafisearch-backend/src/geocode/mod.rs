///! External geocoding clients
///!
///! Two alternate remote lookups, selected by configuration:
///! - `GooglePlacesClient`: Google Places Text Search
///! - `NominatimClient`: OpenStreetMap Nominatim, bounded to the city

pub mod google;
pub mod osm;

pub use google::GooglePlacesClient;
pub use osm::NominatimClient;

use cafisearch_common::TARGET_CITY;

/// User agent sent to upstream services
pub const USER_AGENT: &str = "CafiSearch-App/1.0";

/// Scope a free-text query to the target city.
///
/// Appends " in Tehran" unless the query already mentions the city
/// (case-insensitive).
pub fn scope_to_city(query: &str) -> String {
    if query.to_lowercase().contains(&TARGET_CITY.to_lowercase()) {
        query.to_string()
    } else {
        format!("{} in {}", query, TARGET_CITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_to_city_appends_once() {
        assert_eq!(scope_to_city("lamiz"), "lamiz in Tehran");
        assert_eq!(scope_to_city("cafe TEHRAN north"), "cafe TEHRAN north");
        assert_eq!(scope_to_city(&scope_to_city("cafe")), "cafe in Tehran");
    }

    #[test]
    fn test_scope_to_city_keeps_persian_text() {
        assert_eq!(scope_to_city("کافه"), "کافه in Tehran");
    }
}
