///! Types shared between the cafisearch backend and frontend

mod types;
pub use types::{ErrorResponse, Place, SearchResponse};

/// Name of the city every search is scoped to
pub const TARGET_CITY: &str = "Tehran";

/// City centre as (lat, lng)
pub const CITY_CENTER: (f64, f64) = (35.6892, 51.3890);
