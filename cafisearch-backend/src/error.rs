use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cafisearch_common::ErrorResponse;
use thiserror::Error;

/// Failures that end a search request
#[derive(Debug, Error)]
pub enum SearchError {
    /// Empty query and no imported data to browse
    #[error("Query parameter is required")]
    MissingParameter,

    /// The query string could not be decoded
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// A required credential for an enabled upstream is unset
    #[error("{0} API key not configured")]
    Config(&'static str),

    /// The upstream answered with a failure status
    #[error("{service} returned status {status}")]
    Upstream {
        service: &'static str,
        status: String,
        message: Option<String>,
    },

    #[error(transparent)]
    Unhandled(#[from] anyhow::Error),
}

impl SearchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchError::MissingParameter => StatusCode::BAD_REQUEST,
            SearchError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            SearchError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SearchError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            SearchError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to API callers; internal details stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            SearchError::MissingParameter => self.to_string(),
            SearchError::InvalidQuery(_) => "Invalid query string".to_string(),
            SearchError::Config("Google Places") => "Google Maps API Key not configured".to_string(),
            SearchError::Config(_) => self.to_string(),
            SearchError::Upstream { service, .. } => format!("Error fetching from {}", service),
            SearchError::Unhandled(_) => "Internal Server Error".to_string(),
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::Unhandled(anyhow::Error::new(e))
    }
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            SearchError::MissingParameter | SearchError::InvalidQuery(_) => {
                tracing::debug!("Rejected search: {}", self)
            }
            SearchError::Upstream { message, .. } => {
                tracing::error!("Upstream error: {} ({})", self, message.as_deref().unwrap_or("no message"))
            }
            _ => tracing::error!("Search error: {:#}", self),
        }
        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Failures of the persistent store; always recovered by falling back
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not connected")]
    Disconnected,

    #[error("store connection lock poisoned")]
    LockPoisoned,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(SearchError::MissingParameter.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            SearchError::InvalidQuery("duplicate field `query`".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SearchError::Config("Google Places").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let upstream = SearchError::Upstream {
            service: "Google Places",
            status: "REQUEST_DENIED".to_string(),
            message: None,
        };
        assert_eq!(upstream.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            SearchError::Unhandled(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_messages_hide_internals() {
        assert_eq!(
            SearchError::Config("Google Places").public_message(),
            "Google Maps API Key not configured"
        );
        let upstream = SearchError::Upstream {
            service: "Google Places",
            status: "OVER_QUERY_LIMIT".to_string(),
            message: Some("quota".to_string()),
        };
        assert_eq!(upstream.public_message(), "Error fetching from Google Places");
        assert_eq!(
            SearchError::Unhandled(anyhow::anyhow!("secret path /etc")).public_message(),
            "Internal Server Error"
        );
    }
}
