pub mod config;
pub mod dataset;
pub mod error;
pub mod geocode;
pub mod import;
pub mod logging;
pub mod routes;
pub mod search;
pub mod store;
