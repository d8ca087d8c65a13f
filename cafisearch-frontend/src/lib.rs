///! Cafisearch frontend: search box, map view and the client that feeds them

pub mod app;
pub mod client;
pub mod config;
pub mod debounce;
pub mod logging;
pub mod map;
pub mod search_box;
