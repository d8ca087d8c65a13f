///! Persistent café store
///!
///! The search chain only needs one capability from the database: a
///! case-insensitive pattern match over name or address. `StoreClient`
///! captures that so tests can inject failing or canned stores.

use async_trait::async_trait;
use cafisearch_common::Place;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Pattern filter applied to `name` OR `address`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFilter {
    /// Regular expression, matched case-insensitively
    pub pattern: String,
    pub limit: usize,
}

#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Whether the store is reachable; a disconnected store is skipped
    fn is_connected(&self) -> bool;

    async fn query(&self, filter: &StoreFilter) -> Result<Vec<Place>, StoreError>;
}

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS cafes (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        place_id   TEXT UNIQUE,
        name       TEXT NOT NULL,
        address    TEXT NOT NULL,
        lat        REAL NOT NULL,
        lng        REAL NOT NULL,
        rating     REAL NOT NULL DEFAULT 0,
        category   TEXT,
        phone      TEXT,
        website    TEXT,
        thumbnail  TEXT,
        images     TEXT NOT NULL DEFAULT '[]',
        open_hours TEXT NOT NULL DEFAULT '{}'
    )";

/// SQLite-backed store
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    /// Cleared once the connection becomes unusable
    connected: Arc<AtomicBool>,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the table exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        register_regexp(&conn)?;
        conn.execute_batch(CREATE_TABLE)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            connected: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Replace every stored café with `places`, in order
    pub fn replace_all(&self, places: &[Place]) -> Result<usize, StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM cafes", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cafes (place_id, name, address, lat, lng, rating, category, phone, website, thumbnail, images, open_hours)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for place in places {
                let place_id = if place.place_id.is_empty() {
                    None
                } else {
                    Some(place.place_id.as_str())
                };
                stmt.execute(params![
                    place_id,
                    place.name,
                    place.address,
                    place.lat,
                    place.lng,
                    place.rating,
                    place.category,
                    place.phone,
                    place.website,
                    place.thumbnail,
                    serde_json::Value::from(place.images.clone()).to_string(),
                    serde_json::Value::Object(place.open_hours.clone()).to_string(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(places.len())
    }

    /// Run a raw statement; lets tests break the schema under a live store
    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        conn.execute_batch(sql)?;
        Ok(())
    }
}

#[async_trait]
impl StoreClient for SqliteStore {
    /// Never touches the connection lock, so it cannot stall an async worker
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn query(&self, filter: &StoreFilter) -> Result<Vec<Place>, StoreError> {
        let conn = self.conn.clone();
        let connected = self.connected.clone();
        let pattern = format!("(?i){}", filter.pattern);
        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);

        let result = tokio::task::spawn_blocking(move || -> Result<Vec<Place>, StoreError> {
            let conn = conn.lock().map_err(|_| {
                connected.store(false, Ordering::Release);
                StoreError::LockPoisoned
            })?;
            let mut stmt = conn.prepare(
                "SELECT id, place_id, name, address, lat, lng, rating, category, phone, website, thumbnail, images, open_hours
                 FROM cafes
                 WHERE name REGEXP ?1 OR address REGEXP ?1
                 ORDER BY id
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![pattern, limit], |row| {
                let id: i64 = row.get(0)?;
                let images: String = row.get(11)?;
                let open_hours: String = row.get(12)?;
                Ok(Place {
                    id: id.to_string(),
                    place_id: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    name: row.get(2)?,
                    address: row.get(3)?,
                    lat: row.get(4)?,
                    lng: row.get(5)?,
                    rating: row.get(6)?,
                    category: row.get(7)?,
                    phone: row.get(8)?,
                    website: row.get(9)?,
                    thumbnail: row.get(10)?,
                    images: serde_json::from_str(&images).unwrap_or_default(),
                    open_hours: serde_json::from_str(&open_hours).unwrap_or_default(),
                })
            })?;

            let mut places = Vec::new();
            for place in rows {
                places.push(place?);
            }
            Ok(places)
        })
        .await;

        match result {
            Ok(places) => places,
            Err(e) => {
                tracing::error!("Store query task failed: {}", e);
                self.connected.store(false, Ordering::Release);
                Err(StoreError::Disconnected)
            }
        }
    }
}

/// `X REGEXP Y` calls `regexp(Y, X)`; the compiled pattern is cached per
/// statement.
fn register_regexp(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let re: Arc<Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                Ok(Regex::new(vr.as_str()?)?)
            })?;
            let text = ctx
                .get_raw(1)
                .as_str()
                .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?;
            Ok(re.is_match(text))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_places() -> Vec<Place> {
        vec![
            Place::new("a", "Cafe Lamiz", "Vali Asr St", 35.75, 51.41).with_rating(4.2),
            Place::new("b", "Sam Cafe", "Tajrish Sq", 35.80, 51.43),
            Place::new("c", "Perague", "Enghelab St", 35.70, 51.39),
        ]
    }

    fn filter(pattern: &str) -> StoreFilter {
        StoreFilter {
            pattern: pattern.to_string(),
            limit: 10,
        }
    }

    #[tokio::test]
    async fn test_query_matches_name_or_address_case_insensitively() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.replace_all(&sample_places()).unwrap(), 3);
        assert!(store.is_connected());

        let results = store.query(&filter("CAFE")).await.unwrap();
        let names: Vec<&str> = results.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cafe Lamiz", "Sam Cafe"]);
        assert_eq!(results[0].place_id, "a");
        assert_eq!(results[0].rating, 4.2);

        let results = store.query(&filter("enghelab")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Perague");
    }

    #[tokio::test]
    async fn test_query_is_a_regex() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_places()).unwrap();

        let results = store.query(&filter("^sam")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Sam Cafe");
    }

    #[tokio::test]
    async fn test_query_respects_limit() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_places()).unwrap();

        let results = store
            .query(&StoreFilter {
                pattern: "a".to_string(),
                limit: 2,
            })
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_a_store_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_places()).unwrap();

        assert!(store.query(&filter("(unclosed")).await.is_err());
    }

    #[tokio::test]
    async fn test_replace_all_clears_previous_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_places()).unwrap();
        store
            .replace_all(&[Place::new("z", "Zhinous", "Karimkhan St", 35.71, 51.42)])
            .unwrap();

        let results = store.query(&filter(".")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Zhinous");
    }

    #[test]
    fn test_is_connected_does_not_wait_for_lock() {
        let store = SqliteStore::open_in_memory().unwrap();
        let _held = store.conn.lock().unwrap();
        assert!(store.is_connected());
    }

    #[tokio::test]
    async fn test_poisoned_lock_marks_store_disconnected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_places()).unwrap();

        let conn = store.conn.clone();
        let _ = std::thread::spawn(move || {
            let _guard = conn.lock().unwrap();
            panic!("poison the connection lock");
        })
        .join();

        assert!(matches!(
            store.query(&filter("cafe")).await,
            Err(StoreError::LockPoisoned)
        ));
        assert!(!store.is_connected());
    }

    #[tokio::test]
    async fn test_dropped_table_is_a_store_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.replace_all(&sample_places()).unwrap();
        store.execute_batch("DROP TABLE cafes").unwrap();

        assert!(matches!(
            store.query(&filter("cafe")).await,
            Err(StoreError::Database(_))
        ));
    }
}
