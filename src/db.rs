//! SQLite store for geocoded locations and restaurant listings
//!
//! Two tables, `Google` and `Yelp`, linked by `Yelp.GoogleId -> Google.Id`. The
//! link is not enforced. Both tables are dropped and recreated at the start of
//! every query cycle.

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::{GeoLocation, RestaurantListing};

/// File name of the database inside the default data directory
const DATABASE_FILE_NAME: &str = "yelp.db";

const JOIN_ON_SEARCH: &str =
    "FROM Yelp JOIN Google ON GoogleId = Google.Id WHERE Google.SearchString = ?1";

/// Errors that can occur when opening the database file
#[derive(Debug, Error)]
pub enum OpenError {
    /// The directory holding the database could not be created
    #[error("Failed to create database directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("conn", &"<sqlite>")
            .finish()
    }
}

impl Database {
    /// Returns the default database path, e.g. `~/.local/share/restaurant-scout/yelp.db`
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "restaurant-scout")?;
        Some(project_dirs.data_dir().join(DATABASE_FILE_NAME))
    }

    /// Open (or create) a database at the given path with both tables present
    pub fn open(path: &Path) -> Result<Self, OpenError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| OpenError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let db = Self {
            conn: Connection::open(path)?,
        };
        db.create_tables()?;
        Ok(db)
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.create_tables()?;
        Ok(db)
    }

    /// Drops both tables and recreates them empty
    pub fn reinit(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "DROP TABLE IF EXISTS Google;
             DROP TABLE IF EXISTS Yelp;",
        )?;
        self.create_tables()
    }

    fn create_tables(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS Yelp (
                Id INTEGER PRIMARY KEY,
                Name TEXT,
                Type TEXT,
                Rating REAL,
                Price TEXT,
                Address TEXT,
                Distance REAL,
                GoogleId INTEGER
            );
            CREATE TABLE IF NOT EXISTS Google (
                Id INTEGER PRIMARY KEY,
                Latitude REAL,
                Longitude REAL,
                State TEXT,
                Country TEXT,
                SearchString TEXT
            );",
        )
    }

    /// Stores a location and returns its row id
    pub fn insert_location(&self, location: &GeoLocation) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO Google (Latitude, Longitude, State, Country, SearchString)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                location.latitude,
                location.longitude,
                location.state,
                location.country,
                location.search_string,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Id of the first location stored at exactly these coordinates
    pub fn location_id(&self, latitude: f64, longitude: f64) -> rusqlite::Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT Id FROM Google WHERE Latitude = ?1 AND Longitude = ?2 ORDER BY Id LIMIT 1",
                params![latitude, longitude],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn insert_listing(
        &self,
        listing: &RestaurantListing,
        location_id: i64,
    ) -> rusqlite::Result<i64> {
        self.conn.execute(
            "INSERT INTO Yelp (Name, Type, Rating, Price, Address, Distance, GoogleId)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                listing.name,
                listing.category,
                listing.rating,
                listing.price,
                listing.address,
                listing.distance,
                location_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn location_count(&self) -> rusqlite::Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Google", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn listing_count(&self) -> rusqlite::Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Yelp", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// `(rating, price)` of every listing found for `search_string`
    pub fn rating_price_rows(&self, search_string: &str) -> rusqlite::Result<Vec<(f64, String)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT Rating, Price {} ORDER BY Yelp.Id", JOIN_ON_SEARCH))?;
        let rows = stmt.query_map([search_string], |row| {
            Ok((row.get::<_, f64>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect()
    }

    pub fn distances(&self, search_string: &str) -> rusqlite::Result<Vec<f64>> {
        self.column(search_string, "Distance")
    }

    pub fn categories(&self, search_string: &str) -> rusqlite::Result<Vec<String>> {
        self.column(search_string, "Type")
    }

    pub fn ratings(&self, search_string: &str) -> rusqlite::Result<Vec<f64>> {
        self.column(search_string, "Rating")
    }

    fn column<V: rusqlite::types::FromSql>(
        &self,
        search_string: &str,
        column: &str,
    ) -> rusqlite::Result<Vec<V>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT Yelp.{} {} ORDER BY Yelp.Id",
            column, JOIN_ON_SEARCH
        ))?;
        let rows = stmt.query_map([search_string], |row| row.get::<_, V>(0))?;
        rows.collect()
    }
}
