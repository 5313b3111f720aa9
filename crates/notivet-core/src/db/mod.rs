//! Database layer for the drug store.

mod drugs;
mod filter;
mod schema;

pub use drugs::*;
pub use filter::*;
pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::models::Drug;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Read capability the matcher needs from a record store.
///
/// Both operations return records newest first.
pub trait DrugStore {
    /// Records matching `filter`, at most `limit`.
    fn find_drugs(&self, filter: &DrugFilter, limit: usize) -> DbResult<Vec<Drug>>;

    /// The `limit` most recently created records, unfiltered.
    fn recent_drugs(&self, limit: usize) -> DbResult<Vec<Drug>>;
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction.
    pub fn transaction(&mut self) -> DbResult<rusqlite::Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}

impl DrugStore for Database {
    fn find_drugs(&self, filter: &DrugFilter, limit: usize) -> DbResult<Vec<Drug>> {
        self.search_drugs(filter, limit)
    }

    fn recent_drugs(&self, limit: usize) -> DbResult<Vec<Drug>> {
        self.list_recent_drugs(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"drugs".to_string()));
    }

    #[test]
    fn test_open_on_disk_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notivet.db");

        {
            let db = Database::open(&path).unwrap();
            let drug = Drug::new("Rimadyl".into(), "Carprofen".into(), "Zoetis".into());
            db.upsert_drug(&drug).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.count_drugs().unwrap(), 1);
    }
}
