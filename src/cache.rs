use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use tracing::info;

use crate::error::CacheError;
use crate::model::ScrapeSnapshot;

pub const KEY_NEW_RELEASES: &str = "jiosaavn:newReleases";
pub const KEY_TOP_CHARTS: &str = "jiosaavn:topCharts";
pub const KEY_TOP_PLAYLISTS: &str = "jiosaavn:topPlaylists";
pub const KEY_TOP_ARTISTS: &str = "jiosaavn:topArtists";
pub const KEY_HOME_PAGE: &str = "jiosaavn:homePage";
pub const KEY_LAST_SCRAPED: &str = "jiosaavn:lastScraped";
pub const KEY_ALL: &str = "jiosaavn:all";

/// String key/value store on one SQLite connection. No TTL; values live until overwritten.
pub struct Cache {
    conn: Mutex<Connection>,
}

impl Cache {
    /// Open (or create) the cache database file.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!("Cache connected at {}", path.display());
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cache_entries (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(Cache {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.lock()?.execute(
            "INSERT INTO cache_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let value = self
            .lock()?
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.set(key, &serde_json::to_string(value)?)
    }

    /// Overwrite every snapshot key. The full snapshot goes last.
    ///
    /// Keys written before a failure stay written.
    pub fn store_snapshot(&self, snapshot: &ScrapeSnapshot) -> Result<(), CacheError> {
        self.set_json(KEY_NEW_RELEASES, &snapshot.new_releases)?;
        self.set_json(KEY_TOP_CHARTS, &snapshot.top_charts)?;
        self.set_json(KEY_TOP_PLAYLISTS, &snapshot.top_playlists)?;
        self.set_json(KEY_TOP_ARTISTS, &snapshot.top_artists)?;
        self.set_json(KEY_HOME_PAGE, &snapshot.home_page)?;
        self.set(KEY_LAST_SCRAPED, &snapshot.scraped_at_string())?;
        self.set_json(KEY_ALL, snapshot)?;
        Ok(())
    }

    /// Last stored snapshot, decoded.
    pub fn load_snapshot(&self) -> Result<Option<ScrapeSnapshot>, CacheError> {
        match self.get(KEY_ALL)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn close(self) -> Result<(), CacheError> {
        let conn = self.conn.into_inner().map_err(|_| CacheError::Poisoned)?;
        conn.close().map_err(|(_, e)| CacheError::Storage(e))?;
        info!("Cache disconnected");
        Ok(())
    }
}
