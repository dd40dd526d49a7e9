/*!
 * SQLite access for the key/value store.
 *
 * One connection per process, guarded by a mutex. Every statement the store
 * needs lives here and runs on the blocking pool so the async translate pass
 * never stalls on disk I/O.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;

/// File name of the store inside the data directory
const STORE_FILENAME: &str = "latinify.db";

/// Directory created under the user's data directory
const STORE_DIRNAME: &str = "latinify";

/// Shared handle to the store database
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    db_path: PathBuf,
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the store in the user's data directory
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_database_path()?)
    }

    /// Open (or create) the store file at `db_path`
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create store directory: {:?}", parent))?;
        }

        info!("Opening translation store at {:?}", db_path);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open store: {:?}", db_path))?;
        Self::from_connection(conn, db_path)
    }

    /// Store that lives only as long as the handle (for testing)
    pub fn new_in_memory() -> Result<Self> {
        debug!("Opening in-memory translation store");
        let conn = Connection::open_in_memory().context("Failed to open in-memory store")?;
        Self::from_connection(conn, PathBuf::from(":memory:"))
    }

    fn from_connection(conn: Connection, db_path: PathBuf) -> Result<Self> {
        schema::initialize_schema(&conn)?;
        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// `<data dir>/latinify/latinify.db`
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(STORE_DIRNAME).join(STORE_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Raw JSON text stored under each present key, in request order
    pub async fn read_values(&self, keys: Vec<String>) -> Result<Vec<(String, String)>> {
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare_cached("SELECT value FROM kv_store WHERE key = ?1")?;
            let mut found = Vec::with_capacity(keys.len());
            for key in keys {
                let value: Option<String> = stmt.query_row([&key], |row| row.get(0)).optional()?;
                if let Some(value) = value {
                    found.push((key, value));
                }
            }
            Ok(found)
        })
        .await
    }

    /// Upsert every row in one transaction
    pub async fn write_values(&self, rows: Vec<(String, String)>) -> Result<usize> {
        let now = chrono::Utc::now().to_rfc3339();
        self.with_connection(move |conn| {
            let tx = conn.unchecked_transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                )?;
                for (key, value) in &rows {
                    stmt.execute(params![key, value, now])?;
                }
            }
            tx.commit()?;
            debug!("Stored {} key(s)", rows.len());
            Ok(rows.len())
        })
        .await
    }

    /// Delete the given keys in one transaction; absent keys are ignored
    pub async fn delete_values(&self, keys: Vec<String>) -> Result<usize> {
        self.with_connection(move |conn| {
            let tx = conn.unchecked_transaction()?;
            let mut removed = 0;
            {
                let mut stmt = tx.prepare_cached("DELETE FROM kv_store WHERE key = ?1")?;
                for key in &keys {
                    removed += stmt.execute([key])?;
                }
            }
            tx.commit()?;
            Ok(removed)
        })
        .await
    }

    /// Number of stored keys
    pub fn key_count(&self) -> Result<i64> {
        let conn = self.connection.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))?)
    }

    async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();
        tokio::task::spawn_blocking(move || f(&conn.lock()))
            .await
            .context("Store task panicked")?
    }
}
