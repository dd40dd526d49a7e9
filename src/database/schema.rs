/*!
 * Store schema.
 *
 * A single `kv_store` table of JSON documents keyed by storage key. The
 * schema version is kept in SQLite's `user_version` pragma.
 */

use anyhow::{Context, Result, bail};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

const CREATE_KV_STORE: &str = r#"
    CREATE TABLE IF NOT EXISTS kv_store (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

/// Bring a freshly opened connection up to `SCHEMA_VERSION`
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    // WAL keeps readers going while a pass flushes the cache
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("Failed to enable WAL journal")?;

    let version = schema_version(conn)?;
    match version {
        0 => {
            info!("Creating translation store schema v{}", SCHEMA_VERSION);
            conn.execute_batch(CREATE_KV_STORE)?;
            conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        SCHEMA_VERSION => debug!("Store schema is up to date (v{})", version),
        newer if newer > SCHEMA_VERSION => {
            bail!("Store schema v{} is newer than supported v{}", newer, SCHEMA_VERSION)
        }
        older => bail!("Unknown store schema version v{}", older),
    }

    Ok(())
}

fn schema_version(conn: &Connection) -> Result<i32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("Failed to read store schema version")
}
