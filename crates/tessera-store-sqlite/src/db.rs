//! Connection handle management
//!
//! The repository never owns the store's lifecycle: connections are
//! opened here (or by the application), wrapped into a shared handle,
//! and injected. SQLite connections are not `Sync`, so the shared
//! handle serializes access through a mutex; statement execution itself
//! happens on the blocking pool.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde::Deserialize;
use tessera_errors::{store_failure, DataResult, StoreFailure};

/// Shared connection handle injected into repositories.
pub type SqliteHandle = Arc<Mutex<Connection>>;

/// Connection settings, bound from application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteSettings {
    pub path: PathBuf,
}

/// Open the configured database and wrap it into a shared handle.
pub fn connect(settings: &SqliteSettings) -> DataResult<SqliteHandle> {
    Ok(shared(open(&settings.path)?))
}

/// Open a SQLite database at the given path.
pub fn open<P: AsRef<Path>>(path: P) -> DataResult<Connection> {
    let conn = Connection::open(path)
        .map_err(|e| store_failure("open", StoreFailure::Connectivity, e))?;
    configure(&conn)?;
    Ok(conn)
}

/// Open an in-memory SQLite database (for testing).
pub fn open_in_memory() -> DataResult<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| store_failure("open", StoreFailure::Connectivity, e))?;
    configure(&conn)?;
    Ok(conn)
}

/// Wrap a connection into the shared handle repositories expect.
pub fn shared(conn: Connection) -> SqliteHandle {
    Arc::new(Mutex::new(conn))
}

fn configure(conn: &Connection) -> DataResult<()> {
    conn.pragma_update(None, "foreign_keys", true)
        .map_err(|e| store_failure("configure", StoreFailure::Connectivity, e))?;
    // WAL keeps readers unblocked while a writer holds the connection.
    // In-memory databases silently stay in their default journal mode.
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| store_failure("configure", StoreFailure::Connectivity, e))?;
    Ok(())
}
