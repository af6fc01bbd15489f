//! Record store handle over an r2d2 SQLite pool.

use crate::error::{DbError, DbResult};
use crate::migrations;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use tracing::{debug, info};

pub type ConnectionPool = Pool<SqliteConnectionManager>;
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Connections serving concurrent requests against a database file.
const FILE_POOL_SIZE: u32 = 8;

/// Shared record store handle. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open (creating if needed) the record store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!("Opening record store at {}", path.display());

        // WAL lets readers proceed while an upload is being inserted
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )
        });

        Self::from_manager(manager, FILE_POOL_SIZE)
    }

    /// Open a private in-memory store, used by tests.
    pub fn open_in_memory() -> DbResult<Self> {
        // Every in-memory connection is its own database, so keep exactly one
        Self::from_manager(SqliteConnectionManager::memory(), 1)
    }

    fn from_manager(manager: SqliteConnectionManager, max_size: u32) -> DbResult<Self> {
        let pool = Pool::builder().max_size(max_size).build(manager)?;
        migrations::initialize_schema(&*pool.get()?)?;
        debug!(max_size, "Record store pool ready");
        Ok(Self { pool })
    }

    /// Borrow a pooled connection.
    pub fn conn(&self) -> DbResult<PooledConn> {
        self.pool.get().map_err(DbError::from)
    }

    /// `PRAGMA integrity_check` passes.
    pub fn integrity_check(&self) -> DbResult<bool> {
        let verdict: String = self
            .conn()?
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(verdict == "ok")
    }
}
