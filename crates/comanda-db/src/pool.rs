//! # Store Connection
//!
//! Opens the SQLite promotion store and hands out repositories.
//!
//! ```text
//! StoreConfig::from_env()
//!      │
//!      ▼  db_config()
//! DbConfig { path, max_connections, busy_timeout, run_migrations }
//!      │
//!      ▼
//! Database::new(config).await ──► SqlitePool (WAL) ──► migrations
//!      │
//!      ▼
//! db.promotions().load_book() ──► PromotionBook for the order engine
//! ```
//!
//! The store is read on every code a cashier types and written only by the
//! seeder or an admin, so connections are opened in WAL mode with a busy
//! timeout: readers never block, and a write that races another write waits
//! instead of failing with `SQLITE_BUSY`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::promotion::PromotionRepository;

const IN_MEMORY: &str = ":memory:";

/// How to open the promotion store.
///
/// ## Example
/// ```rust
/// use comanda_db::DbConfig;
///
/// let config = DbConfig::new("/var/lib/comanda/comanda.db")
///     .max_connections(8)
///     .run_migrations(false);
/// assert_eq!(config.max_connections, 8);
/// assert!(!config.is_in_memory());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// SQLite file, created on first connect. `:memory:` for a throwaway store.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// How long a connection waits on a locked database before giving up.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    /// A private in-memory store on a single connection, for tests.
    pub fn in_memory() -> Self {
        DbConfig {
            // every connection to :memory: is a separate database
            max_connections: 1,
            ..DbConfig::new(IN_MEMORY)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };
        Ok(options.busy_timeout(self.busy_timeout))
    }
}

/// Handle to the promotion store. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the store and, if configured, brings its schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            in_memory = config.is_in_memory(),
            "Opening promotion store"
        );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Promotion schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the promotion repository.
    ///
    /// ```rust,ignore
    /// let book = db.promotions().load_book().await?;
    /// apply_promotion(&mut cart, code, &book)?;
    /// ```
    pub fn promotions(&self) -> PromotionRepository {
        PromotionRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing promotion store");
        self.pool.close().await;
    }

    /// Whether the store can answer promotion lookups: the connection works
    /// and the `promotions` table exists.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1 FROM promotions LIMIT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}
