//! # Database Pool Management
//!
//! Opens the SQLite file that holds the settings document.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AdminConfig::db_config()                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig { path, max_connections, busy_timeout, ... }                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                            │
//! │       ├── open pool (WAL, busy timeout)                                 │
//! │       └── apply embedded migrations                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.brand_config() ──► BrandConfigRepository (impl ConfigStore)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The storefront may read the same file while an admin saves. WAL keeps
//! readers off the writer's lock, and the busy timeout makes a second writer
//! wait instead of failing with `SQLITE_BUSY`.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, MigrationStatus};
use crate::repository::brand_config::BrandConfigRepository;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Settings store connection options.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/serali/settings.db").max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file; created on first connect. `:memory:` for a private
    /// in-memory database.
    pub database_path: PathBuf,

    /// Pool size. One document, so a handful is plenty. Default: 5
    pub max_connections: u32,

    /// How long to wait for a free pooled connection. Default: 10s
    pub acquire_timeout: Duration,

    /// How long a statement waits on another writer's lock. Default: 5s
    pub busy_timeout: Duration,

    /// Apply embedded migrations on connect. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
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

    /// A private in-memory database, for tests.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool
    /// is pinned to a single connection.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            ..DbConfig::new(MEMORY_PATH)
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> SqliteConnectOptions {
        let options = SqliteConnectOptions::new()
            .filename(&self.database_path)
            .busy_timeout(self.busy_timeout)
            .foreign_keys(true);

        if self.is_in_memory() {
            // SQLite opens `:memory:` as a private database; WAL does not apply
            options
        } else {
            options
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the settings database; cheap to clone.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool and, unless disabled, applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening settings database");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Settings pool ready");

        let db = Database { pool };
        if config.run_migrations {
            migrations::run_migrations(&db.pool).await?;
        }
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// The settings document repository.
    pub fn brand_config(&self) -> BrandConfigRepository {
        BrandConfigRepository::new(self.pool.clone())
    }

    /// How many embedded migrations have been applied.
    pub async fn migration_status(&self) -> DbResult<MigrationStatus> {
        migrations::migration_status(&self.pool).await
    }

    /// True if the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        info!("Closing settings database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
