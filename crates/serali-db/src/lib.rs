//! # serali-db: Configuration Store for Serali Settings
//!
//! Persists the brand settings document. SQLite via sqlx in production, an
//! in-memory store for tests and dry runs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Serali Settings Data Flow                          │
//! │                                                                         │
//! │  EditorSession::submit                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     serali-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │    ConfigStore     │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │◄───│ BrandConfigRepo    │  │ (embedded) │  │   │
//! │  │   │  SqlitePool   │    │ MemoryConfigStore  │  │ 001_...sql │  │   │
//! │  │   └───────────────┘    └────────────────────┘  └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  brand_config(id='main', document JSON, revision, updated_at)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`store`] - `ConfigStore` trait and the in-memory store
//! - [`repository`] - SQLite repository for the settings document
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use serali_db::{ConfigStore, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("settings.db")).await?;
//! let stored = db.brand_config().fetch_config().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::MigrationStatus;
pub use pool::{Database, DbConfig};
pub use repository::brand_config::{BrandConfigRepository, ConfigMeta};
pub use store::{ConfigStore, MemoryConfigStore};
