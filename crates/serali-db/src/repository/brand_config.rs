//! # Brand Config Repository
//!
//! Stores the settings document in a single SQLite row.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  write_config(&BrandConfig)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  serde_json::to_string ──► document TEXT                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO brand_config (id='main', ...)                             │
//! │  ON CONFLICT(id) DO UPDATE  ← one statement: the whole document        │
//! │       │                       is replaced or nothing is                 │
//! │       ▼                                                                 │
//! │  revision = revision + 1, updated_at = now                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Concurrent sessions are not coordinated: the last write wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serali_core::{BrandConfig, PartialBrandConfig};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::store::{decode_document, encode_document, ConfigStore};

/// Key of the one settings row.
const CONFIG_ROW_ID: &str = "main";

/// Revision and timestamp of the stored document.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ConfigMeta {
    pub revision: i64,
    pub updated_at: DateTime<Utc>,
}

/// Repository for the settings document.
#[derive(Debug, Clone)]
pub struct BrandConfigRepository {
    pool: SqlitePool,
}

impl BrandConfigRepository {
    /// Creates a new BrandConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BrandConfigRepository { pool }
    }

    /// Returns the raw stored JSON text, if any.
    pub async fn fetch_raw(&self) -> DbResult<Option<String>> {
        let document: Option<String> =
            sqlx::query_scalar("SELECT document FROM brand_config WHERE id = ?1")
                .bind(CONFIG_ROW_ID)
                .fetch_optional(&self.pool)
                .await?;
        Ok(document)
    }

    /// Returns the revision and last update time, if a document exists.
    pub async fn fetch_meta(&self) -> DbResult<Option<ConfigMeta>> {
        let meta = sqlx::query_as::<_, ConfigMeta>(
            "SELECT revision, updated_at FROM brand_config WHERE id = ?1",
        )
        .bind(CONFIG_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;
        Ok(meta)
    }

    /// Replaces the document and returns the new revision.
    pub async fn upsert(&self, config: &BrandConfig) -> DbResult<i64> {
        let document = encode_document(config)?;
        let now = Utc::now();

        let revision: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO brand_config (id, document, revision, updated_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                revision = brand_config.revision + 1,
                updated_at = excluded.updated_at
            RETURNING revision
            "#,
        )
        .bind(CONFIG_ROW_ID)
        .bind(&document)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!(revision, bytes = document.len(), "Settings document saved");
        Ok(revision)
    }
}

#[async_trait]
impl ConfigStore for BrandConfigRepository {
    async fn fetch_config(&self) -> DbResult<Option<PartialBrandConfig>> {
        let Some(text) = self.fetch_raw().await? else {
            debug!("No settings document stored yet");
            return Ok(None);
        };
        decode_document(&text).map(Some)
    }

    async fn write_config(&self, config: &BrandConfig) -> DbResult<()> {
        self.upsert(config).await.map(|_| ())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
