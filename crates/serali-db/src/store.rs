//! # Configuration Store
//!
//! The seam between the editor and wherever the settings document lives.
//!
//! ```text
//! EditorSession ──► Arc<dyn ConfigStore>
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            ▼
//!  BrandConfigRepository        MemoryConfigStore
//!  (SQLite, production)         (tests, dry runs)
//! ```
//!
//! Stores give document-level atomicity for one write and nothing more:
//! there is no read-modify-write transaction, and the last writer wins.

use async_trait::async_trait;
use serali_core::{BrandConfig, PartialBrandConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Reads and replaces the settings document.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetches the stored document, or `None` if nothing was ever saved.
    async fn fetch_config(&self) -> DbResult<Option<PartialBrandConfig>>;

    /// Replaces the stored document.
    async fn write_config(&self, config: &BrandConfig) -> DbResult<()>;
}

/// Parses stored JSON text into a partial document.
///
/// Keys of the wrong type are dropped one by one and logged, so their
/// defaults apply without losing the rest of the document. Only text that is
/// not a JSON object is an error.
pub(crate) fn decode_document(text: &str) -> DbResult<PartialBrandConfig> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DbError::InvalidDocument(e.to_string()))?;
    let decoded = PartialBrandConfig::from_value(&value)
        .ok_or_else(|| DbError::InvalidDocument("expected a JSON object".into()))?;

    for key in &decoded.skipped {
        warn!(key = %key, "Ignoring stored settings key with the wrong type");
    }
    Ok(decoded.document)
}

pub(crate) fn encode_document(config: &BrandConfig) -> DbResult<String> {
    serde_json::to_string(config).map_err(|e| DbError::Encode(e.to_string()))
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Process-local store holding the document as JSON text.
///
/// Writes can be made to fail or to take a while, which is what the editor
/// tests need.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    document: Mutex<Option<String>>,
    fail_writes: Mutex<Option<String>>,
    write_delay: Option<Duration>,
    writes: AtomicUsize,
}

impl MemoryConfigStore {
    /// Creates an empty store (no document saved yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding raw JSON text, valid or not.
    pub fn with_document(json: impl Into<String>) -> Self {
        MemoryConfigStore {
            document: Mutex::new(Some(json.into())),
            ..Self::default()
        }
    }

    /// Makes every write sleep first, so a save stays in flight.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Makes subsequent writes fail with `reason`; `None` restores them.
    pub fn fail_writes(&self, reason: Option<&str>) {
        let mut fail = self.fail_writes.lock().unwrap_or_else(|e| e.into_inner());
        *fail = reason.map(str::to_string);
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The stored document as a JSON value.
    pub fn stored_json(&self) -> Option<serde_json::Value> {
        let document = self.document.lock().unwrap_or_else(|e| e.into_inner());
        document
            .as_deref()
            .and_then(|text| serde_json::from_str(text).ok())
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn fetch_config(&self) -> DbResult<Option<PartialBrandConfig>> {
        let text = {
            let document = self.document.lock().unwrap_or_else(|e| e.into_inner());
            document.clone()
        };
        text.as_deref().map(decode_document).transpose()
    }

    async fn write_config(&self, config: &BrandConfig) -> DbResult<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }

        let failure = {
            let fail = self.fail_writes.lock().unwrap_or_else(|e| e.into_inner());
            fail.clone()
        };
        if let Some(reason) = failure {
            return Err(DbError::WriteRejected(reason));
        }

        let text = encode_document(config)?;
        {
            let mut document = self.document.lock().unwrap_or_else(|e| e.into_inner());
            *document = Some(text);
        }
        let count = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(writes = count, "Settings document stored in memory");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serali_core::{DocumentOptions, FormState, TextField};

    #[tokio::test]
    async fn test_empty_store_has_no_document() {
        let store = MemoryConfigStore::new();
        assert!(store.fetch_config().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_fetch() {
        let store = MemoryConfigStore::new();
        let form = FormState::default().set_field(TextField::BusinessName, "Acme");

        store
            .write_config(&form.to_document(DocumentOptions::default()))
            .await
            .unwrap();

        let fetched = store.fetch_config().await.unwrap().unwrap();
        assert_eq!(fetched.business_name.as_deref(), Some("Acme"));
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.stored_json().unwrap()["businessName"], "Acme");
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryConfigStore::new();
        store.fail_writes(Some("offline"));

        let doc = FormState::default().to_document(DocumentOptions::default());
        let err = store.write_config(&doc).await.unwrap_err();
        assert!(matches!(err, DbError::WriteRejected(reason) if reason == "offline"));
        assert_eq!(store.write_count(), 0);

        store.fail_writes(None);
        assert!(store.write_config(&doc).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_document_is_reported() {
        for text in ["not json", "[1,2]", "\"Acme\""] {
            let store = MemoryConfigStore::with_document(text);
            assert!(
                matches!(store.fetch_config().await, Err(DbError::InvalidDocument(_))),
                "{text}"
            );
        }
    }

    #[tokio::test]
    async fn test_mistyped_keys_keep_the_rest() {
        let store = MemoryConfigStore::with_document(
            r#"{"businessName":"Brasas","deliveryZones":"lots","paymentMethods":{"card":false},"whatsappNumber":5215512345678}"#,
        );

        let fetched = store.fetch_config().await.unwrap().unwrap();
        assert_eq!(fetched.business_name.as_deref(), Some("Brasas"));
        assert_eq!(fetched.whatsapp_number.as_deref(), Some("5215512345678"));
        assert_eq!(fetched.payment_methods.unwrap().card, Some(false));
        assert!(fetched.delivery_zones.is_none());
    }
}
