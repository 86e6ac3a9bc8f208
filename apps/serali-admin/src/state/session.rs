//! # Editor Session
//!
//! One settings-editing session: the current form, the inline notice and
//! the in-flight save flag.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  load() ──► fetch_config ──┬── Some(doc) ──► merged(doc)                │
//! │                            ├── None ───────► defaults                   │
//! │                            └── Err ────────► defaults + warn!           │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  ┌──────────── EDITING ◄──────────────────────────────┐                │
//! │  │  set_field / set_toggle / zones / logo             │                │
//! │  │        │                                           │                │
//! │  │        ▼ submit()                                  │                │
//! │  │  clear notice ──► validate ──✗──► Notice::Error ───┤                │
//! │  │                      │                             │                │
//! │  │                      ▼                             │                │
//! │  │  SAVING (edits + resubmit rejected)                │                │
//! │  │                      │                             │                │
//! │  │          write_config ──✗──► Notice::Error ────────┤                │
//! │  │                      │                             │                │
//! │  │                      ▼                             │                │
//! │  │            Notice::Saved (expires) ────────────────┘                │
//! │  └────────────────────────────────────────────────────                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! Form, notice and the saving flag sit behind one `Mutex`, never held across
//! an `.await`. `submit` raises the flag and snapshots the form under the same
//! lock that every edit checks the flag under, so no edit can land between
//! the snapshot and the end of the save.

use serde::Serialize;
use serali_core::{
    review, validate, BrandConfig, CoreResult, DocumentOptions, FormState, PartialBrandConfig,
    SettingsWarning, TextField, Toggle, ZoneId, ZonePatch,
};
use serali_db::ConfigStore;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use ts_rs::TS;

use crate::error::{EditorError, EditorResult};

/// Message shown after a successful save.
pub const SAVED_MESSAGE: &str = "Settings saved successfully";

// =============================================================================
// Settings & Notices
// =============================================================================

/// Per-session knobs, usually derived from `AdminConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorSettings {
    /// How long the success notice stays visible.
    pub success_notice: Duration,
    pub document: DocumentOptions,
}

impl Default for EditorSettings {
    fn default() -> Self {
        EditorSettings {
            success_notice: Duration::from_secs(3),
            document: DocumentOptions::default(),
        }
    }
}

/// The inline message under the form.
#[derive(Debug, Clone, PartialEq)]
enum Notice {
    Saved { at: Instant },
    Error { message: String },
}

/// What the page renders for the current notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NoticeView {
    Success { message: String },
    Error { message: String },
}

struct SessionState {
    form: FormState,
    notice: Option<Notice>,
    saving: bool,
}

/// Lowers the saving flag when the save ends, even if its future is dropped.
struct SavingGuard<'a>(&'a EditorSession);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.with_state(|state| state.saving = false);
    }
}

// =============================================================================
// Editor Session
// =============================================================================

pub struct EditorSession {
    store: Arc<dyn ConfigStore>,
    settings: EditorSettings,
    state: Mutex<SessionState>,
}

impl EditorSession {
    /// Creates a session around an already-built form.
    pub fn new(store: Arc<dyn ConfigStore>, settings: EditorSettings, form: FormState) -> Self {
        EditorSession {
            store,
            settings,
            state: Mutex::new(SessionState {
                form,
                notice: None,
                saving: false,
            }),
        }
    }

    /// Loads the stored document and merges it over the defaults.
    ///
    /// A fetch failure is logged and the session starts from defaults, so the
    /// page always leaves its loading state.
    pub async fn load(store: Arc<dyn ConfigStore>, settings: EditorSettings) -> Self {
        let remote = match store.fetch_config().await {
            Ok(Some(document)) => {
                info!("Loaded stored settings document");
                Some(document)
            }
            Ok(None) => {
                info!("No stored settings document, starting from defaults");
                None
            }
            Err(e) => {
                warn!(error = %e, "Could not load settings, starting from defaults");
                None
            }
        };

        Self::new(store, settings, FormState::merged(remote))
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Current form (a snapshot).
    pub fn form(&self) -> FormState {
        self.with_state(|state| state.form.clone())
    }

    /// Current form mapped onto the stored document shape.
    pub fn document(&self) -> BrandConfig {
        self.with_state(|state| state.form.to_document(self.settings.document))
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// True while a save is in flight; the page disables its controls.
    pub fn is_saving(&self) -> bool {
        self.with_state(|state| state.saving)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Runs one transition against the current form and returns what it
    /// produced besides the new form.
    ///
    /// Rejected while saving. A failed transition leaves the form as it was
    /// and shows its message as the notice.
    fn apply<T, F>(&self, f: F) -> EditorResult<T>
    where
        F: FnOnce(&FormState) -> CoreResult<(FormState, T)>,
    {
        self.with_state(|state| {
            if state.saving {
                return Err(EditorError::SaveInProgress);
            }
            match f(&state.form) {
                Ok((next, output)) => {
                    state.form = next;
                    Ok(output)
                }
                Err(e) => {
                    state.notice = Some(Notice::Error {
                        message: e.to_string(),
                    });
                    Err(e.into())
                }
            }
        })
    }

    fn transition<F>(&self, f: F) -> EditorResult<FormState>
    where
        F: FnOnce(&FormState) -> CoreResult<FormState>,
    {
        self.apply(|form| f(form).map(|next| (next.clone(), next)))
    }

    pub fn set_field(&self, field: TextField, value: impl Into<String>) -> EditorResult<FormState> {
        let value = value.into();
        debug!(?field, "set_field");
        self.transition(|form| Ok(form.set_field(field, value)))
    }

    pub fn set_toggle(&self, toggle: Toggle, checked: bool) -> EditorResult<FormState> {
        debug!(?toggle, checked, "set_toggle");
        self.transition(|form| Ok(form.set_toggle(toggle, checked)))
    }

    /// Appends a blank zone and returns its id.
    pub fn add_zone(&self) -> EditorResult<ZoneId> {
        let id = self.apply(|form| Ok(form.add_zone()))?;
        debug!(zone_id = %id, "Zone added");
        Ok(id)
    }

    pub fn update_zone(&self, id: &ZoneId, patch: &ZonePatch) -> EditorResult<FormState> {
        debug!(zone_id = %id, "update_zone");
        self.transition(|form| Ok(form.update_zone(id, patch)))
    }

    pub fn remove_zone(&self, id: &ZoneId) -> EditorResult<FormState> {
        debug!(zone_id = %id, "remove_zone");
        self.transition(|form| Ok(form.remove_zone(id)))
    }

    /// Sets the logo from file bytes. Oversized files are rejected and the
    /// rejection becomes the current notice.
    pub fn set_logo_from_file(&self, bytes: &[u8], mime_type: &str) -> EditorResult<FormState> {
        let size_bytes = bytes.len() as u64;
        debug!(size_bytes, mime_type, "set_logo_from_file");
        self.transition(|form| form.set_logo_from_file(bytes, size_bytes, mime_type))
    }

    pub fn clear_logo(&self) -> EditorResult<FormState> {
        self.transition(|form| Ok(form.clear_logo()))
    }

    /// Replaces the whole form with `document` merged over the defaults.
    pub fn import_document(&self, document: PartialBrandConfig) -> EditorResult<FormState> {
        self.transition(|_| Ok(FormState::merged(Some(document))))
    }

    // =========================================================================
    // Submit
    // =========================================================================

    /// Validates and saves the form.
    ///
    /// Returns the advisory warnings for what was saved. On failure the form
    /// is left untouched and the error becomes the notice; the operator may
    /// simply submit again.
    pub async fn submit(&self) -> EditorResult<Vec<SettingsWarning>> {
        let form = self.with_state(|state| {
            if state.saving {
                return Err(EditorError::SaveInProgress);
            }
            state.saving = true;
            state.notice = None;
            Ok(state.form.clone())
        })?;
        let _guard = SavingGuard(self);

        if let Err(e) = validate(&form) {
            info!(error = %e, "Settings rejected by validation");
            self.set_error_notice(e.to_string());
            return Err(e.into());
        }

        let document = form.to_document(self.settings.document);
        match self.store.write_config(&document).await {
            Ok(()) => {
                info!(zones = form.delivery_zones.len(), "Settings saved");
                self.with_state(|state| {
                    state.notice = Some(Notice::Saved { at: Instant::now() });
                });
                Ok(review(&form))
            }
            Err(e) => {
                error!(error = %e, "Failed to save settings");
                let err = EditorError::Persist(e);
                self.set_error_notice(err.to_string());
                Err(err)
            }
        }
    }

    // =========================================================================
    // Notices
    // =========================================================================

    fn set_error_notice(&self, message: String) {
        self.with_state(|state| state.notice = Some(Notice::Error { message }));
    }

    /// The notice to show, if any. A success notice disappears once
    /// `success_notice` has elapsed.
    pub fn notice(&self) -> Option<NoticeView> {
        let ttl = self.settings.success_notice;
        self.with_state(|state| {
            if let Some(Notice::Saved { at }) = &state.notice {
                if at.elapsed() >= ttl {
                    state.notice = None;
                }
            }
            state.notice.as_ref().map(|notice| match notice {
                Notice::Saved { .. } => NoticeView::Success {
                    message: SAVED_MESSAGE.to_string(),
                },
                Notice::Error { message } => NoticeView::Error {
                    message: message.clone(),
                },
            })
        })
    }

    /// Closes the current notice.
    pub fn dismiss_notice(&self) {
        self.with_state(|state| state.notice = None);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serali_core::{Money, ValidationError};
    use serali_db::{DbResult, MemoryConfigStore};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};

    async fn session_with(store: Arc<MemoryConfigStore>) -> EditorSession {
        EditorSession::load(store, EditorSettings::default()).await
    }

    fn ready_form(session: &EditorSession) -> ZoneId {
        session.set_toggle(Toggle::DeliveryHome, true).unwrap();
        let id = session.add_zone().unwrap();
        session
            .update_zone(
                &id,
                &ZonePatch::default()
                    .with_name("Centro")
                    .with_price(Money::from_cents(500)),
            )
            .unwrap();
        id
    }

    #[tokio::test]
    async fn test_load_without_document_uses_defaults() {
        let session = session_with(Arc::new(MemoryConfigStore::new())).await;
        assert_eq!(session.form(), FormState::default());
        assert!(session.notice().is_none());
    }

    #[tokio::test]
    async fn test_load_with_corrupt_document_uses_defaults() {
        let store = Arc::new(MemoryConfigStore::with_document("{not json"));
        let session = session_with(store).await;
        assert_eq!(session.form(), FormState::default());
    }

    #[tokio::test]
    async fn test_load_merges_stored_document() {
        let store = Arc::new(MemoryConfigStore::with_document(
            r#"{"businessName":"Acme","paymentMethods":{"card":false}}"#,
        ));
        let form = session_with(store).await.form();
        assert_eq!(form.business_name, "Acme");
        assert!(!form.payment_methods.card);
        assert!(form.payment_methods.cash);
    }

    #[tokio::test]
    async fn test_mistyped_key_does_not_reset_saved_settings() {
        let store = Arc::new(MemoryConfigStore::with_document(
            r#"{
                "businessName": "Brasas",
                "paymentMethods": {"card": false},
                "deliveryZones": [{"id": 1718000000000, "name": "Centro", "price": 25, "active": true, "order": 0}]
            }"#,
        ));
        let session = session_with(store.clone()).await;

        let form = session.form();
        assert_eq!(form.business_name, "Brasas");
        assert!(!form.payment_methods.card);
        assert_eq!(form.delivery_zones.len(), 1);

        session.set_toggle(Toggle::DeliveryHome, false).unwrap();
        session.submit().await.unwrap();

        let saved = store.stored_json().unwrap();
        assert_eq!(saved["businessName"], "Brasas");
        assert_eq!(saved["paymentMethods"]["card"], false);
        assert_eq!(saved["deliveryZones"][0]["id"], "1718000000000");
        assert_eq!(saved["deliveryZones"][0]["name"], "Centro");
    }

    #[tokio::test]
    async fn test_oversized_logo_sets_error_notice() {
        let session = session_with(Arc::new(MemoryConfigStore::new())).await;
        let bytes = vec![0u8; 600 * 1024];

        let err = session.set_logo_from_file(&bytes, "image/png").unwrap_err();

        assert!(matches!(err, EditorError::Core(_)));
        assert_eq!(session.form().logo_url, "");
        assert!(matches!(session.notice(), Some(NoticeView::Error { .. })));
    }

    #[tokio::test]
    async fn test_submit_rejected_by_validation() {
        let store = Arc::new(MemoryConfigStore::new());
        let session = session_with(store.clone()).await;
        session.set_toggle(Toggle::DeliveryHome, true).unwrap();
        let before = session.form();

        let err = session.submit().await.unwrap_err();

        assert!(matches!(
            err,
            EditorError::Validation(ValidationError::NoActiveZone)
        ));
        assert_eq!(store.write_count(), 0);
        assert_eq!(session.form(), before);
        assert!(!session.is_saving());
        assert!(matches!(session.notice(), Some(NoticeView::Error { .. })));
    }

    #[tokio::test]
    async fn test_submit_persist_failure_keeps_form_and_allows_retry() {
        let store = Arc::new(MemoryConfigStore::new());
        let session = session_with(store.clone()).await;
        ready_form(&session);
        let before = session.form();

        store.fail_writes(Some("unavailable"));
        let err = session.submit().await.unwrap_err();
        assert!(matches!(err, EditorError::Persist(_)));
        assert_eq!(session.form(), before);
        assert_eq!(
            session.notice(),
            Some(NoticeView::Error {
                message: "Error saving settings. Please try again.".to_string()
            })
        );

        store.fail_writes(None);
        session.submit().await.unwrap();
        assert_eq!(store.write_count(), 1);
        assert!(matches!(session.notice(), Some(NoticeView::Success { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_notice_expires() {
        let session = session_with(Arc::new(MemoryConfigStore::new())).await;
        ready_form(&session);

        session.submit().await.unwrap();
        assert!(matches!(session.notice(), Some(NoticeView::Success { .. })));

        tokio::time::advance(Duration::from_millis(2_999)).await;
        assert!(session.notice().is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(session.notice().is_none());
    }

    #[tokio::test]
    async fn test_submit_clears_previous_notice() {
        let session = session_with(Arc::new(MemoryConfigStore::new())).await;
        let _ = session.set_logo_from_file(&vec![0u8; 600 * 1024], "image/png");
        assert!(matches!(session.notice(), Some(NoticeView::Error { .. })));

        ready_form(&session);
        session.submit().await.unwrap();
        assert!(matches!(session.notice(), Some(NoticeView::Success { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_and_resubmit_rejected_while_saving() {
        let store = Arc::new(MemoryConfigStore::new().with_write_delay(Duration::from_secs(1)));
        let session = Arc::new(session_with(store.clone()).await);
        ready_form(&session);

        let in_flight = {
            let session = session.clone();
            tokio::spawn(async move { session.submit().await })
        };
        while !session.is_saving() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(
            session.set_field(TextField::BusinessName, "Late"),
            Err(EditorError::SaveInProgress)
        ));
        assert!(matches!(
            session.submit().await,
            Err(EditorError::SaveInProgress)
        ));

        in_flight.await.unwrap().unwrap();
        assert!(!session.is_saving());
        assert_eq!(store.write_count(), 1);
        assert_eq!(session.form().business_name, "Serali Food");
    }

    /// Checks, while each write is in flight, that the session still holds
    /// exactly the form being written.
    #[derive(Default)]
    struct SnapshotCheckStore {
        session: OnceLock<Weak<EditorSession>>,
        writes: AtomicUsize,
        mismatches: AtomicUsize,
    }

    #[async_trait]
    impl ConfigStore for SnapshotCheckStore {
        async fn fetch_config(&self) -> DbResult<Option<PartialBrandConfig>> {
            Ok(None)
        }

        async fn write_config(&self, config: &BrandConfig) -> DbResult<()> {
            tokio::time::sleep(Duration::from_millis(2)).await;
            if let Some(session) = self.session.get().and_then(Weak::upgrade) {
                if session.document() != *config {
                    self.mismatches.fetch_add(1, Ordering::SeqCst);
                }
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_edits_never_change_form_being_saved() {
        let store = Arc::new(SnapshotCheckStore::default());
        let session = Arc::new(EditorSession::new(
            store.clone(),
            EditorSettings::default(),
            FormState::default(),
        ));
        store.session.set(Arc::downgrade(&session)).unwrap();
        ready_form(&session);

        let done = Arc::new(AtomicBool::new(false));
        let editors: Vec<_> = (0..3)
            .map(|editor| {
                let session = session.clone();
                let done = done.clone();
                tokio::spawn(async move {
                    let mut edit = 0u32;
                    while !done.load(Ordering::SeqCst) {
                        let name = format!("Editor {editor}.{edit}");
                        let _ = session.set_field(TextField::BusinessName, name);
                        edit += 1;
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for _ in 0..20 {
            session.submit().await.unwrap();
        }
        done.store(true, Ordering::SeqCst);
        for editor in editors {
            editor.await.unwrap();
        }

        assert_eq!(store.writes.load(Ordering::SeqCst), 20);
        assert_eq!(store.mismatches.load(Ordering::SeqCst), 0);
        assert!(!session.is_saving());
    }

    #[tokio::test]
    async fn test_dismiss_notice() {
        let session = session_with(Arc::new(MemoryConfigStore::new())).await;
        session.set_toggle(Toggle::DeliveryHome, true).unwrap();
        let _ = session.submit().await;
        assert!(session.notice().is_some());

        session.dismiss_notice();
        assert!(session.notice().is_none());
    }

    #[tokio::test]
    async fn test_submit_returns_advisory_warnings() {
        let session = session_with(Arc::new(MemoryConfigStore::new())).await;
        ready_form(&session);
        let warnings = session.submit().await.unwrap();
        assert_eq!(warnings, vec![SettingsWarning::IncompleteBankInfo]);
    }
}
