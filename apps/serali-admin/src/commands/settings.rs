//! # Settings Commands
//!
//! What the settings page calls. Fields and switches are addressed by their
//! camelCase names so the page can bind inputs generically.
//!
//! ## Page Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │ Loading  │────►│ Editing  │────►│  Saving  │────►│  Saved   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                     │      ▲           │                 │             │
//! │              set_field     │           ▼                 │             │
//! │              set_toggle    │        error notice         │             │
//! │              *_zone        │           │                 │             │
//! │              upload_logo   └───────────┴─────────────────┘             │
//! │              clear_logo                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command returns the full [`SettingsView`] so the page re-renders
//! from one source.

use serde::Serialize;
use serali_core::{DeliveryZone, FormState, SettingsWarning, TextField, Toggle, ZoneId, ZonePatch};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{EditorSession, NoticeView};

/// Everything the settings page renders.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub form: FormState,
    /// Value of the logo URL input (blank while an upload backs the logo).
    pub logo_url_input: String,
    pub logo_url_input_enabled: bool,
    pub bank_details_visible: bool,
    pub email_required_visible: bool,
    pub birthday_required_visible: bool,
    /// Zones sorted by `order`.
    pub zones: Vec<DeliveryZone>,
    pub saving: bool,
    pub notice: Option<NoticeView>,
}

impl SettingsView {
    fn of(session: &EditorSession) -> Self {
        let form = session.form();
        SettingsView {
            logo_url_input: form.logo_url_input().to_string(),
            logo_url_input_enabled: form.logo_url_input_enabled(),
            bank_details_visible: form.bank_details_visible(),
            email_required_visible: form.customer_fields.email.required_toggle_visible(),
            birthday_required_visible: form.customer_fields.birthday.required_toggle_visible(),
            zones: form.zones_in_display_order().into_iter().cloned().collect(),
            saving: session.is_saving(),
            notice: session.notice(),
            form,
        }
    }
}

/// Response of [`add_zone`].
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddZoneResponse {
    pub zone_id: ZoneId,
    pub settings: SettingsView,
}

/// Response of [`submit`].
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub settings: SettingsView,
    /// Advisory findings about what was saved. Never block a save.
    pub warnings: Vec<SettingsWarning>,
}

pub fn get_settings(session: &EditorSession) -> SettingsView {
    debug!("get_settings command");
    SettingsView::of(session)
}

/// Sets a text field by name, e.g. `businessName` or `logoUrl`.
pub fn set_field(session: &EditorSession, name: &str, value: String) -> Result<SettingsView, ApiError> {
    debug!(field = %name, "set_field command");
    let field: TextField = name.parse()?;
    session.set_field(field, value)?;
    Ok(SettingsView::of(session))
}

/// Flips a switch by name, e.g. `paymentTransfer` or `emailRequired`.
pub fn set_toggle(session: &EditorSession, name: &str, checked: bool) -> Result<SettingsView, ApiError> {
    debug!(toggle = %name, checked, "set_toggle command");
    let toggle: Toggle = name.parse()?;
    session.set_toggle(toggle, checked)?;
    Ok(SettingsView::of(session))
}

pub fn add_zone(session: &EditorSession) -> Result<AddZoneResponse, ApiError> {
    debug!("add_zone command");
    let zone_id = session.add_zone()?;
    Ok(AddZoneResponse {
        zone_id,
        settings: SettingsView::of(session),
    })
}

/// Patches a zone. Unknown ids are ignored.
pub fn update_zone(
    session: &EditorSession,
    zone_id: &str,
    patch: ZonePatch,
) -> Result<SettingsView, ApiError> {
    debug!(zone_id = %zone_id, "update_zone command");
    session.update_zone(&ZoneId::from(zone_id), &patch)?;
    Ok(SettingsView::of(session))
}

/// Removes a zone. Unknown ids are ignored.
pub fn remove_zone(session: &EditorSession, zone_id: &str) -> Result<SettingsView, ApiError> {
    debug!(zone_id = %zone_id, "remove_zone command");
    session.remove_zone(&ZoneId::from(zone_id))?;
    Ok(SettingsView::of(session))
}

/// Takes a picked logo file.
///
/// ## Errors
/// `LOGO_TOO_LARGE` for files over 500KB; the logo is left as it was.
pub fn upload_logo(
    session: &EditorSession,
    bytes: &[u8],
    mime_type: &str,
) -> Result<SettingsView, ApiError> {
    debug!(size = bytes.len(), mime_type, "upload_logo command");
    session.set_logo_from_file(bytes, mime_type)?;
    Ok(SettingsView::of(session))
}

pub fn clear_logo(session: &EditorSession) -> Result<SettingsView, ApiError> {
    debug!("clear_logo command");
    session.clear_logo()?;
    Ok(SettingsView::of(session))
}

/// Validates and saves the form.
///
/// ## Errors
/// - `SAVE_IN_PROGRESS` while another save runs
/// - `VALIDATION_ERROR` naming the first failing rule
/// - `PERSIST_ERROR` when the store refused the write
pub async fn submit(session: &EditorSession) -> Result<SubmitResponse, ApiError> {
    debug!("submit command");
    let warnings = session.submit().await?;
    Ok(SubmitResponse {
        settings: SettingsView::of(session),
        warnings,
    })
}

pub fn dismiss_notice(session: &EditorSession) -> SettingsView {
    session.dismiss_notice();
    SettingsView::of(session)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::EditorSettings;
    use serali_core::Money;
    use serali_db::MemoryConfigStore;
    use std::sync::Arc;

    async fn session() -> EditorSession {
        EditorSession::load(Arc::new(MemoryConfigStore::new()), EditorSettings::default()).await
    }

    #[tokio::test]
    async fn test_unknown_field_name() {
        let session = session().await;
        let err = set_field(&session, "slogan", "Hi".into()).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownField);

        let err = set_toggle(&session, "paymentCrypto", true).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownField);
    }

    #[tokio::test]
    async fn test_required_toggle_visibility() {
        let session = session().await;
        let view = get_settings(&session);
        assert!(!view.email_required_visible);

        let view = set_toggle(&session, "emailEnabled", true).unwrap();
        assert!(view.email_required_visible);
        assert!(!view.birthday_required_visible);
    }

    #[tokio::test]
    async fn test_bank_details_follow_transfer() {
        let session = session().await;
        assert!(get_settings(&session).bank_details_visible);

        let view = set_toggle(&session, "paymentTransfer", false).unwrap();
        assert!(!view.bank_details_visible);
    }

    #[tokio::test]
    async fn test_upload_disables_url_input() {
        let session = session().await;
        set_field(&session, "logoUrl", "https://cdn.example/logo.png".into()).unwrap();

        let view = upload_logo(&session, b"\x89PNG", "image/png").unwrap();
        assert_eq!(view.logo_url_input, "");
        assert!(!view.logo_url_input_enabled);
        assert!(view.form.logo_preview.starts_with("data:image/png;base64,"));

        let view = clear_logo(&session).unwrap();
        assert_eq!(view.form.logo_url, "");
        assert!(view.logo_url_input_enabled);
    }

    #[tokio::test]
    async fn test_oversized_logo_is_rejected() {
        let session = session().await;
        let err = upload_logo(&session, &vec![0u8; 512_001], "image/png").unwrap_err();
        assert_eq!(err.code, ErrorCode::LogoTooLarge);

        let view = get_settings(&session);
        assert_eq!(view.form.logo_url, "");
        assert!(matches!(view.notice, Some(NoticeView::Error { .. })));
    }

    #[tokio::test]
    async fn test_zone_commands() {
        let session = session().await;
        let first = add_zone(&session).unwrap().zone_id;
        let second = add_zone(&session).unwrap().zone_id;

        let patch = ZonePatch::default()
            .with_name("Norte")
            .with_price(Money::from_cents(350));
        let view = update_zone(&session, first.as_str(), patch).unwrap();
        assert_eq!(view.zones[0].name, "Norte");

        let view = update_zone(
            &session,
            second.as_str(),
            ZonePatch {
                order: Some(0),
                ..ZonePatch::default()
            },
        )
        .unwrap();
        // equal order keeps list order
        assert_eq!(view.zones[0].id, first);

        let view = remove_zone(&session, "missing").unwrap();
        assert_eq!(view.zones.len(), 2);

        let view = remove_zone(&session, first.as_str()).unwrap();
        assert_eq!(view.zones.len(), 1);
        assert_eq!(view.zones[0].id, second);
    }

    #[tokio::test]
    async fn test_submit_validation_error_message() {
        let session = session().await;
        add_zone(&session).unwrap();

        let err = submit(&session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("#1"));
    }

    #[tokio::test]
    async fn test_submit_success_view() {
        let session = session().await;
        let zone = add_zone(&session).unwrap().zone_id;
        update_zone(&session, zone.as_str(), ZonePatch::default().with_name("Sur")).unwrap();

        let response = submit(&session).await.unwrap();
        assert!(!response.settings.saving);
        assert!(matches!(
            response.settings.notice,
            Some(NoticeView::Success { .. })
        ));

        let view = dismiss_notice(&session);
        assert!(view.notice.is_none());
    }

    #[tokio::test]
    async fn test_view_serializes_camel_case() {
        let session = session().await;
        let json = serde_json::to_value(get_settings(&session)).unwrap();
        assert_eq!(json["logoUrlInputEnabled"], true);
        assert_eq!(json["form"]["businessName"], "Serali Food");
        assert!(json["notice"].is_null());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_save_is_logged_once() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();
        let _default = tracing::subscriber::set_default(subscriber);

        let store = Arc::new(MemoryConfigStore::new());
        let session = EditorSession::load(store.clone(), EditorSettings::default()).await;
        store.fail_writes(Some("disk full"));

        let err = submit(&session).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistError);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let errors: Vec<_> = output
            .lines()
            .filter(|line| line.split_whitespace().next() == Some("ERROR"))
            .collect();
        assert_eq!(errors.len(), 1, "{output}");
        assert!(errors[0].contains("disk full"));
    }
}
