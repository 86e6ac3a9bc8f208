//! # Form State
//!
//! The in-memory settings form and every transition the operator can apply.
//!
//! ## Transition Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Immutable Transitions                              │
//! │                                                                         │
//! │   FormState(v1) ──set_field──► FormState(v2) ──add_zone──► FormState(v3)│
//! │        │                            │                          │        │
//! │        ▼                            ▼                          ▼        │
//! │   (unchanged)                  (unchanged)                (current)     │
//! │                                                                         │
//! │  Every operation takes `&self` and returns a NEW state. The caller     │
//! │  decides which state is current; an old state is never mutated.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All transitions are total except [`FormState::set_logo_from_file`], which
//! rejects oversized files before touching anything.
//!
//! ## Usage
//! ```rust
//! use serali_core::form::{FormState, TextField, Toggle};
//! use serali_core::types::ZonePatch;
//!
//! let form = FormState::default()
//!     .set_field(TextField::BusinessName, "Acme")
//!     .set_toggle(Toggle::DeliveryHome, true);
//! let (form, zone_id) = form.add_zone();
//! let form = form.update_zone(&zone_id, &ZonePatch::default().with_name("North"));
//!
//! assert_eq!(form.business_name, "Acme");
//! assert_eq!(form.delivery_zones[0].name, "North");
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{
    BankInfo, CustomerFields, DeliveryTypes, DeliveryZone, LogoUpload, PaymentMethods, ZoneId,
    ZonePatch,
};
use crate::{
    DEFAULT_ACCENT_COLOR, DEFAULT_BUSINESS_NAME, DEFAULT_PRIMARY_COLOR, DEFAULT_SECONDARY_COLOR,
    DEFAULT_WHATSAPP_NUMBER, MAX_LOGO_BYTES,
};

// =============================================================================
// Form State
// =============================================================================

/// Complete, fully-populated settings form.
///
/// Created by merging the stored document over [`FormState::default`] and
/// discarded when the editing session ends.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub business_name: String,
    /// Country code followed by the number, digits only.
    pub whatsapp_number: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    /// Logo value: an external URL or an inline `data:` URL.
    pub logo_url: String,
    /// What the preview box shows.
    pub logo_preview: String,
    /// Set while a file picked in this session backs `logo_url`.
    pub logo_upload: Option<LogoUpload>,
    pub delivery_types: DeliveryTypes,
    pub delivery_zones: Vec<DeliveryZone>,
    pub payment_methods: PaymentMethods,
    pub bank_info: BankInfo,
    pub customer_fields: CustomerFields,
}

/// The hard-coded default table.
impl Default for FormState {
    fn default() -> Self {
        FormState {
            business_name: DEFAULT_BUSINESS_NAME.to_string(),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary_color: DEFAULT_SECONDARY_COLOR.to_string(),
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            logo_url: String::new(),
            logo_preview: String::new(),
            logo_upload: None,
            delivery_types: DeliveryTypes {
                pickup: true,
                home: true,
                table: true,
            },
            delivery_zones: Vec::new(),
            payment_methods: PaymentMethods {
                cash: true,
                transfer: true,
                card: true,
            },
            bank_info: BankInfo::default(),
            customer_fields: CustomerFields::default(),
        }
    }
}

// =============================================================================
// Field Names
// =============================================================================

/// Scalar text fields addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    BusinessName,
    WhatsappNumber,
    PrimaryColor,
    SecondaryColor,
    AccentColor,
    LogoUrl,
    BankName,
    AccountNumber,
    AccountHolder,
}

impl FromStr for TextField {
    type Err = CoreError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "businessName" => Ok(TextField::BusinessName),
            "whatsappNumber" => Ok(TextField::WhatsappNumber),
            "primaryColor" => Ok(TextField::PrimaryColor),
            "secondaryColor" => Ok(TextField::SecondaryColor),
            "accentColor" => Ok(TextField::AccentColor),
            "logoUrl" => Ok(TextField::LogoUrl),
            "bankName" => Ok(TextField::BankName),
            "accountNumber" => Ok(TextField::AccountNumber),
            "accountHolder" => Ok(TextField::AccountHolder),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

/// Boolean switches addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    PaymentCash,
    PaymentTransfer,
    PaymentCard,
    DeliveryPickup,
    DeliveryHome,
    DeliveryTable,
    EmailEnabled,
    EmailRequired,
    BirthdayEnabled,
    BirthdayRequired,
}

impl FromStr for Toggle {
    type Err = CoreError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "paymentCash" => Ok(Toggle::PaymentCash),
            "paymentTransfer" => Ok(Toggle::PaymentTransfer),
            "paymentCard" => Ok(Toggle::PaymentCard),
            "deliveryPickup" => Ok(Toggle::DeliveryPickup),
            "deliveryHome" => Ok(Toggle::DeliveryHome),
            "deliveryTable" => Ok(Toggle::DeliveryTable),
            "emailEnabled" => Ok(Toggle::EmailEnabled),
            "emailRequired" => Ok(Toggle::EmailRequired),
            "birthdayEnabled" => Ok(Toggle::BirthdayEnabled),
            "birthdayRequired" => Ok(Toggle::BirthdayRequired),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

// =============================================================================
// Transitions
// =============================================================================

impl FormState {
    /// Replaces one text field.
    ///
    /// Setting [`TextField::LogoUrl`] also updates the preview and forgets
    /// any uploaded file, so the typed URL wins.
    pub fn set_field(&self, field: TextField, value: impl Into<String>) -> FormState {
        let mut next = self.clone();
        let value = value.into();
        match field {
            TextField::BusinessName => next.business_name = value,
            TextField::WhatsappNumber => next.whatsapp_number = value,
            TextField::PrimaryColor => next.primary_color = value,
            TextField::SecondaryColor => next.secondary_color = value,
            TextField::AccentColor => next.accent_color = value,
            TextField::LogoUrl => {
                next.logo_preview = value.clone();
                next.logo_url = value;
                next.logo_upload = None;
            }
            TextField::BankName => next.bank_info.bank_name = value,
            TextField::AccountNumber => next.bank_info.account_number = value,
            TextField::AccountHolder => next.bank_info.account_holder = value,
        }
        next
    }

    /// Replaces one boolean switch.
    ///
    /// Turning off `emailEnabled` or `birthdayEnabled` clears the paired
    /// `*Required` switch in the same transition.
    pub fn set_toggle(&self, toggle: Toggle, checked: bool) -> FormState {
        let mut next = self.clone();
        let fields = &mut next.customer_fields;
        match toggle {
            Toggle::PaymentCash => next.payment_methods.cash = checked,
            Toggle::PaymentTransfer => next.payment_methods.transfer = checked,
            Toggle::PaymentCard => next.payment_methods.card = checked,
            Toggle::DeliveryPickup => next.delivery_types.pickup = checked,
            Toggle::DeliveryHome => next.delivery_types.home = checked,
            Toggle::DeliveryTable => next.delivery_types.table = checked,
            Toggle::EmailEnabled => fields.email = fields.email.set_enabled(checked),
            Toggle::EmailRequired => fields.email = fields.email.set_required(checked),
            Toggle::BirthdayEnabled => fields.birthday = fields.birthday.set_enabled(checked),
            Toggle::BirthdayRequired => fields.birthday = fields.birthday.set_required(checked),
        }
        next
    }

    /// Appends a blank, active zone at the end of the list.
    ///
    /// Returns the new state and the id of the created zone.
    pub fn add_zone(&self) -> (FormState, ZoneId) {
        let mut next = self.clone();
        let zone = DeliveryZone::blank(next.delivery_zones.len() as u32);
        let id = zone.id.clone();
        next.delivery_zones.push(zone);
        (next, id)
    }

    /// Applies `patch` to the zone with the given id. No-op if absent.
    pub fn update_zone(&self, id: &ZoneId, patch: &ZonePatch) -> FormState {
        let mut next = self.clone();
        if let Some(zone) = next.delivery_zones.iter_mut().find(|zone| &zone.id == id) {
            zone.apply(patch);
        }
        next
    }

    /// Removes the zone with the given id. No-op if absent.
    ///
    /// Remaining zones keep their `order`.
    pub fn remove_zone(&self, id: &ZoneId) -> FormState {
        let mut next = self.clone();
        next.delivery_zones.retain(|zone| &zone.id != id);
        next
    }

    /// Sets the logo from an uploaded file, inlined as a `data:` URL.
    ///
    /// ## Errors
    /// [`CoreError::LogoTooLarge`] when `size_bytes` exceeds
    /// [`MAX_LOGO_BYTES`]. The state is not touched in that case.
    pub fn set_logo_from_file(
        &self,
        bytes: &[u8],
        size_bytes: u64,
        mime_type: &str,
    ) -> CoreResult<FormState> {
        if size_bytes > MAX_LOGO_BYTES {
            return Err(CoreError::LogoTooLarge {
                size_bytes,
                max_bytes: MAX_LOGO_BYTES,
            });
        }

        let data_url = encode_data_url(bytes, mime_type);
        let mut next = self.clone();
        next.logo_preview = data_url.clone();
        next.logo_url = data_url;
        next.logo_upload = Some(LogoUpload {
            mime_type: mime_type.to_string(),
            size_bytes,
        });
        Ok(next)
    }

    /// Clears the logo, the preview and any uploaded file.
    pub fn clear_logo(&self) -> FormState {
        let mut next = self.clone();
        next.logo_url.clear();
        next.logo_preview.clear();
        next.logo_upload = None;
        next
    }
}

// =============================================================================
// View Helpers
// =============================================================================

impl FormState {
    /// Text shown in the logo URL input. Blank while an upload backs the logo.
    pub fn logo_url_input(&self) -> &str {
        if self.logo_upload.is_some() {
            ""
        } else {
            &self.logo_url
        }
    }

    /// The URL input is disabled while an upload backs the logo.
    pub fn logo_url_input_enabled(&self) -> bool {
        self.logo_upload.is_none()
    }

    /// Bank fields are only shown while transfer payments are accepted.
    pub fn bank_details_visible(&self) -> bool {
        self.payment_methods.transfer
    }

    pub fn active_zones(&self) -> impl Iterator<Item = &DeliveryZone> {
        self.delivery_zones.iter().filter(|zone| zone.active)
    }

    /// Zones sorted by `order`; ties keep list order.
    pub fn zones_in_display_order(&self) -> Vec<&DeliveryZone> {
        let mut zones: Vec<&DeliveryZone> = self.delivery_zones.iter().collect();
        zones.sort_by_key(|zone| zone.order);
        zones
    }

    pub fn zone(&self, id: &ZoneId) -> Option<&DeliveryZone> {
        self.delivery_zones.iter().find(|zone| &zone.id == id)
    }
}

fn encode_data_url(bytes: &[u8], mime_type: &str) -> String {
    let mime_type = if mime_type.is_empty() {
        "application/octet-stream"
    } else {
        mime_type
    };
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::OptionalField;

    fn zone_ids(form: &FormState) -> Vec<ZoneId> {
        form.delivery_zones.iter().map(|z| z.id.clone()).collect()
    }

    #[test]
    fn test_defaults() {
        let form = FormState::default();
        assert_eq!(form.business_name, "Serali Food");
        assert_eq!(form.whatsapp_number, "573117411194");
        assert!(form.delivery_types.home);
        assert!(form.payment_methods.transfer);
        assert!(form.delivery_zones.is_empty());
        assert!(!form.customer_fields.email.enabled());
        assert_eq!(form.logo_url, "");
    }

    #[test]
    fn test_set_field_leaves_original_untouched() {
        let original = FormState::default();
        let next = original.set_field(TextField::BusinessName, "Acme");

        assert_eq!(next.business_name, "Acme");
        assert_eq!(original.business_name, "Serali Food");
    }

    #[test]
    fn test_bank_fields() {
        let form = FormState::default()
            .set_field(TextField::BankName, "Bancolombia")
            .set_field(TextField::AccountNumber, "123")
            .set_field(TextField::AccountHolder, "Serali SAS");
        assert!(form.bank_info.is_complete());
    }

    #[test]
    fn test_disabling_email_clears_required() {
        for required in [false, true] {
            let mut form = FormState::default();
            form.customer_fields.email = OptionalField::new(true, required);

            let next = form.set_toggle(Toggle::EmailEnabled, false);
            assert!(!next.customer_fields.email.enabled());
            assert!(!next.customer_fields.email.required());
        }
    }

    #[test]
    fn test_disabling_birthday_clears_required() {
        let form = FormState::default()
            .set_toggle(Toggle::BirthdayEnabled, true)
            .set_toggle(Toggle::BirthdayRequired, true);
        assert!(form.customer_fields.birthday.required());

        let form = form.set_toggle(Toggle::BirthdayEnabled, false);
        assert!(!form.customer_fields.birthday.required());
    }

    #[test]
    fn test_required_ignored_while_disabled() {
        let form = FormState::default().set_toggle(Toggle::EmailRequired, true);
        assert!(!form.customer_fields.email.required());
    }

    #[test]
    fn test_add_zone_appends_blank_active_zone() {
        let (form, first) = FormState::default().add_zone();
        let (form, second) = form.add_zone();

        assert_eq!(form.delivery_zones.len(), 2);
        assert_ne!(first, second);

        let zone = form.zone(&second).unwrap();
        assert_eq!(zone.name, "");
        assert!(zone.price.is_zero());
        assert!(zone.active);
        assert_eq!(zone.order, 1);
    }

    #[test]
    fn test_add_then_remove_restores_zone_list() {
        let (base, _) = FormState::default().add_zone();
        let base = base.update_zone(
            &base.delivery_zones[0].id.clone(),
            &ZonePatch::default().with_name("Centro"),
        );

        let (added, id) = base.add_zone();
        let removed = added.remove_zone(&id);

        assert_eq!(zone_ids(&removed), zone_ids(&base));
        assert_eq!(removed.delivery_zones, base.delivery_zones);
    }

    #[test]
    fn test_update_zone_only_touches_target() {
        let (form, a) = FormState::default().add_zone();
        let (form, b) = form.add_zone();

        let next = form.update_zone(&a, &ZonePatch::default().with_name("North"));

        assert_eq!(next.zone(&a).unwrap().name, "North");
        assert_eq!(next.zone(&b), form.zone(&b));
    }

    #[test]
    fn test_update_and_remove_unknown_zone_are_noops() {
        let (form, _) = FormState::default().add_zone();
        let ghost = ZoneId::from("missing");

        assert_eq!(form.update_zone(&ghost, &ZonePatch::default().with_active(false)), form);
        assert_eq!(form.remove_zone(&ghost), form);
    }

    #[test]
    fn test_remove_zone_keeps_order_values() {
        let (form, a) = FormState::default().add_zone();
        let (form, _) = form.add_zone();
        let (form, _) = form.add_zone();

        let form = form.remove_zone(&a);
        let orders: Vec<u32> = form.delivery_zones.iter().map(|z| z.order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[test]
    fn test_set_logo_from_file_inlines_data_url() {
        let form = FormState::default()
            .set_field(TextField::LogoUrl, "https://example.com/logo.png")
            .set_logo_from_file(b"abc", 3, "image/png")
            .unwrap();

        assert_eq!(form.logo_url, "data:image/png;base64,YWJj");
        assert_eq!(form.logo_preview, form.logo_url);
        assert_eq!(form.logo_url_input(), "");
        assert!(!form.logo_url_input_enabled());
    }

    #[test]
    fn test_set_logo_from_file_rejects_oversized() {
        let form = FormState::default().set_field(TextField::LogoUrl, "https://example.com/a.png");
        let bytes = vec![0u8; 600 * 1024];

        let err = form
            .set_logo_from_file(&bytes, bytes.len() as u64, "image/png")
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::LogoTooLarge {
                size_bytes: 614_400,
                ..
            }
        ));
        assert_eq!(form.logo_url, "https://example.com/a.png");
    }

    #[test]
    fn test_logo_at_limit_is_accepted() {
        let bytes = vec![0u8; 500 * 1024];
        assert!(FormState::default()
            .set_logo_from_file(&bytes, bytes.len() as u64, "image/jpeg")
            .is_ok());
    }

    #[test]
    fn test_typing_url_drops_upload() {
        let form = FormState::default()
            .set_logo_from_file(b"abc", 3, "image/png")
            .unwrap()
            .set_field(TextField::LogoUrl, "https://example.com/b.png");

        assert!(form.logo_upload.is_none());
        assert_eq!(form.logo_url_input(), "https://example.com/b.png");
        assert_eq!(form.logo_preview, "https://example.com/b.png");
    }

    #[test]
    fn test_clear_logo() {
        let form = FormState::default()
            .set_logo_from_file(b"abc", 3, "image/png")
            .unwrap()
            .clear_logo();

        assert_eq!(form.logo_url, "");
        assert_eq!(form.logo_preview, "");
        assert!(form.logo_upload.is_none());
        assert!(form.logo_url_input_enabled());
    }

    #[test]
    fn test_bank_details_follow_transfer_toggle() {
        let form = FormState::default().set_field(TextField::BankName, "Bancolombia");
        assert!(form.bank_details_visible());

        let form = form.set_toggle(Toggle::PaymentTransfer, false);
        assert!(!form.bank_details_visible());
        assert_eq!(form.bank_info.bank_name, "Bancolombia");
    }

    #[test]
    fn test_zones_in_display_order_is_stable() {
        let (form, a) = FormState::default().add_zone();
        let (form, b) = form.add_zone();
        let (form, c) = form.add_zone();
        let form = form
            .update_zone(&a, &ZonePatch { order: Some(5), ..ZonePatch::default() })
            .update_zone(&c, &ZonePatch { order: Some(1), ..ZonePatch::default() });

        let ids: Vec<&ZoneId> = form.zones_in_display_order().iter().map(|z| &z.id).collect();
        assert_eq!(ids, vec![&b, &c, &a]);
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!("businessName".parse::<TextField>().unwrap(), TextField::BusinessName);
        assert_eq!("deliveryHome".parse::<Toggle>().unwrap(), Toggle::DeliveryHome);
        assert!(matches!(
            "deliveryFee".parse::<TextField>(),
            Err(CoreError::UnknownField(name)) if name == "deliveryFee"
        ));
    }

    #[test]
    fn test_active_zones_skip_inactive() {
        let (form, a) = FormState::default().add_zone();
        let (form, _) = form.add_zone();
        let form = form.update_zone(
            &a,
            &ZonePatch::default()
                .with_active(false)
                .with_price(Money::from_cents(100)),
        );
        assert_eq!(form.active_zones().count(), 1);
    }
}
