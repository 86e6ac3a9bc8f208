//! # Validation Module
//!
//! Checks run when the operator submits the form.
//!
//! ## Two Tiers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Submit-Time Checks                                 │
//! │                                                                         │
//! │  Tier 1: validate()  ── BLOCKING                                       │
//! │  ├── Home delivery needs at least one active zone                      │
//! │  ├── Every active zone needs a name                                    │
//! │  └── Every active zone needs a price ≥ 0                               │
//! │           │                                                             │
//! │           ▼  first failure aborts the save                             │
//! │                                                                         │
//! │  Tier 2: review()    ── ADVISORY                                       │
//! │  ├── Business name, WhatsApp number, colors                            │
//! │  ├── Transfer enabled without bank details                             │
//! │  └── No payment method / no delivery type                              │
//! │           │                                                             │
//! │           ▼  reported next to the save result, never blocks it         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use serali_core::form::{FormState, Toggle};
//! use serali_core::validation::validate;
//! use serali_core::ValidationError;
//!
//! let form = FormState::default().set_toggle(Toggle::DeliveryHome, true);
//! assert_eq!(validate(&form), Err(ValidationError::NoActiveZone));
//! ```

use serde::Serialize;
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::form::FormState;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Blocking Validation
// =============================================================================

/// Checks the delivery zone rules. Vacuously passes when home delivery is off.
///
/// Zones are checked in list order and the first failure is returned.
pub fn validate(form: &FormState) -> ValidationResult<()> {
    if !form.delivery_types.home {
        return Ok(());
    }

    let mut active = form
        .delivery_zones
        .iter()
        .enumerate()
        .filter(|(_, zone)| zone.active)
        .peekable();

    if active.peek().is_none() {
        return Err(ValidationError::NoActiveZone);
    }

    for (index, zone) in active {
        if zone.name.trim().is_empty() {
            return Err(ValidationError::ZoneNameRequired {
                zone_id: zone.id.clone(),
                position: index + 1,
            });
        }
        if zone.price.is_negative() {
            return Err(ValidationError::ZoneNegativePrice {
                zone_id: zone.id.clone(),
                name: zone.name.clone(),
                price: zone.price,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Advisory Review
// =============================================================================

/// Something worth pointing out that does not block saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettingsWarning {
    EmptyBusinessName,
    InvalidWhatsappNumber { value: String },
    InvalidColor { field: String, value: String },
    IncompleteBankInfo,
    NoPaymentMethod,
    NoDeliveryType,
}

impl fmt::Display for SettingsWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsWarning::EmptyBusinessName => write!(f, "Business name is empty"),
            SettingsWarning::InvalidWhatsappNumber { value } => write!(
                f,
                "WhatsApp number '{}' should be country code and number, digits only",
                value
            ),
            SettingsWarning::InvalidColor { field, value } => {
                write!(f, "{} '{}' is not a hex color like #F4C542", field, value)
            }
            SettingsWarning::IncompleteBankInfo => write!(
                f,
                "Transfer payments are enabled but the bank details are incomplete"
            ),
            SettingsWarning::NoPaymentMethod => write!(f, "No payment method is enabled"),
            SettingsWarning::NoDeliveryType => write!(f, "No delivery type is enabled"),
        }
    }
}

/// Lists advisory warnings for the form, in a stable order.
pub fn review(form: &FormState) -> Vec<SettingsWarning> {
    let mut warnings = Vec::new();

    if form.business_name.trim().is_empty() {
        warnings.push(SettingsWarning::EmptyBusinessName);
    }

    if !is_phone_number(&form.whatsapp_number) {
        warnings.push(SettingsWarning::InvalidWhatsappNumber {
            value: form.whatsapp_number.clone(),
        });
    }

    for (field, value) in [
        ("primaryColor", &form.primary_color),
        ("secondaryColor", &form.secondary_color),
        ("accentColor", &form.accent_color),
    ] {
        if !is_hex_color(value) {
            warnings.push(SettingsWarning::InvalidColor {
                field: field.to_string(),
                value: value.clone(),
            });
        }
    }

    let payments = form.payment_methods;
    if payments.transfer && !form.bank_info.is_complete() {
        warnings.push(SettingsWarning::IncompleteBankInfo);
    }
    if !(payments.cash || payments.transfer || payments.card) {
        warnings.push(SettingsWarning::NoPaymentMethod);
    }

    let types = form.delivery_types;
    if !(types.pickup || types.home || types.table) {
        warnings.push(SettingsWarning::NoDeliveryType);
    }

    warnings
}

fn is_phone_number(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// `#RGB` or `#RRGGBB`.
fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{TextField, Toggle};
    use crate::money::Money;
    use crate::types::{ZoneId, ZonePatch};

    fn home_delivery() -> FormState {
        FormState::default().set_toggle(Toggle::DeliveryHome, true)
    }

    fn with_zone(form: &FormState, name: &str, cents: i64) -> (FormState, ZoneId) {
        let (form, id) = form.add_zone();
        let form = form.update_zone(
            &id,
            &ZonePatch::default()
                .with_name(name)
                .with_price(Money::from_cents(cents)),
        );
        (form, id)
    }

    #[test]
    fn test_no_zones_fails() {
        assert_eq!(validate(&home_delivery()), Err(ValidationError::NoActiveZone));
    }

    #[test]
    fn test_only_inactive_zones_fails() {
        let (form, id) = with_zone(&home_delivery(), "Centro", 500);
        let form = form.update_zone(&id, &ZonePatch::default().with_active(false));
        assert_eq!(validate(&form), Err(ValidationError::NoActiveZone));
    }

    #[test]
    fn test_home_delivery_off_passes_vacuously() {
        let form = FormState::default().set_toggle(Toggle::DeliveryHome, false);
        assert_eq!(validate(&form), Ok(()));

        let (form, _) = with_zone(&form, "", -100);
        assert_eq!(validate(&form), Ok(()));
    }

    #[test]
    fn test_valid_zone_passes() {
        let (form, _) = with_zone(&home_delivery(), "Centro", 500);
        assert_eq!(validate(&form), Ok(()));
    }

    #[test]
    fn test_zero_price_is_allowed() {
        let (form, _) = with_zone(&home_delivery(), "Centro", 0);
        assert!(validate(&form).is_ok());
    }

    #[test]
    fn test_blank_name_fails_with_position() {
        let (form, _) = with_zone(&home_delivery(), "Centro", 500);
        let (form, id) = with_zone(&form, "   ", 500);

        assert_eq!(
            validate(&form),
            Err(ValidationError::ZoneNameRequired {
                zone_id: id,
                position: 2
            })
        );
    }

    #[test]
    fn test_negative_price_fails() {
        let (form, id) = with_zone(&home_delivery(), "Centro", 500);
        let form = form.update_zone(&id, &ZonePatch::default().with_price(Money::from_cents(-100)));

        match validate(&form) {
            Err(ValidationError::ZoneNegativePrice { zone_id, .. }) => assert_eq!(zone_id, id),
            other => panic!("expected ZoneNegativePrice, got {:?}", other),
        }
    }

    #[test]
    fn test_inactive_zones_are_not_checked() {
        let (form, _) = with_zone(&home_delivery(), "Centro", 500);
        let (form, bad) = with_zone(&form, "", -100);
        let form = form.update_zone(&bad, &ZonePatch::default().with_active(false));
        assert_eq!(validate(&form), Ok(()));
    }

    #[test]
    fn test_first_failure_wins() {
        let (form, first) = with_zone(&home_delivery(), "Centro", -100);
        let (form, _) = with_zone(&form, "", 500);

        assert!(matches!(
            validate(&form),
            Err(ValidationError::ZoneNegativePrice { zone_id, .. }) if zone_id == first
        ));
    }

    #[test]
    fn test_review_defaults_flag_bank_details() {
        assert_eq!(
            review(&FormState::default()),
            vec![SettingsWarning::IncompleteBankInfo]
        );
    }

    #[test]
    fn test_review_reports_each_problem() {
        let form = FormState::default()
            .set_field(TextField::BusinessName, " ")
            .set_field(TextField::WhatsappNumber, "+57 311")
            .set_field(TextField::PrimaryColor, "yellow")
            .set_toggle(Toggle::PaymentCash, false)
            .set_toggle(Toggle::PaymentTransfer, false)
            .set_toggle(Toggle::PaymentCard, false)
            .set_toggle(Toggle::DeliveryPickup, false)
            .set_toggle(Toggle::DeliveryHome, false)
            .set_toggle(Toggle::DeliveryTable, false);

        let codes: Vec<String> = review(&form)
            .iter()
            .map(|w| serde_json::to_value(w).unwrap()["code"].as_str().unwrap().to_string())
            .collect();

        assert_eq!(
            codes,
            vec![
                "EMPTY_BUSINESS_NAME",
                "INVALID_WHATSAPP_NUMBER",
                "INVALID_COLOR",
                "NO_PAYMENT_METHOD",
                "NO_DELIVERY_TYPE",
            ]
        );
    }

    #[test]
    fn test_hex_colors() {
        assert!(is_hex_color("#F4C542"));
        assert!(is_hex_color("#fff"));
        assert!(!is_hex_color("F4C542"));
        assert!(!is_hex_color("#F4C54"));
        assert!(!is_hex_color("#GGGGGG"));
    }
}
