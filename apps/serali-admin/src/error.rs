//! # Error Types
//!
//! Errors of the editor session and the shape the settings page receives.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Settings Editor                    │
//! │                                                                         │
//! │  Settings page                 Rust backend                             │
//! │  ─────────────                 ────────────                             │
//! │                                                                         │
//! │  submit                                                                 │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  EditorSession::submit                                           │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Save in flight? ─── EditorError::SaveInProgress ───┐           │  │
//! │  │         │                                           │           │  │
//! │  │         ▼                                           │           │  │
//! │  │  validate() ──────── EditorError::Validation ───────┤           │  │
//! │  │         │                                           ▼           │  │
//! │  │         ▼                                        ApiError ─────►│  │
//! │  │  write_config ────── EditorError::Persist ──────────┘           │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Every error is shown as a dismissible inline message; none is fatal.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use serali_core::{CoreError, ValidationError};
use serali_db::DbError;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Editor Error
// =============================================================================

/// Everything an editing session can refuse.
///
/// The form state is never changed by a failed operation.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Rejected edit (oversized logo, unknown field name).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Pre-save validation failed; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store refused the write. The user may retry.
    #[error("Error saving settings. Please try again.")]
    Persist(#[from] DbError),

    /// A save is in flight; edits and resubmits wait for it.
    #[error("Settings are being saved, please wait")]
    SaveInProgress,
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

// =============================================================================
// Config Error
// =============================================================================

/// Failures loading or saving `admin.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::SaveFailed(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// API Error
// =============================================================================

/// Error returned from settings commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Delivery zone #2 needs a name"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A pre-save rule failed
    ValidationError,

    /// Uploaded logo over the size limit
    LogoTooLarge,

    /// The store rejected the write
    PersistError,

    /// Another save is still running
    SaveInProgress,

    /// The page named a field that does not exist
    UnknownField,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::LogoTooLarge { .. } => ErrorCode::LogoTooLarge,
            CoreError::UnknownField(_) => ErrorCode::UnknownField,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        match err {
            CoreError::Validation(e) => ApiError::new(code, e.to_string()),
            other => ApiError::new(code, other.to_string()),
        }
    }
}

/// Converts editor errors to API errors.
impl From<EditorError> for ApiError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::Core(e) => ApiError::from(e),
            EditorError::Validation(e) => ApiError::new(ErrorCode::ValidationError, e.to_string()),
            // The session already logged the cause; the page gets the generic message
            EditorError::Persist(_) => ApiError::new(ErrorCode::PersistError, err.to_string()),
            EditorError::SaveInProgress => {
                ApiError::new(ErrorCode::SaveInProgress, err.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
