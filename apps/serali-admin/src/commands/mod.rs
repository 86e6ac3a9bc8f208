//! # Commands
//!
//! Entry points for the settings page.
//!
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! └── settings.rs  ◄─── Load, edit, upload, submit
//! ```
//!
//! Commands take the [`EditorSession`](crate::state::EditorSession) they act
//! on and return `Result<_, ApiError>`, so the page always receives either a
//! fresh view or a coded error.

pub mod settings;

pub use settings::{AddZoneResponse, SettingsView, SubmitResponse};
