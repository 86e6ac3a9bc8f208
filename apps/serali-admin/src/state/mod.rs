//! Editing session state.

mod session;

pub use session::{EditorSession, EditorSettings, NoticeView, SAVED_MESSAGE};
