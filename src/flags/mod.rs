pub mod format;
pub mod session;
pub mod store;

pub use session::{with_flags, FlagSession, Scoped, SessionState};
pub use store::{FlagSnapshot, FlagStore, WEBVIEW_COMMAND_LINE};
