//! Pastebin: paste lifecycle, expiry and recent listing.

pub mod error;
pub mod paste;
pub mod service;

pub use error::PastebinError;
pub use paste::{CreatePaste, Pastebin};
pub use service::{PasteManager, PastebinSettings, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT};
