//! Core types and traits for the Mayfly lifecycle services.
//!
//! This crate provides the records, identifiers, store contracts and
//! expiration rules shared by the URL shortener and the pastebin.

pub mod clock;
pub mod error;
pub mod expiration;
pub mod paste_id;
pub mod record;
pub mod shortcode;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, InvalidExpiry, StorageError};
pub use expiration::{is_expired, ExpirationPolicy};
pub use paste_id::PasteId;
pub use record::{ClickLog, NewClickLog, NewPaste, NewShortUrl, Paste, ShortUrl};
pub use shortcode::ShortCode;
pub use store::{PasteStore, ShortUrlStore};
