//! URL shortener: short code lifecycle, expiry and click accounting.
//!
//! [`ShortUrlManager`] turns a [`ShortUrlStore`](mayfly_core::ShortUrlStore)
//! and a code [`Generator`](mayfly_generator::Generator) into the
//! [`UrlShortener`] operations used by the HTTP boundary.

pub mod error;
pub mod service;
pub mod shortener;

pub use error::ShortenerError;
pub use service::{ShortUrlManager, ShortenerSettings};
pub use shortener::{ClickMetadata, CreateShortUrl, UrlShortener};
