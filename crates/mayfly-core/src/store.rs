use crate::error::Result;
use crate::paste_id::PasteId;
use crate::record::{NewClickLog, NewPaste, NewShortUrl, Paste, ShortUrl};
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

/// Persistence for short URLs and their click trail.
///
/// Expired records are returned as stored; deciding what expiry means is
/// left to the caller.
#[async_trait]
pub trait ShortUrlStore: Send + Sync + 'static {
    /// Inserts a new short URL. Returns `Err(Conflict)` if the code already exists.
    async fn insert(&self, record: NewShortUrl) -> Result<ShortUrl>;

    /// Retrieves the short URL for a given code.
    /// Returns `None` if the code does not exist.
    async fn get_by_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>>;

    /// Adds one to the click counter of the record with the given id.
    /// An unknown id is not an error.
    async fn increment_clicks(&self, id: i64) -> Result<()>;

    /// Appends a row to the click audit trail.
    async fn append_click(&self, click: NewClickLog) -> Result<()>;

    /// Removes every record that expired strictly before `now`.
    /// Returns the number of removed records.
    async fn delete_expired(&self, now: Timestamp) -> Result<u64>;
}

/// Persistence for pastes.
#[async_trait]
pub trait PasteStore: Send + Sync + 'static {
    /// Inserts a new paste. Returns `Err(Conflict)` if the id already exists.
    async fn insert(&self, paste: NewPaste) -> Result<Paste>;

    /// Retrieves the paste with the given id.
    async fn get(&self, id: &PasteId) -> Result<Option<Paste>>;

    /// Deletes the paste with the given id.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, id: &PasteId) -> Result<bool>;

    /// Lists up to `limit` pastes, most recently created first.
    async fn list_recent(&self, limit: u32) -> Result<Vec<Paste>>;

    /// Removes every paste that expired strictly before `now`.
    async fn delete_expired(&self, now: Timestamp) -> Result<u64>;
}
