use crate::error::Result;
use async_trait::async_trait;
use mayfly_core::{Paste, PasteId};
use typed_builder::TypedBuilder;

/// Parameters for creating a paste.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct CreatePaste {
    #[builder(setter(into))]
    pub content: String,
    #[builder(default, setter(strip_option, into))]
    pub title: Option<String>,
    /// Syntax highlighting hint, stored verbatim.
    #[builder(default, setter(strip_option, into))]
    pub syntax: Option<String>,
    #[builder(default, setter(strip_option))]
    pub is_public: Option<bool>,
    /// Lifetime in hours; absent means the configured default.
    #[builder(default, setter(strip_option))]
    pub expire_in_hours: Option<u32>,
    #[builder(default, setter(strip_option))]
    pub compressed: Option<bool>,
}

#[async_trait]
pub trait Pastebin: Send + Sync + 'static {
    /// Stores a new paste under a freshly generated id.
    async fn create(&self, params: CreatePaste) -> Result<Paste>;

    /// Fetches a paste; `Expired` pastes stay stored until swept.
    async fn get(&self, id: &PasteId) -> Result<Paste>;

    /// Deletes a paste. Deleting a missing id succeeds.
    async fn delete(&self, id: &PasteId) -> Result<()>;

    /// Lists the most recently created pastes.
    ///
    /// A limit outside `1..=100`, or no limit, lists 20. Private and expired
    /// pastes are included.
    async fn list_recent(&self, limit: Option<i64>) -> Result<Vec<Paste>>;

    /// Deletes every expired paste and returns how many were removed.
    async fn delete_expired(&self) -> Result<u64>;
}
