use crate::error::Result;
use async_trait::async_trait;
use mayfly_core::{ShortCode, ShortUrl};
use typed_builder::TypedBuilder;

/// Parameters for creating a short URL.
///
/// Optional fields stay `None` until the manager applies its defaults.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct CreateShortUrl {
    /// The URL to redirect to.
    #[builder(setter(into))]
    pub original_url: String,
    /// Custom code to use instead of a generated one.
    #[builder(default, setter(strip_option))]
    pub alias: Option<ShortCode>,
    /// Lifetime in hours; absent means the link never expires.
    #[builder(default, setter(strip_option))]
    pub expire_in_hours: Option<u32>,
    /// Defaults to `true`.
    #[builder(default, setter(strip_option))]
    pub is_public: Option<bool>,
}

/// Request details captured for the click audit trail.
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickMetadata {
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[async_trait]
pub trait UrlShortener: Send + Sync + 'static {
    /// Creates a short URL, generating a code unless an alias is given.
    async fn create(&self, params: CreateShortUrl) -> Result<ShortUrl>;

    /// Looks up a short URL.
    ///
    /// Fails with `NotFound` when the code was never stored (or was swept)
    /// and with `Expired` when the record exists but its expiry has passed.
    async fn get_by_code(&self, code: &ShortCode) -> Result<ShortUrl>;

    /// Counts one click and appends it to the audit trail.
    ///
    /// A failed counter update is returned; a failed log append is only
    /// reported through tracing.
    async fn record_click(&self, short_url: &ShortUrl, metadata: ClickMetadata) -> Result<()>;

    /// Resolves a code to its target URL, recording the click on the way.
    ///
    /// Lookup failures are returned. Click recording never fails the redirect.
    async fn redirect(&self, code: &ShortCode, metadata: ClickMetadata) -> Result<String>;

    /// Deletes every expired short URL and returns how many were removed.
    async fn delete_expired(&self) -> Result<u64>;
}
