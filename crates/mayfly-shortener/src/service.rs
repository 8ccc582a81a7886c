use crate::error::{Result, ShortenerError};
use crate::shortener::{ClickMetadata, CreateShortUrl, UrlShortener};
use async_trait::async_trait;
use mayfly_core::{
    is_expired, Clock, ExpirationPolicy, InvalidExpiry, NewClickLog, NewShortUrl, ShortCode, ShortUrl,
    ShortUrlStore, StorageError, SystemClock,
};
use mayfly_generator::Generator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, trace, warn};
use typed_builder::TypedBuilder;
use url::Url;

/// Tunables of a [`ShortUrlManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct ShortenerSettings {
    /// How many generated codes to try when the store reports a collision.
    ///
    /// `1` surfaces the first collision as `DuplicateCode`. Aliases are
    /// never retried regardless of this value.
    #[builder(default = 1)]
    pub code_attempts: u32,
    /// Upper bound on click recording during a redirect.
    ///
    /// When it elapses the click is dropped and the redirect still succeeds.
    /// Keep it below the request deadline.
    #[builder(default = Duration::from_secs(2))]
    pub click_timeout: Duration,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the [`UrlShortener`] trait.
///
/// This manager wraps a [`ShortUrlStore`] and a [`Generator`] to handle:
/// - Short code generation (auto-generated or custom alias)
/// - Expiry computation and checks
/// - URL validation
/// - Click counting and click logging
///
/// It keeps no state besides these handles.
#[derive(Debug, Clone)]
pub struct ShortUrlManager<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    clock: Arc<dyn Clock>,
    settings: ShortenerSettings,
}

impl<S: ShortUrlStore, G: Generator> ShortUrlManager<S, G> {
    /// Creates a manager on the system clock with default settings.
    pub fn new(store: S, generator: G) -> Self {
        Self::with_shared_store(Arc::new(store), generator)
    }

    /// Creates a manager over a store that is also used elsewhere.
    pub fn with_shared_store(store: Arc<S>, generator: G) -> Self {
        Self {
            store,
            generator: Arc::new(generator),
            clock: Arc::new(SystemClock),
            settings: ShortenerSettings::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: ShortenerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validates that the URL is absolute http(s) with a host.
    fn validate_url(raw: &str) -> Result<()> {
        if raw.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(raw)
            .map_err(|e| ShortenerError::InvalidUrl(format!("{raw}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                url.scheme()
            )));
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(()),
            _ => Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {raw}"
            ))),
        }
    }

    async fn insert_with_alias(&self, alias: ShortCode, record: NewShortUrl) -> Result<ShortUrl> {
        let record = NewShortUrl {
            alias: Some(alias.to_string()),
            code: alias,
            ..record
        };
        Ok(self.store.insert(record).await?)
    }

    async fn insert_with_generated_code(&self, record: NewShortUrl) -> Result<ShortUrl> {
        let attempts = self.settings.code_attempts.max(1);
        let mut attempt = 1;

        loop {
            let code = ShortCode::new_unchecked(self.generator.generate()?);
            let candidate = NewShortUrl {
                code,
                ..record.clone()
            };

            match self.store.insert(candidate).await {
                Ok(stored) => return Ok(stored),
                Err(StorageError::Conflict(code)) if attempt < attempts => {
                    debug!(%code, attempt, attempts, "generated short code collided, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[async_trait]
impl<S: ShortUrlStore, G: Generator> UrlShortener for ShortUrlManager<S, G> {
    #[instrument(skip_all, fields(alias = params.alias.as_ref().map(ShortCode::as_str)))]
    async fn create(&self, params: CreateShortUrl) -> Result<ShortUrl> {
        Self::validate_url(&params.original_url)?;

        let expires_at = ExpirationPolicy::never()
            .compute_expiry(self.clock.now(), params.expire_in_hours)
            .map_err(|InvalidExpiry(message)| ShortenerError::InvalidExpiry(message))?;

        let record = NewShortUrl {
            // replaced below by the alias or a generated code
            code: ShortCode::new_unchecked(""),
            original_url: params.original_url,
            alias: None,
            is_public: params.is_public.unwrap_or(true),
            expires_at,
        };

        let stored = match params.alias.filter(|alias| !alias.as_str().is_empty()) {
            Some(alias) => self.insert_with_alias(alias, record).await?,
            None => self.insert_with_generated_code(record).await?,
        };

        info!(
            id = stored.id,
            code = %stored.code,
            expires_at = ?stored.expires_at,
            "created short url"
        );
        Ok(stored)
    }

    async fn get_by_code(&self, code: &ShortCode) -> Result<ShortUrl> {
        trace!(code = %code, "resolving short code");

        let Some(record) = self.store.get_by_code(code).await? else {
            trace!(code = %code, "short code not found");
            return Err(ShortenerError::NotFound(code.to_string()));
        };

        if is_expired(record.expires_at, self.clock.now()) {
            debug!(code = %code, expires_at = ?record.expires_at, "short url has expired");
            return Err(ShortenerError::Expired(code.to_string()));
        }

        Ok(record)
    }

    async fn record_click(&self, short_url: &ShortUrl, metadata: ClickMetadata) -> Result<()> {
        self.store.increment_clicks(short_url.id).await?;

        let click = NewClickLog {
            short_url_id: short_url.id,
            referrer: non_empty(metadata.referrer),
            user_agent: non_empty(metadata.user_agent),
            ip_address: non_empty(metadata.ip_address),
            clicked_at: self.clock.now(),
        };

        if let Err(error) = self.store.append_click(click).await {
            warn!(code = %short_url.code, %error, "failed to log click");
        }

        Ok(())
    }

    #[instrument(skip(self, metadata), fields(code = %code))]
    async fn redirect(&self, code: &ShortCode, metadata: ClickMetadata) -> Result<String> {
        let record = self.get_by_code(code).await?;

        let timeout = self.settings.click_timeout;
        match tokio::time::timeout(timeout, self.record_click(&record, metadata)).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => warn!(%error, "failed to record click, redirecting anyway"),
            Err(_) => warn!(?timeout, "recording click timed out, redirecting anyway"),
        }

        debug!(url = %record.original_url, "resolved short code");
        Ok(record.original_url)
    }

    async fn delete_expired(&self) -> Result<u64> {
        let removed = self.store.delete_expired(self.clock.now()).await?;
        info!(removed, "swept expired short urls");
        Ok(removed)
    }
}
