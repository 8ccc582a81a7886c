use crate::error::{PastebinError, Result};
use crate::paste::{CreatePaste, Pastebin};
use async_trait::async_trait;
use mayfly_core::{
    is_expired, Clock, ExpirationPolicy, InvalidExpiry, NewPaste, Paste, PasteId, PasteStore, StorageError,
    SystemClock,
};
use mayfly_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};
use typed_builder::TypedBuilder;

/// Page size used when the caller asks for none or an out-of-range one.
pub const DEFAULT_RECENT_LIMIT: u32 = 20;
pub const MAX_RECENT_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct PastebinSettings {
    /// Lifetime of a paste created without `expire_in_hours`.
    /// `None` keeps such pastes forever.
    #[builder(default = Some(24))]
    pub default_expiry_hours: Option<u32>,
    /// How many generated ids to try when the store reports a collision.
    #[builder(default = 1)]
    pub id_attempts: u32,
}

impl Default for PastebinSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl PastebinSettings {
    fn expiration_policy(&self) -> ExpirationPolicy {
        match self.default_expiry_hours {
            Some(hours) => ExpirationPolicy::default_hours(hours),
            None => ExpirationPolicy::never(),
        }
    }
}

/// A concrete implementation of the [`Pastebin`] trait over a [`PasteStore`].
#[derive(Debug, Clone)]
pub struct PasteManager<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    clock: Arc<dyn Clock>,
    settings: PastebinSettings,
}

impl<S: PasteStore, G: Generator> PasteManager<S, G> {
    pub fn new(store: S, generator: G) -> Self {
        Self::with_shared_store(Arc::new(store), generator)
    }

    pub fn with_shared_store(store: Arc<S>, generator: G) -> Self {
        Self {
            store,
            generator: Arc::new(generator),
            clock: Arc::new(SystemClock),
            settings: PastebinSettings::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: PastebinSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn insert_with_generated_id(&self, paste: NewPaste) -> Result<Paste> {
        let attempts = self.settings.id_attempts.max(1);
        let mut attempt = 1;

        loop {
            let candidate = NewPaste {
                id: PasteId::new(self.generator.generate()?),
                ..paste.clone()
            };

            match self.store.insert(candidate).await {
                Ok(stored) => return Ok(stored),
                Err(StorageError::Conflict(id)) if attempt < attempts => {
                    debug!(%id, attempt, attempts, "generated paste id collided, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn recent_limit(limit: Option<i64>) -> u32 {
    limit
        .and_then(|limit| u32::try_from(limit).ok())
        .filter(|limit| (1..=MAX_RECENT_LIMIT).contains(limit))
        .unwrap_or(DEFAULT_RECENT_LIMIT)
}

#[async_trait]
impl<S: PasteStore, G: Generator> Pastebin for PasteManager<S, G> {
    #[instrument(skip_all, fields(size = params.content.len()))]
    async fn create(&self, params: CreatePaste) -> Result<Paste> {
        let expires_at = self
            .settings
            .expiration_policy()
            .compute_expiry(self.clock.now(), params.expire_in_hours)
            .map_err(|InvalidExpiry(message)| PastebinError::InvalidExpiry(message))?;

        let paste = NewPaste {
            // replaced by a generated id
            id: PasteId::new(""),
            title: params.title,
            content: params.content,
            syntax: params.syntax,
            is_public: params.is_public.unwrap_or(true),
            is_compressed: params.compressed.unwrap_or(false),
            expires_at,
        };

        let stored = self.insert_with_generated_id(paste).await?;
        info!(id = %stored.id, expires_at = ?stored.expires_at, "created paste");
        Ok(stored)
    }

    async fn get(&self, id: &PasteId) -> Result<Paste> {
        trace!(%id, "fetching paste");

        let Some(paste) = self.store.get(id).await? else {
            return Err(PastebinError::NotFound(id.to_string()));
        };

        if is_expired(paste.expires_at, self.clock.now()) {
            debug!(%id, expires_at = ?paste.expires_at, "paste has expired");
            return Err(PastebinError::Expired(id.to_string()));
        }

        Ok(paste)
    }

    async fn delete(&self, id: &PasteId) -> Result<()> {
        let removed = self.store.delete(id).await?;
        debug!(%id, removed, "deleted paste");
        Ok(())
    }

    async fn list_recent(&self, limit: Option<i64>) -> Result<Vec<Paste>> {
        Ok(self.store.list_recent(recent_limit(limit)).await?)
    }

    async fn delete_expired(&self) -> Result<u64> {
        let removed = self.store.delete_expired(self.clock.now()).await?;
        info!(removed, "swept expired pastes");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{SignedDuration, Timestamp};
    use mayfly_core::ManualClock;
    use mayfly_generator::{SeqGenerator, UrlSafeIdGenerator};
    use mayfly_storage::InMemoryPasteStore;

    fn start() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn manager_at(clock: Arc<ManualClock>) -> PasteManager<InMemoryPasteStore, UrlSafeIdGenerator> {
        let store = InMemoryPasteStore::with_clock(clock.clone());
        PasteManager::new(store, UrlSafeIdGenerator::default()).with_clock(clock)
    }

    fn test_manager() -> PasteManager<InMemoryPasteStore, UrlSafeIdGenerator> {
        manager_at(Arc::new(ManualClock::new(start())))
    }

    fn hello() -> CreatePaste {
        CreatePaste::builder().content("hello world").build()
    }

    #[test]
    fn recent_limit_clamps_to_default() {
        assert_eq!(recent_limit(None), 20);
        assert_eq!(recent_limit(Some(0)), 20);
        assert_eq!(recent_limit(Some(-5)), 20);
        assert_eq!(recent_limit(Some(101)), 20);
        assert_eq!(recent_limit(Some(i64::MAX)), 20);
        assert_eq!(recent_limit(Some(1)), 1);
        assert_eq!(recent_limit(Some(100)), 100);
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let manager = test_manager();

        let paste = manager.create(hello()).await.unwrap();

        assert_eq!(paste.id.as_str().len(), 10);
        assert!(paste
            .id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(paste.content, "hello world");
        assert_eq!(paste.title, None);
        assert_eq!(paste.syntax, None);
        assert!(paste.is_public);
        assert!(!paste.is_compressed);
        assert_eq!(paste.created_at, start());
        assert_eq!(
            paste.expires_at,
            Some(paste.created_at + SignedDuration::from_hours(24))
        );

        let got = manager.get(&paste.id).await.unwrap();
        assert_eq!(got, paste);
    }

    #[tokio::test]
    async fn create_keeps_explicit_fields() {
        let manager = test_manager();

        let paste = manager
            .create(
                CreatePaste::builder()
                    .content("fn main() {}")
                    .title("snippet")
                    .syntax("rust")
                    .is_public(false)
                    .compressed(true)
                    .expire_in_hours(1)
                    .build(),
            )
            .await
            .unwrap();

        assert_eq!(paste.title.as_deref(), Some("snippet"));
        assert_eq!(paste.syntax.as_deref(), Some("rust"));
        assert!(!paste.is_public);
        assert!(paste.is_compressed);
        // stored as given
        assert_eq!(paste.content, "fn main() {}");
        assert_eq!(paste.expires_at, Some(start() + SignedDuration::from_hours(1)));
    }

    #[tokio::test]
    async fn default_expiry_can_be_disabled() {
        let manager = test_manager().with_settings(
            PastebinSettings::builder()
                .default_expiry_hours(None)
                .build(),
        );

        let paste = manager.create(hello()).await.unwrap();
        assert_eq!(paste.expires_at, None);
    }

    #[tokio::test]
    async fn unrepresentable_default_expiry_is_rejected() {
        let manager = manager_at(Arc::new(ManualClock::new(Timestamp::MAX)));

        let err = manager.create(hello()).await.unwrap_err();

        assert!(matches!(err, PastebinError::InvalidExpiry(_)));
        assert!(manager.store().is_empty());
    }

    #[tokio::test]
    async fn expired_and_missing_are_distinct() {
        let clock = Arc::new(ManualClock::new(start()));
        let manager = manager_at(clock.clone());
        let paste = manager.create(hello()).await.unwrap();

        clock.advance(SignedDuration::from_hours(24));
        assert!(manager.get(&paste.id).await.is_ok());

        clock.advance(SignedDuration::from_secs(1));
        let err = manager.get(&paste.id).await.unwrap_err();
        assert!(matches!(err, PastebinError::Expired(id) if id == paste.id.as_str()));
        // reading never deletes
        assert_eq!(manager.store().len(), 1);

        let err = manager.get(&PasteId::new("nope")).await.unwrap_err();
        assert!(matches!(err, PastebinError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let manager = test_manager();
        let paste = manager.create(hello()).await.unwrap();

        manager.delete(&paste.id).await.unwrap();
        manager.delete(&paste.id).await.unwrap();
        manager.delete(&PasteId::new("neverMade")).await.unwrap();

        let err = manager.get(&paste.id).await.unwrap_err();
        assert!(matches!(err, PastebinError::NotFound(_)));
    }

    #[tokio::test]
    async fn id_collision_surfaces_or_retries() {
        let store = Arc::new(InMemoryPasteStore::new());
        let first = PasteManager::with_shared_store(store.clone(), SeqGenerator::with_prefix("p"));
        first.create(hello()).await.unwrap();

        let replay =
            PasteManager::with_shared_store(store.clone(), SeqGenerator::with_prefix("p"));
        let err = replay.create(hello()).await.unwrap_err();
        assert!(matches!(err, PastebinError::DuplicateId(id) if id == "p000000"));

        let retrying = PasteManager::with_shared_store(store.clone(), SeqGenerator::with_prefix("p"))
            .with_settings(PastebinSettings::builder().id_attempts(2).build());
        let paste = retrying.create(hello()).await.unwrap();
        assert_eq!(paste.id.as_str(), "p000001");
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_bounded() {
        let clock = Arc::new(ManualClock::new(start()));
        let manager = manager_at(clock.clone());

        let mut ids = vec![];
        for _ in 0..25 {
            ids.push(manager.create(hello()).await.unwrap().id);
            clock.advance(SignedDuration::from_secs(1));
        }
        ids.reverse();

        let recent = manager.list_recent(None).await.unwrap();
        assert_eq!(recent.len(), 20);
        let got: Vec<PasteId> = recent.into_iter().map(|p| p.id).collect();
        assert_eq!(got, ids[..20].to_vec());

        assert_eq!(manager.list_recent(Some(3)).await.unwrap().len(), 3);
        assert_eq!(manager.list_recent(Some(0)).await.unwrap().len(), 20);
        assert_eq!(manager.list_recent(Some(-1)).await.unwrap().len(), 20);
        assert_eq!(manager.list_recent(Some(101)).await.unwrap().len(), 20);
        assert_eq!(manager.list_recent(Some(100)).await.unwrap().len(), 25);
    }

    #[tokio::test]
    async fn list_recent_includes_private_and_expired() {
        let clock = Arc::new(ManualClock::new(start()));
        let manager = manager_at(clock.clone());

        let private = manager
            .create(CreatePaste::builder().content("secret").is_public(false).build())
            .await
            .unwrap();
        let short_lived = manager
            .create(CreatePaste::builder().content("brief").expire_in_hours(1).build())
            .await
            .unwrap();

        clock.advance(SignedDuration::from_hours(2));

        let recent = manager.list_recent(Some(10)).await.unwrap();
        let ids: Vec<&PasteId> = recent.iter().map(|p| &p.id).collect();
        assert_eq!(ids, vec![&short_lived.id, &private.id]);
    }

    #[tokio::test]
    async fn delete_expired_is_idempotent() {
        let clock = Arc::new(ManualClock::new(start()));
        let manager = manager_at(clock.clone());

        manager
            .create(CreatePaste::builder().content("a").expire_in_hours(1).build())
            .await
            .unwrap();
        manager.create(hello()).await.unwrap();

        clock.advance(SignedDuration::from_hours(2));
        assert_eq!(manager.delete_expired().await.unwrap(), 1);
        assert_eq!(manager.delete_expired().await.unwrap(), 0);
        assert_eq!(manager.store().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() {
        let manager = Arc::new(test_manager());

        let mut handles = vec![];
        for i in 0..32 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager
                    .create(CreatePaste::builder().content(format!("paste {i}")).build())
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = vec![];
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        assert_eq!(ids.len(), 32);
        assert_eq!(manager.store().len(), 32);
    }
}
