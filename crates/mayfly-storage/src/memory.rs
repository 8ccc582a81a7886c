use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use mayfly_core::error::{Result, StorageError};
use mayfly_core::{
    is_expired, ClickLog, Clock, NewClickLog, NewPaste, NewShortUrl, Paste, PasteId, PasteStore,
    ShortCode, ShortUrl, ShortUrlStore, SystemClock,
};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory short URL store using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Click increments happen under the shard lock
/// of their record, so concurrent increments are never lost.
#[derive(Debug)]
pub struct InMemoryShortUrlStore {
    by_code: DashMap<String, ShortUrl>,
    codes_by_id: DashMap<i64, String>,
    clicks: DashMap<i64, ClickLog>,
    next_id: AtomicI64,
    next_click_id: AtomicI64,
    clock: Arc<dyn Clock>,
}

impl InMemoryShortUrlStore {
    /// Creates a new in-memory store stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a new in-memory store that assigns timestamps from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            by_code: DashMap::new(),
            codes_by_id: DashMap::new(),
            clicks: DashMap::new(),
            next_id: AtomicI64::new(1),
            next_click_id: AtomicI64::new(1),
            clock,
        }
    }

    /// Returns the click audit trail in append order.
    pub fn click_logs(&self) -> Vec<ClickLog> {
        let mut logs: Vec<ClickLog> = self.clicks.iter().map(|e| e.value().clone()).collect();
        logs.sort_by_key(|log| log.id);
        logs
    }

    /// Number of stored short URLs, expired ones included.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl Default for InMemoryShortUrlStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShortUrlStore for InMemoryShortUrlStore {
    async fn insert(&self, record: NewShortUrl) -> Result<ShortUrl> {
        let now = self.clock.now();

        // Check-and-insert under the entry's shard lock: expired records
        // still own their code until a sweep removes them.
        match self.by_code.entry(record.code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(record.code.to_string())),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let stored = ShortUrl {
                    id,
                    code: record.code,
                    original_url: record.original_url,
                    alias: record.alias,
                    clicks: 0,
                    is_public: record.is_public,
                    expires_at: record.expires_at,
                    created_at: now,
                    updated_at: now,
                };
                self.codes_by_id.insert(id, stored.code.as_str().to_owned());
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn get_by_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>> {
        Ok(self.by_code.get(code.as_str()).map(|e| e.value().clone()))
    }

    async fn increment_clicks(&self, id: i64) -> Result<()> {
        let Some(code) = self.codes_by_id.get(&id).map(|e| e.value().clone()) else {
            return Ok(());
        };

        if let Some(mut record) = self.by_code.get_mut(&code) {
            record.clicks += 1;
            record.updated_at = self.clock.now();
        }

        Ok(())
    }

    async fn append_click(&self, click: NewClickLog) -> Result<()> {
        let id = self.next_click_id.fetch_add(1, Ordering::SeqCst);
        self.clicks.insert(
            id,
            ClickLog {
                id,
                short_url_id: click.short_url_id,
                referrer: click.referrer,
                user_agent: click.user_agent,
                ip_address: click.ip_address,
                clicked_at: click.clicked_at,
            },
        );
        Ok(())
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64> {
        let expired: Vec<String> = self
            .by_code
            .iter()
            .filter(|e| is_expired(e.expires_at, now))
            .map(|e| e.key().clone())
            .collect();

        let mut removed = 0;
        for code in expired {
            if let Some((_, record)) = self
                .by_code
                .remove_if(&code, |_, record| is_expired(record.expires_at, now))
            {
                self.codes_by_id.remove(&record.id);
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[derive(Debug, Clone)]
struct StoredPaste {
    paste: Paste,
    /// Insertion order, breaks ties between equal `created_at` values.
    seq: u64,
}

/// In-memory paste store using DashMap.
#[derive(Debug)]
pub struct InMemoryPasteStore {
    pastes: DashMap<String, StoredPaste>,
    next_seq: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl InMemoryPasteStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            pastes: DashMap::new(),
            next_seq: AtomicU64::new(0),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.pastes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pastes.is_empty()
    }
}

impl Default for InMemoryPasteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasteStore for InMemoryPasteStore {
    async fn insert(&self, paste: NewPaste) -> Result<Paste> {
        let now = self.clock.now();

        match self.pastes.entry(paste.id.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(paste.id.to_string())),
            Entry::Vacant(slot) => {
                let stored = Paste {
                    id: paste.id,
                    title: paste.title,
                    content: paste.content,
                    syntax: paste.syntax,
                    is_public: paste.is_public,
                    is_compressed: paste.is_compressed,
                    expires_at: paste.expires_at,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(StoredPaste {
                    paste: stored.clone(),
                    seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
                });
                Ok(stored)
            }
        }
    }

    async fn get(&self, id: &PasteId) -> Result<Option<Paste>> {
        Ok(self.pastes.get(id.as_str()).map(|e| e.paste.clone()))
    }

    async fn delete(&self, id: &PasteId) -> Result<bool> {
        Ok(self.pastes.remove(id.as_str()).is_some())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Paste>> {
        let mut all: Vec<StoredPaste> = self.pastes.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| {
            b.paste
                .created_at
                .cmp(&a.paste.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(all
            .into_iter()
            .take(limit as usize)
            .map(|stored| stored.paste)
            .collect())
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64> {
        let mut removed = 0;
        self.pastes.retain(|_, stored| {
            let keep = !is_expired(stored.paste.expires_at, now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
