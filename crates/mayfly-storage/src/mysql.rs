use async_trait::async_trait;
use jiff::Timestamp;
use mayfly_core::error::{Result, StorageError};
use mayfly_core::{
    Clock, NewClickLog, NewPaste, NewShortUrl, Paste, PasteId, PasteStore, ShortCode, ShortUrl,
    ShortUrlStore, SystemClock,
};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::sync::Arc;
use tracing::info;

const SHORT_URLS_DDL: &str = include_str!("../ddl/mysql/short_urls.sql");
const URL_CLICKS_DDL: &str = include_str!("../ddl/mysql/url_clicks.sql");
const PASTES_DDL: &str = include_str!("../ddl/mysql/pastes.sql");

/// Both MySQL stores over one connection pool.
#[derive(Debug, Clone)]
pub struct MySqlStores {
    pub short_urls: MySqlShortUrlStore,
    pub pastes: MySqlPasteStore,
}

impl MySqlStores {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            short_urls: MySqlShortUrlStore::new(pool.clone()),
            pastes: MySqlPasteStore::new(pool),
        }
    }

    /// Opens a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the bundled tables when they do not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        migrate(self.short_urls.pool()).await
    }
}

/// Applies the bundled DDL. Safe to run on every start.
pub async fn migrate(pool: &MySqlPool) -> Result<()> {
    for ddl in [SHORT_URLS_DDL, URL_CLICKS_DDL, PASTES_DDL] {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(map_sqlx_error)?;
    }
    info!("mysql schema is up to date");
    Ok(())
}

fn to_millis(ts: Timestamp) -> i64 {
    ts.as_millisecond()
}

fn from_millis(column: &str, value: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(value).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{value}': {e}"))
    })
}

fn opt_from_millis(column: &str, value: Option<i64>) -> Result<Option<Timestamp>> {
    value.map(|value| from_millis(column, value)).transpose()
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

/// MySQL implementation of the short URL store.
///
/// Timestamps are stored as unix milliseconds. Deletion is physical: the
/// expiry sweep is the only way a short URL leaves the table, while its
/// `url_clicks` rows stay behind as history.
#[derive(Debug, Clone)]
pub struct MySqlShortUrlStore {
    pool: MySqlPool,
    clock: Arc<dyn Clock>,
}

impl MySqlShortUrlStore {
    /// Creates a store from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: MySqlPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn short_url_from_row(row: &MySqlRow) -> Result<ShortUrl> {
    let code: String = row.try_get("code").map_err(map_sqlx_error)?;

    Ok(ShortUrl {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        code: ShortCode::new_unchecked(code),
        original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
        alias: row.try_get("alias").map_err(map_sqlx_error)?,
        clicks: row.try_get("clicks").map_err(map_sqlx_error)?,
        is_public: row.try_get("is_public").map_err(map_sqlx_error)?,
        expires_at: opt_from_millis(
            "expires_at",
            row.try_get("expires_at").map_err(map_sqlx_error)?,
        )?,
        created_at: from_millis(
            "created_at",
            row.try_get("created_at").map_err(map_sqlx_error)?,
        )?,
        updated_at: from_millis(
            "updated_at",
            row.try_get("updated_at").map_err(map_sqlx_error)?,
        )?,
    })
}

#[async_trait]
impl ShortUrlStore for MySqlShortUrlStore {
    async fn insert(&self, record: NewShortUrl) -> Result<ShortUrl> {
        let now = self.clock.now();

        let result = sqlx::query(
            r#"
            INSERT INTO short_urls
                (code, original_url, alias, clicks, is_public, expires_at, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(record.code.as_str())
        .bind(&record.original_url)
        .bind(record.alias.as_deref())
        .bind(record.is_public)
        .bind(record.expires_at.map(to_millis))
        .bind(to_millis(now))
        .bind(to_millis(now))
        .execute(&self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(err) if is_unique_violation(&err) => {
                return Err(StorageError::Conflict(record.code.to_string()))
            }
            Err(err) => return Err(map_sqlx_error(err)),
        };

        let id = i64::try_from(result.last_insert_id()).map_err(|e| {
            StorageError::InvalidData(format!("insert id out of range: {e}"))
        })?;

        Ok(ShortUrl {
            id,
            code: record.code,
            original_url: record.original_url,
            alias: record.alias,
            clicks: 0,
            is_public: record.is_public,
            expires_at: record.expires_at,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_code(&self, code: &ShortCode) -> Result<Option<ShortUrl>> {
        let row = sqlx::query(
            r#"
            SELECT id, code, original_url, alias, clicks, is_public,
                   expires_at, created_at, updated_at
            FROM short_urls
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(short_url_from_row).transpose()
    }

    async fn increment_clicks(&self, id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE short_urls
            SET clicks = clicks + 1, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(to_millis(self.clock.now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn append_click(&self, click: NewClickLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO url_clicks (short_url_id, referrer, user_agent, ip_address, clicked_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(click.short_url_id)
        .bind(click.referrer)
        .bind(click.user_agent)
        .bind(click.ip_address)
        .bind(to_millis(click.clicked_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM short_urls
            WHERE expires_at IS NOT NULL
              AND expires_at < ?
            "#,
        )
        .bind(to_millis(now))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}

/// MySQL implementation of the paste store.
#[derive(Debug, Clone)]
pub struct MySqlPasteStore {
    pool: MySqlPool,
    clock: Arc<dyn Clock>,
}

impl MySqlPasteStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: MySqlPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn paste_from_row(row: &MySqlRow) -> Result<Paste> {
    let id: String = row.try_get("id").map_err(map_sqlx_error)?;

    Ok(Paste {
        id: PasteId::new(id),
        title: row.try_get("title").map_err(map_sqlx_error)?,
        content: row.try_get("content").map_err(map_sqlx_error)?,
        syntax: row.try_get("syntax").map_err(map_sqlx_error)?,
        is_public: row.try_get("is_public").map_err(map_sqlx_error)?,
        is_compressed: row.try_get("is_compressed").map_err(map_sqlx_error)?,
        expires_at: opt_from_millis(
            "expires_at",
            row.try_get("expires_at").map_err(map_sqlx_error)?,
        )?,
        created_at: from_millis(
            "created_at",
            row.try_get("created_at").map_err(map_sqlx_error)?,
        )?,
        updated_at: from_millis(
            "updated_at",
            row.try_get("updated_at").map_err(map_sqlx_error)?,
        )?,
    })
}

#[async_trait]
impl PasteStore for MySqlPasteStore {
    async fn insert(&self, paste: NewPaste) -> Result<Paste> {
        let now = self.clock.now();

        let result = sqlx::query(
            r#"
            INSERT INTO pastes
                (id, title, content, syntax, is_public, is_compressed,
                 expires_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(paste.id.as_str())
        .bind(paste.title.as_deref())
        .bind(&paste.content)
        .bind(paste.syntax.as_deref())
        .bind(paste.is_public)
        .bind(paste.is_compressed)
        .bind(paste.expires_at.map(to_millis))
        .bind(to_millis(now))
        .bind(to_millis(now))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Paste {
                id: paste.id,
                title: paste.title,
                content: paste.content,
                syntax: paste.syntax,
                is_public: paste.is_public,
                is_compressed: paste.is_compressed,
                expires_at: paste.expires_at,
                created_at: now,
                updated_at: now,
            }),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(paste.id.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn get(&self, id: &PasteId) -> Result<Option<Paste>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, syntax, is_public, is_compressed,
                   expires_at, created_at, updated_at
            FROM pastes
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(paste_from_row).transpose()
    }

    async fn delete(&self, id: &PasteId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pastes WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Paste>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, syntax, is_public, is_compressed,
                   expires_at, created_at, updated_at
            FROM pastes
            ORDER BY created_at DESC, seq DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(paste_from_row).collect()
    }

    async fn delete_expired(&self, now: Timestamp) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM pastes
            WHERE expires_at IS NOT NULL
              AND expires_at < ?
            "#,
        )
        .bind(to_millis(now))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }
}
