use mayfly_core::StorageError;
use mayfly_generator::GeneratorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenerError>;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid expiry: {0}")]
    InvalidExpiry(String),
    #[error("short code already exists: {0}")]
    DuplicateCode(String),
    #[error("short url not found: {0}")]
    NotFound(String),
    #[error("short url has expired: {0}")]
    Expired(String),
    #[error("code generation failed: {0}")]
    Generator(#[from] GeneratorError),
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(code) => Self::DuplicateCode(code),
            other => Self::Storage(other),
        }
    }
}
