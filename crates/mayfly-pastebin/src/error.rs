use mayfly_core::StorageError;
use mayfly_generator::GeneratorError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PastebinError>;

#[derive(Debug, Clone, Error)]
pub enum PastebinError {
    #[error("invalid expiry: {0}")]
    InvalidExpiry(String),
    #[error("paste id already exists: {0}")]
    DuplicateId(String),
    #[error("paste not found: {0}")]
    NotFound(String),
    #[error("paste has expired: {0}")]
    Expired(String),
    #[error("id generation failed: {0}")]
    Generator(#[from] GeneratorError),
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for PastebinError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(id) => Self::DuplicateId(id),
            other => Self::Storage(other),
        }
    }
}
