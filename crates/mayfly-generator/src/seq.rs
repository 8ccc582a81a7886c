use crate::{Generator, GeneratorError};
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic generator using a sequential counter.
///
/// This generator produces sequential ids like "seq000000", "seq000001", etc.
/// Uniqueness only holds within a single instance, so it suits tests and
/// local demos rather than shared stores.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    /// Creates a new sequential generator with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a new sequential generator starting from a specific counter value.
    ///
    /// Two generators with the same prefix and offset replay the same ids,
    /// which is handy for provoking key collisions.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> Result<String, GeneratorError> {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{}{:06}", self.prefix, count))
    }
}
