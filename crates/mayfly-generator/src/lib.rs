//! Identifier generators for short codes and paste ids.

pub mod random;
pub mod seq;

pub use random::{Base62Generator, UrlSafeIdGenerator};
pub use seq::SeqGenerator;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("entropy source failed: {0}")]
    Entropy(String),
}

/// Trait for generating identifiers.
///
/// Implementations are pure generators that don't interact with storage,
/// so a generated value may already be taken; the store's unique key is
/// what rejects duplicates.
pub trait Generator: Send + Sync + 'static {
    /// Generates a fresh identifier.
    fn generate(&self) -> Result<String, GeneratorError>;
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&self) -> Result<String, GeneratorError> {
        (**self).generate()
    }
}
